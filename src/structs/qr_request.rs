use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Deserialize, Validate, Default)]
pub struct GenerateQrRequest {
    #[validate(range(min = 64, max = 1024, message = "Size must be between 64 and 1024"))]
    pub size: Option<u32>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QrImageFormat {
    #[default]
    Svg,
    Png,
}

#[derive(Deserialize, Validate)]
pub struct QrImageParams {
    pub format: Option<QrImageFormat>, // "svg" (default) or "png"
    #[validate(range(min = 64, max = 1024, message = "Size must be between 64 and 1024"))]
    pub size: Option<u32>,
}

#[derive(Serialize)]
pub struct GenerateQrResponse {
    pub id: String,
    pub code: String,
    pub scan_url: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub svg: String,
}
