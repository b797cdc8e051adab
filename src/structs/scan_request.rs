use serde::{Deserialize, Serialize};

use crate::models::scan_outcome::ScanOutcome;

/// Optional client traits sent along with a scan
#[derive(Deserialize, Default)]
pub struct ScanParams {
    pub w: Option<u32>,       // Screen width
    pub h: Option<u32>,       // Screen height
    pub lang: Option<String>, // Overrides Accept-Language
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub status: ScanOutcome,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_after_secs: Option<u64>,
}
