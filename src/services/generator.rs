use anyhow::{Result, anyhow};
use log::{info, warn};
use nanoid::nanoid;

use crate::db::store::{QrStore, StoreError};
use crate::models::qr_code::QrCode;

const BASE36: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const TOKEN_HALF_LEN: usize = 13;
const MAX_ATTEMPTS: usize = 3;

/// A freshly persisted code and the URL its image encodes
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub qr: QrCode,
    pub scan_url: String,
}

/// Two base-36 halves, 26 characters in total
pub fn new_token() -> String {
    format!(
        "{}{}",
        nanoid!(TOKEN_HALF_LEN, &BASE36),
        nanoid!(TOKEN_HALF_LEN, &BASE36)
    )
}

pub fn scan_url(base_url: &str, code: &str) -> String {
    format!("{}/scan/{}", base_url.trim_end_matches('/'), code)
}

/// Persist a new code that expires two minutes after `now`.
///
/// Token uniqueness is left to the store; a collision just draws a new token.
pub async fn generate_code<S: QrStore>(
    store: &S,
    base_url: &str,
    now: i64,
) -> Result<GeneratedCode> {
    for attempt in 1..=MAX_ATTEMPTS {
        let qr = QrCode::new(new_token(), now);
        match store.insert_code(&qr).await {
            Ok(qr) => {
                info!("Generated QR code {} (expires at {})", qr.code, qr.expires_at);
                let scan_url = scan_url(base_url, &qr.code);
                return Ok(GeneratedCode { qr, scan_url });
            }
            Err(StoreError::Duplicate) => {
                warn!("Token collision on attempt {}, retrying", attempt);
            }
            Err(e) => return Err(anyhow!(e).context("Failed to store QR code")),
        }
    }

    Err(anyhow!(
        "Could not allocate a unique token after {} attempts",
        MAX_ATTEMPTS
    ))
}
