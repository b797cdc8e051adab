use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Terminal result of a scan attempt.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    Success,
    Expired,
    AlreadyScanned,
    Invalid,
}

impl ScanOutcome {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanOutcome::Success => StatusCode::OK,
            ScanOutcome::Expired => StatusCode::GONE,
            ScanOutcome::AlreadyScanned => StatusCode::CONFLICT,
            ScanOutcome::Invalid => StatusCode::NOT_FOUND,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScanOutcome::Success => "Success!",
            ScanOutcome::Expired => "Expired",
            ScanOutcome::AlreadyScanned => "Already Scanned",
            ScanOutcome::Invalid => "Invalid",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScanOutcome::Success => "QR code scanned successfully!",
            ScanOutcome::Expired => {
                "This QR code has expired. QR codes are only valid for 2 minutes."
            }
            ScanOutcome::AlreadyScanned => {
                "You have already scanned this QR code. Each user can only scan a QR code once."
            }
            ScanOutcome::Invalid => "This QR code is invalid or not found.",
        }
    }
}
