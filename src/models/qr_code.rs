use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// How long a generated code stays scannable, in milliseconds.
pub const QR_TTL_MS: i64 = 2 * 60 * 1000;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QrCode {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,     // Opaque token embedded in the scan URL
    pub created_at: i64,  // Timestamp in milliseconds
    pub expires_at: i64,  // Always created_at + QR_TTL_MS
    pub is_active: bool,
}

impl QrCode {
    pub fn new(code: String, now: i64) -> Self {
        Self {
            id: None,
            code,
            created_at: now,
            expires_at: now + QR_TTL_MS,
            is_active: true,
        }
    }

    /// A code is live while it is active and `now` has not reached `expires_at`.
    pub fn is_live_at(&self, now: i64) -> bool {
        self.is_active && now < self.expires_at
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        !self.is_live_at(now)
    }

    pub fn time_left_ms(&self, now: i64) -> i64 {
        if self.is_live_at(now) {
            self.expires_at - now
        } else {
            0
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|oid| oid.to_hex()).unwrap_or_default()
    }
}
