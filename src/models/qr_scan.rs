use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QrScan {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub qr_code_id: ObjectId,     // The scanned QrCode
    pub user_fingerprint: String, // Hashed client identity, see utils::fingerprint
    pub scanned_at: i64,          // Timestamp in milliseconds
}

impl QrScan {
    pub fn new(qr_code_id: ObjectId, user_fingerprint: String, scanned_at: i64) -> Self {
        Self {
            id: None,
            qr_code_id,
            user_fingerprint,
            scanned_at,
        }
    }
}
