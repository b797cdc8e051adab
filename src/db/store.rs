#![allow(async_fn_in_trait)]

use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::qr_code::QrCode;
use crate::models::qr_scan::QrScan;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("Duplicate key")]
    Duplicate,

    #[error("Database error: {0}")]
    Backend(String),
}

/// Every QR code and scan, as read in one pass.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub codes: Vec<QrCode>,
    pub scans: Vec<QrScan>,
}

/// Persistence for QR codes and their scans.
///
/// Implementations must reject a second code with the same token and a second
/// scan for the same (`qr_code_id`, `user_fingerprint`) pair with
/// [`StoreError::Duplicate`].
pub trait QrStore: Send + Sync {
    /// Insert a new code and return it with its assigned id.
    async fn insert_code(&self, qr: &QrCode) -> Result<QrCode, StoreError>;

    async fn find_code(&self, code: &str) -> Result<Option<QrCode>, StoreError>;

    async fn find_scan(
        &self,
        qr_code_id: &ObjectId,
        user_fingerprint: &str,
    ) -> Result<Option<QrScan>, StoreError>;

    /// Insert a scan and return it with its assigned id.
    async fn insert_scan(&self, scan: &QrScan) -> Result<QrScan, StoreError>;

    async fn snapshot(&self) -> Result<StoreSnapshot, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
