use std::sync::{Mutex, MutexGuard};

use mongodb::bson::oid::ObjectId;

use crate::db::store::{QrStore, StoreError, StoreSnapshot};
use crate::models::qr_code::QrCode;
use crate::models::qr_scan::QrScan;

/// Process-local store used with `STORE_BACKEND=memory` and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreSnapshot>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()))
    }
}

impl QrStore for MemoryStore {
    async fn insert_code(&self, qr: &QrCode) -> Result<QrCode, StoreError> {
        let mut data = self.lock()?;
        if data.codes.iter().any(|existing| existing.code == qr.code) {
            return Err(StoreError::Duplicate);
        }

        let mut stored = qr.clone();
        stored.id = Some(ObjectId::new());
        data.codes.push(stored.clone());
        Ok(stored)
    }

    async fn find_code(&self, code: &str) -> Result<Option<QrCode>, StoreError> {
        let data = self.lock()?;
        Ok(data.codes.iter().find(|qr| qr.code == code).cloned())
    }

    async fn find_scan(
        &self,
        qr_code_id: &ObjectId,
        user_fingerprint: &str,
    ) -> Result<Option<QrScan>, StoreError> {
        let data = self.lock()?;
        Ok(data
            .scans
            .iter()
            .find(|scan| {
                &scan.qr_code_id == qr_code_id && scan.user_fingerprint == user_fingerprint
            })
            .cloned())
    }

    async fn insert_scan(&self, scan: &QrScan) -> Result<QrScan, StoreError> {
        let mut data = self.lock()?;
        let duplicate = data.scans.iter().any(|existing| {
            existing.qr_code_id == scan.qr_code_id
                && existing.user_fingerprint == scan.user_fingerprint
        });
        if duplicate {
            return Err(StoreError::Duplicate);
        }

        let mut stored = scan.clone();
        stored.id = Some(ObjectId::new());
        data.scans.push(stored.clone());
        Ok(stored)
    }

    async fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.lock()?.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn rejects_duplicate_token() {
        let store = MemoryStore::new();
        store.insert_code(&QrCode::new("tok".into(), 0)).await.unwrap();

        let err = store.insert_code(&QrCode::new("tok".into(), 5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[actix_web::test]
    async fn rejects_second_scan_for_same_pair() {
        let store = MemoryStore::new();
        let qr = store.insert_code(&QrCode::new("tok".into(), 0)).await.unwrap();
        let qr_id = qr.id.unwrap();

        store.insert_scan(&QrScan::new(qr_id, "fp".into(), 1)).await.unwrap();
        let err = store
            .insert_scan(&QrScan::new(qr_id, "fp".into(), 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        store.insert_scan(&QrScan::new(qr_id, "other".into(), 2)).await.unwrap();
        assert_eq!(store.snapshot().await.unwrap().scans.len(), 2);
    }
}
