use log::{error, info, warn};

use crate::db::store::{QrStore, StoreError};
use crate::models::qr_scan::QrScan;
use crate::models::scan_outcome::ScanOutcome;

/// Validate a scan of `code` by `fingerprint` at `now` and record it on success.
///
/// Checks run in a fixed order: unknown code, then expiry, then duplicate.
/// Only the success path writes, and it writes exactly one scan.
pub async fn validate_and_record_scan<S: QrStore>(
    store: &S,
    code: &str,
    fingerprint: &str,
    now: i64,
) -> ScanOutcome {
    let qr = match store.find_code(code).await {
        Ok(Some(qr)) => qr,
        Ok(None) => return ScanOutcome::Invalid,
        Err(e) => {
            error!("Failed to look up QR code {}: {}", code, e);
            return ScanOutcome::Invalid;
        }
    };

    if qr.is_expired_at(now) {
        return ScanOutcome::Expired;
    }

    let Some(qr_code_id) = qr.id else {
        error!("QR code {} has no id", code);
        return ScanOutcome::Invalid;
    };

    match store.find_scan(&qr_code_id, fingerprint).await {
        Ok(Some(_)) => return ScanOutcome::AlreadyScanned,
        Ok(None) => {}
        // The unique index still rejects a duplicate insert below
        Err(e) => warn!("Failed to check existing scans for {}: {}", code, e),
    }

    let scan = QrScan::new(qr_code_id, fingerprint.to_string(), now);
    match store.insert_scan(&scan).await {
        Ok(_) => {
            info!("Recorded scan of {}", code);
            ScanOutcome::Success
        }
        // A concurrent scan with the same fingerprint committed first
        Err(StoreError::Duplicate) => ScanOutcome::AlreadyScanned,
        Err(e) => {
            error!("Failed to record scan of {}: {}", code, e);
            ScanOutcome::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::store::StoreSnapshot;
    use crate::models::qr_code::QrCode;

    const T: i64 = 1_700_000_000_000;

    async fn store_with_code(code: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_code(&QrCode::new(code.to_string(), T)).await.unwrap();
        store
    }

    async fn scan_count(store: &MemoryStore) -> usize {
        store.snapshot().await.unwrap().scans.len()
    }

    #[actix_web::test]
    async fn one_scan_per_fingerprint_until_expiry() {
        let store = store_with_code("tok").await;

        let outcome = validate_and_record_scan(&store, "tok", "F1", T + 10_000).await;
        assert_eq!(outcome, ScanOutcome::Success);
        assert_eq!(scan_count(&store).await, 1);

        let outcome = validate_and_record_scan(&store, "tok", "F1", T + 15_000).await;
        assert_eq!(outcome, ScanOutcome::AlreadyScanned);
        assert_eq!(scan_count(&store).await, 1);

        let outcome = validate_and_record_scan(&store, "tok", "F2", T + 15_000).await;
        assert_eq!(outcome, ScanOutcome::Success);
        assert_eq!(scan_count(&store).await, 2);

        let outcome = validate_and_record_scan(&store, "tok", "F3", T + 130_000).await;
        assert_eq!(outcome, ScanOutcome::Expired);
        assert_eq!(scan_count(&store).await, 2);
    }

    #[actix_web::test]
    async fn unknown_code_is_invalid() {
        let store = store_with_code("tok").await;
        let outcome = validate_and_record_scan(&store, "nope", "F1", T).await;
        assert_eq!(outcome, ScanOutcome::Invalid);
        assert_eq!(scan_count(&store).await, 0);
    }

    #[actix_web::test]
    async fn expiry_wins_over_scan_history() {
        let store = store_with_code("tok").await;
        validate_and_record_scan(&store, "tok", "F1", T + 1_000).await;

        let outcome = validate_and_record_scan(&store, "tok", "F1", T + 120_001).await;
        assert_eq!(outcome, ScanOutcome::Expired);
    }

    #[actix_web::test]
    async fn deactivated_code_is_expired() {
        let store = MemoryStore::new();
        let mut qr = QrCode::new("tok".to_string(), T);
        qr.is_active = false;
        store.insert_code(&qr).await.unwrap();

        let outcome = validate_and_record_scan(&store, "tok", "F1", T + 1_000).await;
        assert_eq!(outcome, ScanOutcome::Expired);
        assert_eq!(scan_count(&store).await, 0);
    }

    /// Hides existing scans from the pre-insert check, as when two requests
    /// race between lookup and insert.
    struct RacingStore(MemoryStore);

    impl QrStore for RacingStore {
        async fn insert_code(&self, qr: &QrCode) -> Result<QrCode, StoreError> {
            self.0.insert_code(qr).await
        }
        async fn find_code(&self, code: &str) -> Result<Option<QrCode>, StoreError> {
            self.0.find_code(code).await
        }
        async fn find_scan(&self, _: &ObjectId, _: &str) -> Result<Option<QrScan>, StoreError> {
            Ok(None)
        }
        async fn insert_scan(&self, scan: &QrScan) -> Result<QrScan, StoreError> {
            self.0.insert_scan(scan).await
        }
        async fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
            self.0.snapshot().await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[actix_web::test]
    async fn racing_duplicate_is_already_scanned() {
        let store = RacingStore(store_with_code("tok").await);

        let first = validate_and_record_scan(&store, "tok", "F1", T + 1_000).await;
        let second = validate_and_record_scan(&store, "tok", "F1", T + 1_001).await;
        assert_eq!(first, ScanOutcome::Success);
        assert_eq!(second, ScanOutcome::AlreadyScanned);
        assert_eq!(store.snapshot().await.unwrap().scans.len(), 1);
    }

    /// Finds codes but fails every scan write.
    struct BrokenWrites(MemoryStore);

    impl QrStore for BrokenWrites {
        async fn insert_code(&self, qr: &QrCode) -> Result<QrCode, StoreError> {
            self.0.insert_code(qr).await
        }
        async fn find_code(&self, code: &str) -> Result<Option<QrCode>, StoreError> {
            self.0.find_code(code).await
        }
        async fn find_scan(&self, _: &ObjectId, _: &str) -> Result<Option<QrScan>, StoreError> {
            Err(StoreError::Backend("timeout".to_string()))
        }
        async fn insert_scan(&self, _: &QrScan) -> Result<QrScan, StoreError> {
            Err(StoreError::Backend("timeout".to_string()))
        }
        async fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
            self.0.snapshot().await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[actix_web::test]
    async fn failed_insert_is_invalid() {
        let store = BrokenWrites(store_with_code("tok").await);
        let outcome = validate_and_record_scan(&store, "tok", "F1", T + 1_000).await;
        assert_eq!(outcome, ScanOutcome::Invalid);
    }
}
