use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

use crate::db::store::{QrStore, StoreError, StoreSnapshot};
use crate::models::qr_code::QrCode;
use crate::models::qr_scan::QrScan;

const QR_CODES: &str = "qr_codes";
const QR_SCANS: &str = "qr_scans";
const DUPLICATE_KEY: i32 = 11000;

/// Connect to MongoDB and return the named database
pub async fn get_database(uri: &str, db_name: &str) -> Result<Database> {
    let client = Client::with_uri_str(uri)
        .await
        .context("Failed to create MongoDB client")?;
    let db = client.database(db_name);

    // Fail fast if the server is unreachable
    db.run_command(doc! { "ping": 1 })
        .await
        .context("Failed to ping MongoDB")?;

    info!("Connected to MongoDB database '{}'", db_name);
    Ok(db)
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        match e.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY => {
                StoreError::Duplicate
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn codes(&self) -> Collection<QrCode> {
        self.db.collection::<QrCode>(QR_CODES)
    }

    fn scans(&self) -> Collection<QrScan> {
        self.db.collection::<QrScan>(QR_SCANS)
    }

    /// Create the unique indexes the scan and generation flows rely on
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.codes()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "code": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await
            .context("Failed to create qr_codes.code index")?;

        // One scan per fingerprint per code, enforced atomically by the server
        self.scans()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "qr_code_id": 1, "user_fingerprint": 1 })
                    .options(unique)
                    .build(),
            )
            .await
            .context("Failed to create qr_scans unique index")?;

        Ok(())
    }
}

impl QrStore for MongoStore {
    async fn insert_code(&self, qr: &QrCode) -> Result<QrCode, StoreError> {
        let result = self.codes().insert_one(qr).await?;
        let mut stored = qr.clone();
        stored.id = result.inserted_id.as_object_id();
        Ok(stored)
    }

    async fn find_code(&self, code: &str) -> Result<Option<QrCode>, StoreError> {
        Ok(self.codes().find_one(doc! { "code": code }).await?)
    }

    async fn find_scan(
        &self,
        qr_code_id: &ObjectId,
        user_fingerprint: &str,
    ) -> Result<Option<QrScan>, StoreError> {
        let qr_code_id = *qr_code_id;
        Ok(self
            .scans()
            .find_one(doc! {
                "qr_code_id": qr_code_id,
                "user_fingerprint": user_fingerprint,
            })
            .await?)
    }

    async fn insert_scan(&self, scan: &QrScan) -> Result<QrScan, StoreError> {
        let result = self.scans().insert_one(scan).await?;
        let mut stored = scan.clone();
        stored.id = result.inserted_id.as_object_id();
        Ok(stored)
    }

    async fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let codes = self
            .codes()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect::<Vec<QrCode>>()
            .await?;

        let scans = self
            .scans()
            .find(doc! {})
            .await?
            .try_collect::<Vec<QrScan>>()
            .await?;

        Ok(StoreSnapshot { codes, scans })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
