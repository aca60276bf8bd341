//! Receipt persistence contract and its document-store implementations.
//!
//! The service logic talks to a [`ReceiptStore`] trait object; production
//! uses MongoDB, tests use the in-memory implementation. Both enforce the
//! same contract: codes are unique, and status updates are conditional on
//! the current status so concurrent transitions surface as conflicts
//! instead of last-writer-wins overwrites.

use crate::models::{Receipt, ReceiptStatus, StatusUpdate};
use crate::services::database::MongoDb;
use crate::services::metrics::DB_OP_DURATION;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Persist a new receipt, stamping `created_at`. A duplicate code or id
    /// reports `AppError::Conflict`.
    async fn insert(&self, receipt: Receipt) -> Result<Receipt, AppError>;

    async fn get(&self, id: &str) -> Result<Option<Receipt>, AppError>;

    /// Equality lookup on the (already normalized) verification code.
    async fn find_by_verification_code(&self, code: &str)
        -> Result<Option<Receipt>, AppError>;

    /// Conditional update: applied only when the receipt's current status is
    /// in `allowed_from`. Returns the updated receipt, or `None` when the
    /// condition did not match (caller distinguishes not-found from a
    /// status conflict).
    async fn update_status(
        &self,
        id: &str,
        allowed_from: &[ReceiptStatus],
        update: &StatusUpdate,
    ) -> Result<Option<Receipt>, AppError>;

    async fn list_for_user(&self, user_id: &str, limit: i64)
        -> Result<Vec<Receipt>, AppError>;

    async fn list_for_provider(
        &self,
        provider_id: &str,
        limit: i64,
    ) -> Result<Vec<Receipt>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

// ---------------------------------------------------------------------------
// MongoDB implementation
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MongoReceiptStore {
    db: MongoDb,
}

impl MongoReceiptStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .as_ref()
            .map(|errors| errors.iter().any(|e| e.code == 11000))
            .unwrap_or(false),
        _ => false,
    }
}

#[async_trait]
impl ReceiptStore for MongoReceiptStore {
    #[tracing::instrument(skip(self, receipt), fields(receipt_code = %receipt.receipt_code))]
    async fn insert(&self, mut receipt: Receipt) -> Result<Receipt, AppError> {
        let timer = DB_OP_DURATION.with_label_values(&["insert"]).start_timer();

        receipt.created_at = Utc::now();
        self.db
            .receipts()
            .insert_one(&receipt, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::Conflict(anyhow::anyhow!(
                        "Duplicate receipt or verification code"
                    ))
                } else {
                    AppError::from(e)
                }
            })?;

        timer.observe_duration();

        tracing::info!(receipt_id = %receipt.id, "Receipt persisted");

        Ok(receipt)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Receipt>, AppError> {
        let timer = DB_OP_DURATION.with_label_values(&["get"]).start_timer();

        let receipt = self
            .db
            .receipts()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)?;

        timer.observe_duration();

        Ok(receipt)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<Receipt>, AppError> {
        let timer = DB_OP_DURATION
            .with_label_values(&["find_by_verification_code"])
            .start_timer();

        let receipt = self
            .db
            .receipts()
            .find_one(doc! { "verification_code": code }, None)
            .await
            .map_err(AppError::from)?;

        timer.observe_duration();

        Ok(receipt)
    }

    #[tracing::instrument(skip(self, update), fields(to_status = update.status.as_str()))]
    async fn update_status(
        &self,
        id: &str,
        allowed_from: &[ReceiptStatus],
        update: &StatusUpdate,
    ) -> Result<Option<Receipt>, AppError> {
        let timer = DB_OP_DURATION
            .with_label_values(&["update_status"])
            .start_timer();

        let allowed: Vec<&str> = allowed_from.iter().map(|s| s.as_str()).collect();
        let filter = doc! { "_id": id, "status": { "$in": allowed } };

        let mut set = doc! { "status": update.status.as_str() };
        if let Some(paid_at) = &update.paid_at {
            set.insert("paid_at", paid_at);
        }
        if let Some(verified_by) = &update.verified_by {
            set.insert("verified_by", verified_by);
        }
        if let Some(verified_at) = &update.verified_at {
            set.insert("verified_at", verified_at);
        }
        if let Some(notes) = &update.verification_notes {
            set.insert("verification_notes", notes);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let receipt = self
            .db
            .receipts()
            .find_one_and_update(filter, doc! { "$set": set }, options)
            .await
            .map_err(AppError::from)?;

        timer.observe_duration();

        if let Some(ref r) = receipt {
            tracing::info!(receipt_id = %r.id, status = r.status.as_str(), "Receipt status updated");
        }

        Ok(receipt)
    }

    #[tracing::instrument(skip(self))]
    async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Receipt>, AppError> {
        let timer = DB_OP_DURATION
            .with_label_values(&["list_for_user"])
            .start_timer();

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .build();

        let mut cursor = self
            .db
            .receipts()
            .find(doc! { "user_id": user_id }, options)
            .await
            .map_err(AppError::from)?;

        let mut receipts = Vec::new();
        while let Some(receipt) = cursor.try_next().await.map_err(AppError::from)? {
            receipts.push(receipt);
        }

        timer.observe_duration();

        Ok(receipts)
    }

    #[tracing::instrument(skip(self))]
    async fn list_for_provider(
        &self,
        provider_id: &str,
        limit: i64,
    ) -> Result<Vec<Receipt>, AppError> {
        let timer = DB_OP_DURATION
            .with_label_values(&["list_for_provider"])
            .start_timer();

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .build();

        let mut cursor = self
            .db
            .receipts()
            .find(doc! { "provider_id": provider_id }, options)
            .await
            .map_err(AppError::from)?;

        let mut receipts = Vec::new();
        while let Some(receipt) = cursor.try_next().await.map_err(AppError::from)? {
            receipts.push(receipt);
        }

        timer.observe_duration();

        Ok(receipts)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// HashMap-backed store with the same uniqueness and conditional-update
/// semantics as the MongoDB implementation. Used by tests and local demos.
#[derive(Default)]
pub struct MemoryReceiptStore {
    receipts: RwLock<HashMap<String, Receipt>>,
}

impl MemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReceiptStore for MemoryReceiptStore {
    async fn insert(&self, mut receipt: Receipt) -> Result<Receipt, AppError> {
        let mut receipts = self.receipts.write().await;

        if receipts.contains_key(&receipt.id) {
            return Err(AppError::Conflict(anyhow::anyhow!("Duplicate receipt id")));
        }
        let duplicate_code = receipts.values().any(|existing| {
            existing.receipt_code == receipt.receipt_code
                || existing.verification_code == receipt.verification_code
        });
        if duplicate_code {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Duplicate receipt or verification code"
            )));
        }

        receipt.created_at = Utc::now();
        receipts.insert(receipt.id.clone(), receipt.clone());
        Ok(receipt)
    }

    async fn get(&self, id: &str) -> Result<Option<Receipt>, AppError> {
        Ok(self.receipts.read().await.get(id).cloned())
    }

    async fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<Receipt>, AppError> {
        Ok(self
            .receipts
            .read()
            .await
            .values()
            .find(|r| r.verification_code == code)
            .cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        allowed_from: &[ReceiptStatus],
        update: &StatusUpdate,
    ) -> Result<Option<Receipt>, AppError> {
        let mut receipts = self.receipts.write().await;

        let Some(receipt) = receipts.get_mut(id) else {
            return Ok(None);
        };
        if !allowed_from.contains(&receipt.status) {
            return Ok(None);
        }

        receipt.status = update.status;
        if let Some(paid_at) = &update.paid_at {
            receipt.paid_at = Some(paid_at.clone());
        }
        if let Some(verified_by) = &update.verified_by {
            receipt.verified_by = Some(verified_by.clone());
        }
        if let Some(verified_at) = &update.verified_at {
            receipt.verified_at = Some(verified_at.clone());
        }
        if let Some(notes) = &update.verification_notes {
            receipt.verification_notes = Some(notes.clone());
        }

        Ok(Some(receipt.clone()))
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Receipt>, AppError> {
        let receipts = self.receipts.read().await;
        let mut matching: Vec<Receipt> = receipts
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn list_for_provider(
        &self,
        provider_id: &str,
        limit: i64,
    ) -> Result<Vec<Receipt>, AppError> {
        let receipts = self.receipts.read().await;
        let mut matching: Vec<Receipt> = receipts
            .values()
            .filter(|r| r.provider_id.as_deref() == Some(provider_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
