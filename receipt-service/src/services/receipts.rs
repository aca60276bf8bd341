//! Receipt issuance, verification and status transitions.

use crate::models::{
    CreateReceipt, Receipt, ReceiptStatus, StatusUpdate, VerificationDetails, VerificationResult,
};
use crate::services::metrics::{
    ERRORS_TOTAL, RECEIPTS_ISSUED_TOTAL, TRANSITIONS_TOTAL, VERIFICATIONS_TOTAL,
};
use crate::services::store::ReceiptStore;
use crate::services::{codes, integrity};
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Attempts at issuing a receipt with fresh codes before giving up on a
/// duplicate-code conflict.
const MAX_CODE_ATTEMPTS: u32 = 3;

/// Listing queries are bounded, newest first.
const LIST_LIMIT: i64 = 100;

/// IGV 18%, applied when no explicit tax amount is supplied.
fn default_tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

pub struct ReceiptService {
    store: Arc<dyn ReceiptStore>,
    secret: String,
}

impl ReceiptService {
    /// `secret` is the application-wide hashing salt, injected from
    /// configuration.
    pub fn new(store: Arc<dyn ReceiptStore>, secret: impl Into<String>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    /// Issue a receipt: generate codes, apply tax/discount defaults, compute
    /// the integrity hash and persist with `status = pending`. A
    /// duplicate-code conflict at the store retries with fresh codes, up to
    /// [`MAX_CODE_ATTEMPTS`] times; other store errors propagate unchanged.
    #[tracing::instrument(skip(self, input), fields(booking_id = %input.booking_id))]
    pub async fn create(&self, input: CreateReceipt) -> Result<Receipt, AppError> {
        if input.person_count < 1 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Person count must be at least 1"
            )));
        }
        if input.subtotal < Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Subtotal cannot be negative"
            )));
        }
        if input.client_document.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Client document is required"
            )));
        }

        let tax_amount = input
            .tax_amount
            .unwrap_or_else(|| input.subtotal * default_tax_rate());
        let discount = input.discount.unwrap_or(Decimal::ZERO);
        if tax_amount < Decimal::ZERO || discount < Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Tax and discount cannot be negative"
            )));
        }
        let total = input.subtotal + tax_amount - discount;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let receipt_code =
                codes::generate_receipt_code(input.service_type, Utc::now().date_naive());
            let verification_code = codes::generate_verification_code();
            let integrity_hash = integrity::compute_hash(
                &receipt_code,
                &verification_code,
                &input.client_document,
                total,
                &self.secret,
            );

            let receipt = Receipt {
                id: Uuid::new_v4().to_string(),
                receipt_code,
                verification_code,
                booking_id: input.booking_id.clone(),
                user_id: input.user_id.clone(),
                service_type: input.service_type,
                provider_id: input.provider_id.clone(),
                provider_name: input.provider_name.clone(),
                client_name: input.client_name.clone(),
                client_email: input.client_email.clone(),
                client_document: input.client_document.clone(),
                client_phone: input.client_phone.clone(),
                service_description: input.service_description.clone(),
                service_start_date: input.service_start_date.clone(),
                service_end_date: input.service_end_date.clone(),
                person_count: input.person_count,
                subtotal: input.subtotal,
                tax_amount,
                discount,
                total,
                status: ReceiptStatus::Pending,
                payment_method: input.payment_method.clone(),
                paid_at: None,
                verified_by: None,
                verified_at: None,
                verification_notes: None,
                integrity_hash,
                created_at: Utc::now(),
            };

            match self.store.insert(receipt).await {
                Ok(stored) => {
                    RECEIPTS_ISSUED_TOTAL
                        .with_label_values(&[stored.service_type.as_str()])
                        .inc();
                    tracing::info!(
                        receipt_id = %stored.id,
                        receipt_code = %stored.receipt_code,
                        "Receipt issued"
                    );
                    return Ok(stored);
                }
                Err(AppError::Conflict(err)) if attempt < MAX_CODE_ATTEMPTS => {
                    tracing::warn!(
                        attempt = attempt,
                        "Receipt code collision, retrying with fresh codes: {}",
                        err
                    );
                }
                Err(e) => {
                    ERRORS_TOTAL.with_label_values(&["create"]).inc();
                    return Err(e);
                }
            }
        }
    }

    /// Look up a receipt by verification code and check its authenticity.
    /// Read-only; a miss, a hash mismatch or a disqualifying status is an
    /// invalid result with a human-readable reason, never an error.
    #[tracing::instrument(skip(self))]
    pub async fn verify(&self, raw_code: &str) -> Result<VerificationResult, AppError> {
        let code = codes::normalize_verification_code(raw_code);

        let Some(receipt) = self.store.find_by_verification_code(&code).await? else {
            VERIFICATIONS_TOTAL.with_label_values(&["not_found"]).inc();
            return Ok(VerificationResult {
                valid: false,
                message: "Receipt not found. Check the code and try again.".to_string(),
                receipt: None,
                details: None,
            });
        };

        let expected = integrity::compute_hash(
            &receipt.receipt_code,
            &receipt.verification_code,
            &receipt.client_document,
            receipt.total,
            &self.secret,
        );
        if !integrity::hashes_match(&expected, &receipt.integrity_hash) {
            VERIFICATIONS_TOTAL.with_label_values(&["tampered"]).inc();
            tracing::warn!(
                receipt_id = %receipt.id,
                "Integrity hash mismatch on verification"
            );
            return Ok(VerificationResult {
                valid: false,
                message: "Receipt data has been altered. Possible fraud detected.".to_string(),
                receipt: Some(receipt),
                details: None,
            });
        }

        let details = Some(VerificationDetails {
            status: receipt.status,
            issued_at: receipt.created_at.to_rfc3339(),
            provider_name: receipt.provider_name.clone(),
            service_type: receipt.service_type,
        });

        let (valid, outcome, message) = match receipt.status {
            ReceiptStatus::Cancelled => {
                (false, "cancelled", "This receipt has been cancelled.")
            }
            ReceiptStatus::Rejected => (false, "rejected", "This receipt was rejected."),
            ReceiptStatus::Verified => (
                true,
                "already_verified",
                "Receipt is valid and was already verified.",
            ),
            ReceiptStatus::Pending | ReceiptStatus::Paid => (
                true,
                "valid",
                "Receipt is valid. You may proceed with the service.",
            ),
        };
        VERIFICATIONS_TOTAL.with_label_values(&[outcome]).inc();

        Ok(VerificationResult {
            valid,
            message: message.to_string(),
            receipt: Some(receipt),
            details,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Receipt, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Receipt not found")))
    }

    /// `pending | paid -> paid`, stamping `paid_at`. Idempotent re-entry
    /// from `paid`. Monetary fields and the hash are untouched.
    #[tracing::instrument(skip(self))]
    pub async fn mark_paid(&self, id: &str) -> Result<Receipt, AppError> {
        let update = StatusUpdate {
            status: ReceiptStatus::Paid,
            paid_at: Some(Utc::now().to_rfc3339()),
            ..Default::default()
        };
        self.transition(
            id,
            &[ReceiptStatus::Pending, ReceiptStatus::Paid],
            update,
            "Only pending or paid receipts can be marked as paid",
        )
        .await
    }

    /// Transition to `verified` with audit fields. Forbidden from `rejected`
    /// and `cancelled`; re-verifying an already verified receipt refreshes
    /// the audit fields.
    #[tracing::instrument(skip(self, notes))]
    pub async fn mark_verified(
        &self,
        id: &str,
        verified_by: &str,
        notes: Option<String>,
    ) -> Result<Receipt, AppError> {
        if verified_by.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Verifier identity is required"
            )));
        }
        let update = StatusUpdate {
            status: ReceiptStatus::Verified,
            verified_by: Some(verified_by.to_string()),
            verified_at: Some(Utc::now().to_rfc3339()),
            verification_notes: Some(notes.unwrap_or_default()),
            ..Default::default()
        };
        self.transition(
            id,
            &[
                ReceiptStatus::Pending,
                ReceiptStatus::Paid,
                ReceiptStatus::Verified,
            ],
            update,
            "Rejected or cancelled receipts cannot be verified",
        )
        .await
    }

    /// Transition to `rejected`. Requires a non-empty reason, recorded in
    /// the verification notes.
    #[tracing::instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        id: &str,
        verified_by: &str,
        reason: &str,
    ) -> Result<Receipt, AppError> {
        if verified_by.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Verifier identity is required"
            )));
        }
        if reason.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "A rejection reason is required"
            )));
        }
        let update = StatusUpdate {
            status: ReceiptStatus::Rejected,
            verified_by: Some(verified_by.to_string()),
            verified_at: Some(Utc::now().to_rfc3339()),
            verification_notes: Some(reason.to_string()),
            ..Default::default()
        };
        self.transition(
            id,
            &[ReceiptStatus::Pending, ReceiptStatus::Paid],
            update,
            "Only pending or paid receipts can be rejected",
        )
        .await
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Receipt>, AppError> {
        self.store.list_for_user(user_id, LIST_LIMIT).await
    }

    pub async fn list_for_provider(&self, provider_id: &str) -> Result<Vec<Receipt>, AppError> {
        self.store.list_for_provider(provider_id, LIST_LIMIT).await
    }

    /// Shared transition path: existence check, transition-table check, then
    /// a conditional store update so a concurrent transition surfaces as a
    /// conflict instead of being overwritten.
    async fn transition(
        &self,
        id: &str,
        allowed_from: &[ReceiptStatus],
        update: StatusUpdate,
        denied_message: &str,
    ) -> Result<Receipt, AppError> {
        let existing = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Receipt not found")))?;

        if !existing.status.can_transition_to(update.status) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "{} (current status: {})",
                denied_message,
                existing.status.as_str()
            )));
        }

        let updated = self
            .store
            .update_status(id, allowed_from, &update)
            .await?
            .ok_or_else(|| {
                ERRORS_TOTAL.with_label_values(&["transition_conflict"]).inc();
                AppError::Conflict(anyhow::anyhow!(
                    "Receipt status changed concurrently, transition not applied"
                ))
            })?;

        TRANSITIONS_TOTAL
            .with_label_values(&[updated.status.as_str()])
            .inc();

        Ok(updated)
    }
}
