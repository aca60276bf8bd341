//! Request/response types for the HTTP surface.

use crate::models::{
    CreateReceipt, Receipt, ServiceType, VerificationDetails, VerificationResult,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReceiptRequest {
    #[validate(length(min = 1))]
    pub booking_id: String,
    #[validate(length(min = 1))]
    pub user_id: String,
    pub service_type: String,
    pub provider_id: Option<String>,
    #[validate(length(min = 1))]
    pub provider_name: String,
    #[validate(length(min = 1))]
    pub client_name: String,
    #[validate(email)]
    pub client_email: String,
    #[validate(length(min = 1))]
    pub client_document: String,
    pub client_phone: String,
    #[validate(length(max = 500))]
    pub service_description: String,
    #[validate(length(min = 1))]
    pub service_start_date: String,
    pub service_end_date: Option<String>,
    #[validate(range(min = 1))]
    pub person_count: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub tax_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub discount: Option<Decimal>,
    pub payment_method: String,
}

impl From<CreateReceiptRequest> for CreateReceipt {
    fn from(req: CreateReceiptRequest) -> Self {
        CreateReceipt {
            booking_id: req.booking_id,
            user_id: req.user_id,
            service_type: ServiceType::from_string(&req.service_type),
            provider_id: req.provider_id,
            provider_name: req.provider_name,
            client_name: req.client_name,
            client_email: req.client_email,
            client_document: req.client_document,
            client_phone: req.client_phone,
            service_description: req.service_description,
            service_start_date: req.service_start_date,
            service_end_date: req.service_end_date,
            person_count: req.person_count,
            subtotal: req.subtotal,
            tax_amount: req.tax_amount,
            discount: req.discount,
            payment_method: req.payment_method,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub id: String,
    pub receipt_code: String,
    pub verification_code: String,
    pub booking_id: String,
    pub user_id: String,
    pub service_type: String,
    pub provider_id: Option<String>,
    pub provider_name: String,
    pub client_name: String,
    pub client_email: String,
    pub client_document: String,
    pub client_phone: String,
    pub service_description: String,
    pub service_start_date: String,
    pub service_end_date: Option<String>,
    pub person_count: i32,
    pub subtotal: String,
    pub tax_amount: String,
    pub discount: String,
    pub total: String,
    pub status: String,
    pub payment_method: String,
    pub paid_at: Option<String>,
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub verification_notes: Option<String>,
    pub integrity_hash: String,
    pub created_at: String,
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        ReceiptResponse {
            id: receipt.id,
            receipt_code: receipt.receipt_code,
            verification_code: receipt.verification_code,
            booking_id: receipt.booking_id,
            user_id: receipt.user_id,
            service_type: receipt.service_type.as_str().to_string(),
            provider_id: receipt.provider_id,
            provider_name: receipt.provider_name,
            client_name: receipt.client_name,
            client_email: receipt.client_email,
            client_document: receipt.client_document,
            client_phone: receipt.client_phone,
            service_description: receipt.service_description,
            service_start_date: receipt.service_start_date,
            service_end_date: receipt.service_end_date,
            person_count: receipt.person_count,
            subtotal: receipt.subtotal.to_string(),
            tax_amount: receipt.tax_amount.to_string(),
            discount: receipt.discount.to_string(),
            total: receipt.total.to_string(),
            status: receipt.status.as_str().to_string(),
            payment_method: receipt.payment_method,
            paid_at: receipt.paid_at,
            verified_by: receipt.verified_by,
            verified_at: receipt.verified_at,
            verification_notes: receipt.verification_notes,
            integrity_hash: receipt.integrity_hash,
            created_at: receipt.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(length(min = 1))]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerificationDetailsResponse {
    pub status: String,
    pub issued_at: String,
    pub provider_name: String,
    pub service_type: String,
}

impl From<VerificationDetails> for VerificationDetailsResponse {
    fn from(details: VerificationDetails) -> Self {
        VerificationDetailsResponse {
            status: details.status.as_str().to_string(),
            issued_at: details.issued_at,
            provider_name: details.provider_name,
            service_type: details.service_type.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<VerificationDetailsResponse>,
}

impl From<VerificationResult> for VerificationResponse {
    fn from(result: VerificationResult) -> Self {
        VerificationResponse {
            valid: result.valid,
            message: result.message,
            receipt: result.receipt.map(ReceiptResponse::from),
            details: result.details.map(VerificationDetailsResponse::from),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarkVerifiedRequest {
    #[validate(length(min = 1))]
    pub verified_by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectRequest {
    #[validate(length(min = 1))]
    pub verified_by: String,
    pub reason: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReceiptListParams {
    pub user_id: Option<String>,
    pub provider_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptListResponse {
    pub receipts: Vec<ReceiptResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[validate(length(min = 1))]
    pub start_date: String,
    pub end_date: Option<String>,
    pub adults: u32,
    pub children: u32,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub days: i64,
    pub subtotal: String,
}
