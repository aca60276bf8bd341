//! Receipt model for receipt-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category of booked service, encoded as a single letter in the receipt code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Lodging,
    Gastronomy,
    Transport,
    Tour,
    Package,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Lodging => "lodging",
            ServiceType::Gastronomy => "gastronomy",
            ServiceType::Transport => "transport",
            ServiceType::Tour => "tour",
            ServiceType::Package => "package",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "gastronomy" => ServiceType::Gastronomy,
            "transport" => ServiceType::Transport,
            "tour" => ServiceType::Tour,
            "package" => ServiceType::Package,
            _ => ServiceType::Lodging,
        }
    }

    /// Single-letter tag used in receipt codes.
    pub fn code_letter(&self) -> char {
        match self {
            ServiceType::Lodging => 'H',
            ServiceType::Gastronomy => 'G',
            ServiceType::Transport => 'T',
            ServiceType::Tour => 'D',
            ServiceType::Package => 'P',
        }
    }
}

/// Receipt status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Paid,
    Verified,
    Rejected,
    Cancelled,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Paid => "paid",
            ReceiptStatus::Verified => "verified",
            ReceiptStatus::Rejected => "rejected",
            ReceiptStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "paid" => ReceiptStatus::Paid,
            "verified" => ReceiptStatus::Verified,
            "rejected" => ReceiptStatus::Rejected,
            "cancelled" => ReceiptStatus::Cancelled,
            _ => ReceiptStatus::Pending,
        }
    }

    /// Allowed-transition table. `rejected` and `cancelled` are terminal;
    /// `paid` and `verified` allow idempotent re-entry.
    pub fn can_transition_to(&self, next: ReceiptStatus) -> bool {
        use ReceiptStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Paid, Paid)
                | (Pending, Verified)
                | (Paid, Verified)
                | (Verified, Verified)
                | (Pending, Rejected)
                | (Paid, Rejected)
        )
    }
}

/// Issued payment receipt. Identity, client snapshot, monetary fields and
/// the integrity hash are immutable after creation; only `status` and the
/// audit fields change, through explicit transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "_id")]
    pub id: String,
    pub receipt_code: String,
    pub verification_code: String,
    pub booking_id: String,
    pub user_id: String,
    pub service_type: ServiceType,
    pub provider_id: Option<String>,
    pub provider_name: String,

    // Client snapshot at creation time, not a live profile reference
    pub client_name: String,
    pub client_email: String,
    pub client_document: String,
    pub client_phone: String,

    pub service_description: String,
    pub service_start_date: String,
    pub service_end_date: Option<String>,
    pub person_count: i32,

    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,

    pub status: ReceiptStatus,
    pub payment_method: String,
    pub paid_at: Option<String>,
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub verification_notes: Option<String>,

    pub integrity_hash: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Input for issuing a receipt. The subtotal comes from the booking price
/// calculator; tax and discount fall back to defaults when not supplied.
#[derive(Debug, Clone)]
pub struct CreateReceipt {
    pub booking_id: String,
    pub user_id: String,
    pub service_type: ServiceType,
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
    pub subtotal: Decimal,
    pub tax_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub payment_method: String,
}

/// Partial update applied by a status transition. Monetary fields and the
/// integrity hash are never part of it.
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub status: ReceiptStatus,
    pub paid_at: Option<String>,
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub verification_notes: Option<String>,
}

/// Outcome of a verification lookup. A miss or a failed check is a result,
/// not an error; the receipt is still attached on integrity mismatch so the
/// caller can audit it.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub valid: bool,
    pub message: String,
    pub receipt: Option<Receipt>,
    pub details: Option<VerificationDetails>,
}

#[derive(Debug, Clone)]
pub struct VerificationDetails {
    pub status: ReceiptStatus,
    pub issued_at: String,
    pub provider_name: String,
    pub service_type: ServiceType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_allows_reentry() {
        assert!(ReceiptStatus::Pending.can_transition_to(ReceiptStatus::Paid));
        assert!(ReceiptStatus::Paid.can_transition_to(ReceiptStatus::Paid));
    }

    #[test]
    fn rejected_is_terminal() {
        assert!(!ReceiptStatus::Rejected.can_transition_to(ReceiptStatus::Verified));
        assert!(!ReceiptStatus::Rejected.can_transition_to(ReceiptStatus::Paid));
        assert!(!ReceiptStatus::Rejected.can_transition_to(ReceiptStatus::Pending));
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(!ReceiptStatus::Cancelled.can_transition_to(ReceiptStatus::Paid));
        assert!(!ReceiptStatus::Cancelled.can_transition_to(ReceiptStatus::Verified));
        assert!(!ReceiptStatus::Cancelled.can_transition_to(ReceiptStatus::Rejected));
    }

    #[test]
    fn verified_cannot_reopen() {
        assert!(!ReceiptStatus::Verified.can_transition_to(ReceiptStatus::Pending));
        assert!(!ReceiptStatus::Verified.can_transition_to(ReceiptStatus::Paid));
        assert!(ReceiptStatus::Verified.can_transition_to(ReceiptStatus::Verified));
    }

    #[test]
    fn service_type_letters() {
        assert_eq!(ServiceType::Lodging.code_letter(), 'H');
        assert_eq!(ServiceType::Gastronomy.code_letter(), 'G');
        assert_eq!(ServiceType::Transport.code_letter(), 'T');
        assert_eq!(ServiceType::Tour.code_letter(), 'D');
        assert_eq!(ServiceType::Package.code_letter(), 'P');
    }
}
