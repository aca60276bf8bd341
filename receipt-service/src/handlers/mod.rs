pub mod health;
pub mod receipts;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use receipts::{
    create_receipt, get_receipt, list_receipts, mark_paid, mark_verified, quote_booking,
    reject_receipt, verify_receipt,
};
