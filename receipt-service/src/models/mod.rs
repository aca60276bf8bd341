pub mod receipt;

pub use receipt::{
    CreateReceipt, Receipt, ReceiptStatus, ServiceType, StatusUpdate, VerificationDetails,
    VerificationResult,
};
