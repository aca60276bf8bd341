pub mod codes;
pub mod database;
pub mod integrity;
pub mod metrics;
pub mod pricing;
pub mod receipts;
pub mod store;

pub use database::MongoDb;
pub use metrics::{get_metrics, init_metrics};
pub use receipts::ReceiptService;
pub use store::{MemoryReceiptStore, MongoReceiptStore, ReceiptStore};
