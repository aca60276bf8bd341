//! Shared test harness: in-memory store, service construction and an HTTP
//! TestApp bound to an ephemeral port.

#![allow(dead_code)]

use chrono::Utc;
use receipt_service::config::{MongoConfig, ReceiptConfig, VerificationConfig};
use receipt_service::models::{CreateReceipt, Receipt, ReceiptStatus, ServiceType};
use receipt_service::services::{codes, integrity, MemoryReceiptStore, ReceiptService, ReceiptStore};
use receipt_service::startup::{app_router, AppState};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-verification-secret";

/// Service over a fresh in-memory store. The store handle is returned for
/// direct seeding and inspection.
pub fn test_service() -> (Arc<ReceiptService>, Arc<dyn ReceiptStore>) {
    let store: Arc<dyn ReceiptStore> = Arc::new(MemoryReceiptStore::new());
    let service = Arc::new(ReceiptService::new(store.clone(), TEST_SECRET));
    (service, store)
}

/// Well-formed creation input for a two-night lodging booking.
pub fn sample_input() -> CreateReceipt {
    CreateReceipt {
        booking_id: "booking-001".to_string(),
        user_id: "user-001".to_string(),
        service_type: ServiceType::Lodging,
        provider_id: Some("provider-001".to_string()),
        provider_name: "Hostal Mirador".to_string(),
        client_name: "Maria Quispe".to_string(),
        client_email: "maria@example.com".to_string(),
        client_document: "45871234".to_string(),
        client_phone: "+51 987 654 321".to_string(),
        service_description: "Double room, two nights".to_string(),
        service_start_date: "2026-08-10".to_string(),
        service_end_date: Some("2026-08-12".to_string()),
        person_count: 2,
        subtotal: Decimal::from(200),
        tax_amount: None,
        discount: None,
        payment_method: "card".to_string(),
    }
}

/// Construct a consistent receipt directly (hash matches its own fields),
/// bypassing the service, so tests can seed statuses the transition set
/// never produces.
pub fn build_receipt(status: ReceiptStatus, secret: &str) -> Receipt {
    let receipt_code =
        codes::generate_receipt_code(ServiceType::Tour, Utc::now().date_naive());
    let verification_code = codes::generate_verification_code();
    let client_document = "40404040".to_string();
    let total = Decimal::new(2360, 1); // 200 + 36 - 0
    let integrity_hash = integrity::compute_hash(
        &receipt_code,
        &verification_code,
        &client_document,
        total,
        secret,
    );

    Receipt {
        id: Uuid::new_v4().to_string(),
        receipt_code,
        verification_code,
        booking_id: "booking-seeded".to_string(),
        user_id: "user-seeded".to_string(),
        service_type: ServiceType::Tour,
        provider_id: None,
        provider_name: "Andes Trek".to_string(),
        client_name: "Jose Huaman".to_string(),
        client_email: "jose@example.com".to_string(),
        client_document,
        client_phone: "+51 912 345 678".to_string(),
        service_description: "Full-day canyon tour".to_string(),
        service_start_date: "2026-09-01".to_string(),
        service_end_date: None,
        person_count: 1,
        subtotal: Decimal::from(200),
        tax_amount: Decimal::from(36),
        discount: Decimal::ZERO,
        total,
        status,
        payment_method: "cash".to_string(),
        paid_at: None,
        verified_by: None,
        verified_at: None,
        verification_notes: None,
        integrity_hash,
        created_at: Utc::now(),
    }
}

pub struct TestApp {
    pub http_address: String,
    pub state: AppState,
}

impl TestApp {
    /// Bind the full router on an ephemeral port over the in-memory store.
    pub async fn spawn() -> Self {
        let (service, store) = test_service();

        let config = ReceiptConfig {
            common: service_core::config::Config { port: 0 },
            mongodb: MongoConfig {
                uri: "mongodb://unused-in-tests".to_string(),
                database: "unused".to_string(),
            },
            verification: VerificationConfig {
                secret: TEST_SECRET.to_string(),
            },
        };

        let state = AppState {
            config,
            service,
            store,
        };

        let router = app_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let port = listener.local_addr().expect("Missing local addr").port();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server crashed");
        });

        TestApp {
            http_address: format!("http://127.0.0.1:{}", port),
            state,
        }
    }
}
