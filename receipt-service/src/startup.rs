use crate::config::ReceiptConfig;
use crate::handlers;
use crate::services::{MongoDb, MongoReceiptStore, ReceiptService, ReceiptStore};
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ReceiptConfig,
    pub service: Arc<ReceiptService>,
    pub store: Arc<dyn ReceiptStore>,
}

/// Router over a prepared state. Split out so tests can drive the full HTTP
/// surface against the in-memory store.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/receipts",
            post(handlers::create_receipt).get(handlers::list_receipts),
        )
        .route("/receipts/verify", post(handlers::verify_receipt))
        .route("/receipts/:receipt_id", get(handlers::get_receipt))
        .route("/receipts/:receipt_id/pay", post(handlers::mark_paid))
        .route("/receipts/:receipt_id/verify", post(handlers::mark_verified))
        .route("/receipts/:receipt_id/reject", post(handlers::reject_receipt))
        .route("/quotes", post(handlers::quote_booking))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: ReceiptConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let store: Arc<dyn ReceiptStore> = Arc::new(MongoReceiptStore::new(db));
        let service = Arc::new(ReceiptService::new(
            store.clone(),
            config.verification.secret.clone(),
        ));

        let state = AppState {
            config: config.clone(),
            service,
            store,
        };

        let app = app_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
