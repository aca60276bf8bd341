use crate::models::Receipt;
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// Unique indexes on both codes back the creation retry loop: a random
    /// collision surfaces as a duplicate-key error instead of a second
    /// receipt with the same code.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for receipt-service");

        let receipts = self.receipts();

        let receipt_code_index = IndexModel::builder()
            .keys(doc! { "receipt_code": 1 })
            .options(
                IndexOptions::builder()
                    .name("receipt_code_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        receipts
            .create_index(receipt_code_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create receipt_code index on receipts collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on receipts.receipt_code");

        let verification_code_index = IndexModel::builder()
            .keys(doc! { "verification_code": 1 })
            .options(
                IndexOptions::builder()
                    .name("verification_code_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        receipts
            .create_index(verification_code_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create verification_code index on receipts collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on receipts.verification_code");

        // Listing queries filter by owner or provider, newest first
        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_lookup".to_string())
                    .build(),
            )
            .build();

        receipts.create_index(user_index, None).await.map_err(|e| {
            tracing::error!("Failed to create user_id index on receipts collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on receipts.(user_id, created_at)");

        let provider_index = IndexModel::builder()
            .keys(doc! { "provider_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("provider_lookup".to_string())
                    .build(),
            )
            .build();

        receipts
            .create_index(provider_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create provider_id index on receipts collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on receipts.(provider_id, created_at)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn receipts(&self) -> Collection<Receipt> {
        self.db.collection("receipts")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
