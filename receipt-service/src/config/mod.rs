use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Hashing salt for receipt integrity fingerprints. A fixed application-wide
/// value, injected here rather than read ambiently by the hashing code.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    pub secret: String,
}

impl ReceiptConfig {
    pub fn load() -> Result<Self, AppError> {
        // Common config handles .env and the APP__ prefix
        let common = core_config::Config::load()?;

        let is_prod = core_config::is_prod();

        Ok(ReceiptConfig {
            common,
            mongodb: MongoConfig {
                uri: core_config::get_env("MONGODB_URI", None, is_prod)?,
                database: core_config::get_env("MONGODB_DATABASE", Some("receipts_db"), is_prod)?,
            },
            verification: VerificationConfig {
                secret: core_config::get_env(
                    "VERIFICATION_SECRET",
                    Some("apu-tours-dev-secret"),
                    is_prod,
                )?,
            },
        })
    }
}
