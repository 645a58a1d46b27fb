//! Configuration loaded from the environment at startup.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How invoice folders are named in the document hierarchy.
///
/// From the cutover period onward, Servicios and Electricidad invoices live
/// in separate folders named `{type}-{month}-{year}`. Earlier periods share a
/// single folder whose name comes from `shared_template`; the exact string is
/// an operational convention owned by whoever uploads the PDFs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNaming {
    /// First year of the type-split convention.
    pub cutover_year: i32,
    /// First month (1-12) of the type-split convention within `cutover_year`.
    pub cutover_month: u32,
    /// Pre-cutover shared folder name, with `{month}` and `{year}`
    /// placeholders (month is the lowercase Spanish name).
    pub shared_template: String,
}

impl Default for FolderNaming {
    fn default() -> Self {
        Self {
            cutover_year: 2023,
            cutover_month: 9,
            shared_template: "facturas-{month}-{year}".into(),
        }
    }
}

/// Document hierarchy (Google Drive) access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    pub base_url: String,
    pub access_token: String,
}

/// Hosted relational API (PostgREST-style) access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordStoreConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Messaging channel (WhatsApp Cloud API) access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    pub base_url: String,
    pub phone_number_id: String,
    pub access_token: String,
}

/// Top-level CoopNet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoopNetConfig {
    /// HTTP server port.
    pub port: u16,
    /// Shared secret expected on webhook calls.
    pub shared_secret: String,
    /// Upper bound for a single call to a remote collaborator, milliseconds.
    pub request_timeout_ms: u64,
    /// Invoice deliveries allowed per recipient per calendar month.
    pub monthly_request_limit: u64,
    pub folder_naming: FolderNaming,
    pub drive: DriveConfig,
    pub record_store: RecordStoreConfig,
    pub messaging: MessagingConfig,
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("missing env var {name}")))
}

impl CoopNetConfig {
    /// Create configuration from environment variables and defaults.
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3010);

        let naming = FolderNaming {
            cutover_year: std::env::var("COOPNET_CUTOVER_YEAR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| FolderNaming::default().cutover_year),
            cutover_month: std::env::var("COOPNET_CUTOVER_MONTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| FolderNaming::default().cutover_month),
            shared_template: std::env::var("COOPNET_SHARED_FOLDER_TEMPLATE")
                .unwrap_or_else(|_| FolderNaming::default().shared_template),
        };

        Ok(Self {
            port,
            shared_secret: env_var("COOPNET_SHARED_SECRET")?,
            request_timeout_ms: std::env::var("COOPNET_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            monthly_request_limit: std::env::var("COOPNET_MONTHLY_REQUEST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            folder_naming: naming,
            drive: DriveConfig {
                base_url: std::env::var("COOPNET_DRIVE_BASE_URL")
                    .unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".into()),
                access_token: env_var("COOPNET_DRIVE_ACCESS_TOKEN")?,
            },
            record_store: RecordStoreConfig {
                base_url: env_var("COOPNET_STORE_URL")?,
                api_key: env_var("COOPNET_STORE_API_KEY")?,
            },
            messaging: MessagingConfig {
                base_url: std::env::var("COOPNET_MESSAGING_BASE_URL")
                    .unwrap_or_else(|_| "https://graph.facebook.com/v19.0".into()),
                phone_number_id: env_var("COOPNET_MESSAGING_PHONE_ID")?,
                access_token: env_var("COOPNET_MESSAGING_ACCESS_TOKEN")?,
            },
        })
    }
}
