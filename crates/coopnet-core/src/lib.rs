//! CoopNet Core — error taxonomy and configuration.

pub mod config;
pub mod error;

pub use config::{CoopNetConfig, DriveConfig, FolderNaming, MessagingConfig, RecordStoreConfig};
pub use error::{Error, Result};
