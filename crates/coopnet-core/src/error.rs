//! Error types for CoopNet.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Record store error: {0}")]
    Storage(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the failure came from reaching a remote collaborator,
    /// as opposed to bad local input or configuration. Callers use this
    /// to tell "the system is broken" apart from everything else.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::RemoteStatus { .. } | Error::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
