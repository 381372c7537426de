//! Error types for tessera operations.
//!
//! Only genuine external failures surface here. Unresolvable symbols,
//! malformed font descriptors and cross-origin links are recovered locally
//! and never become an [`Error`].

use thiserror::Error;

/// Errors that can occur while loading content or running a delegated fetch.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch content for model '{model}' ({entry}): {message}")]
    Fetch {
        model: String,
        entry: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Build a fetch failure for the given model and entry description.
    pub fn fetch(
        model: impl Into<String>,
        entry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Fetch {
            model: model.into(),
            entry: entry.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
