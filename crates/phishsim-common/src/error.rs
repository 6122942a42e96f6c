//! Error types for PhishSim

use thiserror::Error;

/// Main error type for PhishSim
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for PhishSim
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Message to show the operator.
    ///
    /// Backend errors that carry an `{"error": ...}` payload surface that
    /// message; everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}
