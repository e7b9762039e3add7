//! Error types for Speisekarte.
//!
//! The pipeline itself never fails on malformed menu text — graceful
//! degradation is the whole point of the system. Errors are reserved for the
//! edges: configuration loading, serialization, and I/O.
//!
//! - `Io` errors bubble up unchanged so real system problems stay visible.
//! - Application errors (`Config`, `Serialization`) carry a message and an
//!   optional source for context.
use thiserror::Error;

/// Result type alias using `SpeisekarteError`.
pub type Result<T> = std::result::Result<T, SpeisekarteError>;

/// Main error type for all Speisekarte operations.
#[derive(Debug, Error)]
pub enum SpeisekarteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SpeisekarteError {
    fn from(err: serde_json::Error) -> Self {
        SpeisekarteError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl SpeisekarteError {
    /// Create a Config error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Config error with source
    pub fn config_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a Serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
            source: None,
        }
    }
}
