//! Error types for Kshetra

use thiserror::Error;

use crate::services::TransformError;

/// Kshetra error type
#[derive(Error, Debug)]
pub enum KshetraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A collaborator rejected or failed a request
    #[error("{service} error: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Executor error: {0}")]
    Executor(String),
}

impl KshetraError {
    /// Shorthand for a collaborator failure.
    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        KshetraError::Service {
            service,
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for KshetraError {
    fn from(e: toml::de::Error) -> Self {
        KshetraError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for KshetraError {
    fn from(e: toml::ser::Error) -> Self {
        KshetraError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KshetraError>;
