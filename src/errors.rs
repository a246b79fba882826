/*!
 * Error types for the rpytl application.
 *
 * This module contains custom error types for the different layers of the
 * translation run, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that a translation backend can surface to the cascade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The upstream service throttled us; the cascade should rotate away
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other failure: network, timeout, malformed or empty response,
    /// subprocess error
    #[error("Translation failed: {0}")]
    Failed(String),

    /// A required external dependency is unavailable, so the backend can
    /// never succeed during this run
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Whether this error is the rate-limit kind
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Errors that abort processing of a single document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The input document does not exist
    #[error("Input file not found: {0}")]
    NotFound(String),

    /// The input document could not be read
    #[error("Failed to read {path}: {message}")]
    Unreadable {
        /// Path of the document
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// An output artifact could not be written
    #[error("Failed to write {path}: {message}")]
    WriteFailed {
        /// Path of the artifact
        path: String,
        /// Underlying I/O message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
