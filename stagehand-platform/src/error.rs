//! Platform error types.

use thiserror::Error;

/// Errors raised by platform communication.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP request failed.
    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with something other than the expected body.
    #[error("malformed platform response: {0}")]
    Malformed(String),

    /// Generic I/O error (worker thread spawn).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PlatformError>;
