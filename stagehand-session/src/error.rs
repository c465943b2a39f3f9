//! Session error types: the aggregate of the crate seams.

use thiserror::Error;

/// Errors surfaced by the session layer.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Core model or formatting error.
    #[error(transparent)]
    Core(#[from] stagehand_core::StagehandError),

    /// Wire protocol error.
    #[error(transparent)]
    Wire(#[from] stagehand_wire::WireError),

    /// Platform communication error.
    #[error(transparent)]
    Platform(#[from] stagehand_platform::PlatformError),

    /// Logging bootstrap failure.
    #[error("logging setup failed: {0}")]
    Logging(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SessionError>;
