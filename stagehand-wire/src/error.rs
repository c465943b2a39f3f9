//! Wire-level error types.

use thiserror::Error;

/// Errors raised on the engine channel.
#[derive(Error, Debug)]
pub enum WireError {
    /// Read or write failure on the underlying transport.
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    /// The channel has terminated: the router closed the queues after the
    /// engine stream ended, or the peer endpoint went away.
    #[error("engine channel closed")]
    ChannelClosed,

    /// A core model or formatting error surfaced on the wire path.
    #[error(transparent)]
    Core(#[from] stagehand_core::StagehandError),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, WireError>;
