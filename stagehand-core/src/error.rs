//! Error types for the stagehand core library.

use thiserror::Error;

/// Top-level error type for core model and protocol-formatting operations.
#[derive(Error, Debug)]
pub enum StagehandError {
    /// Action name absent from the catalog. Lookup is case-sensitive.
    #[error("unknown action {name:?} (action names are case-sensitive)")]
    UnknownAction {
        /// The name that failed to resolve.
        name: String,
    },

    /// Fewer arguments supplied than the action's required parameter count.
    #[error("action {action:?} requires {required} parameters, got {given}")]
    MissingRequiredParameter {
        /// The action being formatted.
        action: String,
        /// Number of parameters marked required.
        required: usize,
        /// Number of arguments supplied.
        given: usize,
    },

    /// An engine event referenced an entity the world model does not know.
    ///
    /// This indicates a desynchronization between the engine and the
    /// planning model; further reconciliation would be unsound, so the
    /// session must abort rather than continue.
    #[error("entity {name:?} not found in the world model")]
    UnknownEntity {
        /// The unresolved entity name.
        name: String,
    },

    /// Two catalog entries share a name.
    #[error("duplicate action name in catalog: {name:?}")]
    DuplicateAction {
        /// The colliding name.
        name: String,
    },

    /// A location event line did not match the event grammar.
    #[error("malformed engine event {line:?}: {reason}")]
    MalformedEvent {
        /// The offending line.
        line: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The initial state declared zero or several player entities.
    #[error("expected exactly one player entity, found {count}")]
    AmbiguousPlayer {
        /// How many player-kind entities were found.
        count: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A static resource (catalog, places, casting, items) is unusable.
    #[error("resource error: {0}")]
    Resource(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, StagehandError>;
