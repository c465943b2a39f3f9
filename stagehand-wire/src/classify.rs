//! Inbound line classification.
//!
//! Every line the engine emits belongs to exactly one logical channel.
//! [`classify`] is total: any string maps to a [`Channel`], with
//! [`Channel::Unclassified`] as the explicit fallthrough (those lines are
//! dropped by the router, never silently misrouted).

/// The logical channel an inbound line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// `succeeded `/`failed `/`error ` acknowledgment of a dispatched command.
    Ack,
    /// A player-input event (`input …`).
    Input,
    /// A spatial event (`input arrived …` / `input exited …`).
    Location,
    /// Anything else; dropped with a diagnostic log entry.
    Unclassified,
}

const ACK_PREFIXES: [&str; 3] = ["succeeded ", "failed ", "error "];
const LOCATION_PREFIXES: [&str; 2] = ["input arrived ", "input exited "];
const INPUT_PREFIX: &str = "input ";

/// Classify one inbound line by its prefix.
///
/// Location events share the `input` token with plain input events, so the
/// location prefixes are checked first.
#[must_use]
pub fn classify(line: &str) -> Channel {
    if ACK_PREFIXES.iter().any(|p| line.starts_with(p)) {
        Channel::Ack
    } else if LOCATION_PREFIXES.iter().any(|p| line.starts_with(p)) {
        Channel::Location
    } else if line.starts_with(INPUT_PREFIX) {
        Channel::Input
    } else {
        Channel::Unclassified
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
