//! Action dispatch and acknowledgment correlation.
//!
//! The dispatcher formats an action into its wire command, writes exactly
//! one `start <command>` line, and (unless fire-and-forget was requested)
//! blocks on the ack channel until a line correlates to *this* command.
//! Correlation is by exact command text; there is deliberately no timeout,
//! the protocol being fully synchronous and turn-based. A caller that
//! needs bounded latency must wrap the wait externally.

use std::sync::Arc;

use tracing::debug;

use stagehand_core::catalog::ActionCatalog;
use stagehand_core::command::{format_command, ArgValue, Command};

use crate::error::Result;
use crate::queue::MessageQueue;
use crate::transport::LineWriter;

// ---------------------------------------------------------------------------
// Ack Correlation
// ---------------------------------------------------------------------------

/// Outcome reported by a correlated acknowledgment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckResult {
    /// `succeeded <command>` (exact match).
    Succeeded,
    /// `failed <command>…`.
    Failed,
    /// `error <command>…`.
    Errored,
}

impl AckResult {
    /// Reduce to the dispatcher's boolean: only `Succeeded` is `true`.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Match an ack line against a command. `None` means the line acknowledges
/// some other command and is not ours to consume.
///
/// Success requires an exact match including argument text; failure and
/// error lines may carry a trailing diagnostic, so they match by prefix.
#[must_use]
pub fn correlate(line: &str, command: &Command) -> Option<AckResult> {
    let text = command.as_str();
    let rest = line.strip_prefix("succeeded ");
    if rest == Some(text) {
        return Some(AckResult::Succeeded);
    }
    if let Some(rest) = line.strip_prefix("failed ") {
        if rest.starts_with(text) {
            return Some(AckResult::Failed);
        }
    }
    if let Some(rest) = line.strip_prefix("error ") {
        if rest.starts_with(text) {
            return Some(AckResult::Errored);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Encodes actions and issues them to the engine, one line per call, in
/// program order.
pub struct Dispatcher<W: LineWriter> {
    catalog: Arc<ActionCatalog>,
    writer: W,
    acks: MessageQueue<String>,
}

impl<W: LineWriter> Dispatcher<W> {
    /// Create a dispatcher over the writer half and the routed ack channel.
    pub fn new(catalog: Arc<ActionCatalog>, writer: W, acks: MessageQueue<String>) -> Self {
        Self {
            catalog,
            writer,
            acks,
        }
    }

    /// The catalog this dispatcher formats against.
    #[must_use]
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Format and send one action.
    ///
    /// With `wait`, blocks until the engine acknowledges this command and
    /// returns `true` only for success. Without, returns `Ok(true)`
    /// immediately: fire-and-forget, success assumed rather than verified.
    ///
    /// # Errors
    /// Formatting errors from the catalog lookup; transport errors from
    /// the write; [`crate::WireError::ChannelClosed`] when the engine
    /// stream ends while waiting.
    pub fn dispatch(&mut self, action: &str, args: &[ArgValue], wait: bool) -> Result<bool> {
        let command = format_command(&self.catalog, action, args)?;
        self.writer.write_line(&command.start_line())?;
        debug!(command = %command, wait, "action dispatched");

        if !wait {
            return Ok(true);
        }
        self.wait_for_ack(&command)
    }

    /// Pop ack lines until one correlates to `command`.
    ///
    /// Lines acknowledging other commands are discarded, not requeued:
    /// with several outstanding commands on one ack channel the protocol
    /// offers no way to hand them back in order.
    fn wait_for_ack(&mut self, command: &Command) -> Result<bool> {
        loop {
            let line = self.acks.pop()?;
            match correlate(&line, command) {
                Some(result) => {
                    debug!(command = %command, ?result, "acknowledged");
                    return Ok(result.is_success());
                }
                None => {
                    debug!(%line, "ack for a different command, discarded");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::loopback;
    use stagehand_core::catalog::{ActionSpec, ParamKind, ParamSpec};
    use stagehand_core::StagehandError;
    use crate::WireError;

    fn catalog() -> Arc<ActionCatalog> {
        let specs = vec![
            ActionSpec {
                name: "CreatePlace".to_string(),
                params: vec![
                    ParamSpec {
                        name: "place".to_string(),
                        kind: ParamKind::String,
                        default: Some("REQUIRED".to_string()),
                    },
                    ParamSpec {
                        name: "model".to_string(),
                        kind: ParamKind::String,
                        default: Some("REQUIRED".to_string()),
                    },
                ],
                from_predicate: None,
            },
            ActionSpec {
                name: "ShowMenu".to_string(),
                params: vec![],
                from_predicate: None,
            },
        ];
        Arc::new(ActionCatalog::from_specs(specs).expect("catalog"))
    }

    fn command(text: &str) -> Command {
        // Build through the formatter so the text is the canonical form.
        let catalog = catalog();
        match text {
            "ShowMenu()" => format_command(&catalog, "ShowMenu", &[]).expect("format"),
            _ => format_command(
                &catalog,
                "CreatePlace",
                &[ArgValue::str("kitchen"), ArgValue::str("Kitchen")],
            )
            .expect("format"),
        }
    }

    #[test]
    fn correlate_success_requires_exact_match() {
        let cmd = command("CreatePlace");
        assert_eq!(
            correlate(r#"succeeded CreatePlace("kitchen", "Kitchen")"#, &cmd),
            Some(AckResult::Succeeded)
        );
        assert_eq!(
            correlate(r#"succeeded CreatePlace("kitchen", "Kitchen") extra"#, &cmd),
            None,
            "success with trailing text is not ours"
        );
        assert_eq!(correlate(r#"succeeded CreatePlace("kitchen")"#, &cmd), None);
    }

    #[test]
    fn correlate_failure_and_error_match_by_prefix() {
        let cmd = command("CreatePlace");
        assert_eq!(
            correlate(
                r#"failed CreatePlace("kitchen", "Kitchen"): no such model"#,
                &cmd
            ),
            Some(AckResult::Failed)
        );
        assert_eq!(
            correlate(r#"error CreatePlace("kitchen", "Kitchen")"#, &cmd),
            Some(AckResult::Errored)
        );
        assert_eq!(correlate("failed ShowMenu()", &cmd), None);
    }

    #[test]
    fn fire_and_forget_writes_once_and_returns_true() {
        let (writer, _reader, peer) = loopback();
        let mut dispatcher = Dispatcher::new(catalog(), writer, MessageQueue::new());

        let ok = dispatcher.dispatch("ShowMenu", &[], false).expect("dispatch");
        assert!(ok);
        assert_eq!(peer.next_written().expect("line"), "start ShowMenu()");
        assert!(
            peer.try_next_written().expect("no more").is_none(),
            "exactly one line per dispatch"
        );
    }

    #[test]
    fn wait_returns_true_on_succeeded() {
        let (writer, _reader, peer) = loopback();
        let acks = MessageQueue::new();
        acks.push(r#"succeeded CreatePlace("kitchen", "Kitchen")"#.to_string());
        let mut dispatcher = Dispatcher::new(catalog(), writer, acks);

        let ok = dispatcher
            .dispatch(
                "CreatePlace",
                &[ArgValue::str("kitchen"), ArgValue::str("Kitchen")],
                true,
            )
            .expect("dispatch");
        assert!(ok);
        assert_eq!(
            peer.next_written().expect("line"),
            r#"start CreatePlace("kitchen", "Kitchen")"#
        );
    }

    #[test]
    fn wait_returns_false_on_failed_or_error() {
        for verb in ["failed", "error"] {
            let (writer, _reader, _peer) = loopback();
            let acks = MessageQueue::new();
            acks.push(format!(r#"{verb} CreatePlace("kitchen", "Kitchen"): engine said no"#));
            let mut dispatcher = Dispatcher::new(catalog(), writer, acks);

            let ok = dispatcher
                .dispatch(
                    "CreatePlace",
                    &[ArgValue::str("kitchen"), ArgValue::str("Kitchen")],
                    true,
                )
                .expect("dispatch");
            assert!(!ok, "{verb} must reduce to false");
        }
    }

    #[test]
    fn unrelated_acks_are_discarded_not_consumed_as_ours() {
        let (writer, _reader, _peer) = loopback();
        let acks = MessageQueue::new();
        acks.push("succeeded ShowMenu()".to_string());
        acks.push("failed WalkTo(bob, kitchen.Door)".to_string());
        acks.push(r#"succeeded CreatePlace("kitchen", "Kitchen")"#.to_string());
        let mut dispatcher = Dispatcher::new(catalog(), writer, acks.clone());

        let ok = dispatcher
            .dispatch(
                "CreatePlace",
                &[ArgValue::str("kitchen"), ArgValue::str("Kitchen")],
                true,
            )
            .expect("dispatch");
        assert!(ok);
        assert!(acks.is_empty(), "unrelated lines were popped and dropped");
    }

    #[test]
    fn closed_ack_channel_surfaces_while_waiting() {
        let (writer, _reader, _peer) = loopback();
        let acks: MessageQueue<String> = MessageQueue::new();
        acks.close();
        let mut dispatcher = Dispatcher::new(catalog(), writer, acks);

        let err = dispatcher
            .dispatch("ShowMenu", &[], true)
            .expect_err("closed channel");
        assert!(matches!(err, WireError::ChannelClosed));
    }

    #[test]
    fn unknown_action_fails_before_any_write() {
        let (writer, _reader, peer) = loopback();
        let mut dispatcher = Dispatcher::new(catalog(), writer, MessageQueue::new());

        let err = dispatcher.dispatch("Teleport", &[], false).expect_err("unknown");
        assert!(matches!(
            err,
            WireError::Core(StagehandError::UnknownAction { .. })
        ));
        assert!(peer.try_next_written().expect("none").is_none());
    }
}
