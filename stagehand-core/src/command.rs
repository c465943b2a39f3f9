//! Pure command formatting: (action, args) to the exact wire string.
//!
//! No I/O happens here. The dispatcher prepends the `start ` verb when it
//! writes the line; the bare command string is what ack lines echo back,
//! so [`Command`] keeps both forms.

use std::fmt;
use std::fmt::Write as _;

use crate::catalog::{ActionCatalog, ParamKind};
use crate::error::{Result, StagehandError};

// ---------------------------------------------------------------------------
// Argument Values
// ---------------------------------------------------------------------------

/// A positional argument to an engine action.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Free text; double-quoted when the parameter's kind is `String`.
    Str(String),
    /// Rendered lowercase.
    Bool(bool),
    /// Rendered in its natural form (`3`, not `3.0`, for whole numbers).
    Number(f64),
    /// An entity name; always rendered bare.
    Entity(String),
}

impl ArgValue {
    /// Convenience constructor for text arguments.
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Convenience constructor for entity-name arguments.
    #[must_use]
    pub fn entity(value: impl Into<String>) -> Self {
        Self::Entity(value.into())
    }

    fn render(&self, kind: Option<ParamKind>, out: &mut String) {
        match self {
            Self::Str(s) if kind == Some(ParamKind::String) => {
                let _ = write!(out, "\"{s}\"");
            }
            Self::Str(s) | Self::Entity(s) => out.push_str(s),
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Number(n) => {
                let _ = write!(out, "{n}");
            }
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// The exact command string sent to the engine, `name(arg1, arg2, …)`.
///
/// Two commands are equal iff their string forms are equal; acknowledgment
/// correlation relies on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    /// The bare command text (what ack lines echo back).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The outbound wire line, `start <command>`.
    #[must_use]
    pub fn start_line(&self) -> String {
        format!("start {}", self.0)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Format an action invocation into its wire command.
///
/// Arguments are rendered positionally against the catalog entry: `Str`
/// arguments whose parameter kind is `String` are double-quoted, booleans
/// render lowercase, everything else renders its natural form. Extra
/// arguments beyond the parameter list are rendered bare rather than
/// rejected (known looseness of the protocol, kept as-is).
///
/// # Errors
/// [`StagehandError::UnknownAction`] when the name is not in the catalog;
/// [`StagehandError::MissingRequiredParameter`] when fewer arguments are
/// given than the action's required parameter count.
pub fn format_command(catalog: &ActionCatalog, name: &str, args: &[ArgValue]) -> Result<Command> {
    let spec = catalog.get(name).ok_or_else(|| StagehandError::UnknownAction {
        name: name.to_string(),
    })?;

    let required = spec.required_count();
    if args.len() < required {
        return Err(StagehandError::MissingRequiredParameter {
            action: name.to_string(),
            required,
            given: args.len(),
        });
    }

    let mut out = String::with_capacity(name.len() + 2 + args.len() * 8);
    out.push_str(name);
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        arg.render(spec.params.get(i).map(|p| p.kind), &mut out);
    }
    out.push(')');
    Ok(Command(out))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
