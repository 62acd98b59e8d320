//! Type and grammar errors

use thiserror::Error;

use crate::interface::Interface;
use crate::value::Value;

/// Structural type errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("cannot merge `{left}` with `{right}`")]
    Irreconcilable { left: Interface, right: Interface },

    #[error("value `{value}` does not match `{interface}`")]
    ValueMismatch { value: Value, interface: Interface },
}

/// Grammar error naming the offending segment of the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} in `{segment}`")]
pub struct ParseError {
    /// Kind of parse error
    pub kind: ParseErrorKind,
    /// The segment of input that could not be parsed
    pub segment: String,
    /// Human-readable error message
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Nothing to parse
    Empty,
    /// Closing bracket without an opener
    UnexpectedClose,
    /// Bracket closed by the wrong kind of delimiter
    Mismatched,
    /// Bracket never closed
    Unclosed,
    /// `<..>` with the wrong number of arguments
    ArgumentCount,
    /// Repetition count that is not a number
    InvalidCount,
    /// Unrecognized type or value keyword
    Unknown,
    /// Text that is valid as an interface but not as a value
    NotAValue,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, segment: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            segment: segment.to_string(),
            message: message.into(),
        }
    }
}
