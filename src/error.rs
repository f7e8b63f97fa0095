//! Error types for QSON parsing and serialization.
//!
//! The taxonomy has two kinds, matching the two directions of the codec:
//!
//! - [`Error::Parse`]: malformed QSON text or a malformed query-string
//!   segment, carrying the character offset of the failure;
//! - [`Error::Format`]: a value that violates a structural invariant at
//!   serialization time (non-finite number, non-string map key coming in
//!   through serde, nesting beyond the configured depth limit).
//!
//! All failures are fail-fast: no partial value is ever returned.
//!
//! ```rust
//! use qson::parse;
//!
//! let err = parse("(a~b')").unwrap_err();
//! assert!(err.position().is_some());
//! ```

use std::fmt;
use thiserror::Error;

/// All errors the QSON codec can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed QSON text or query string.
    #[error("parse error at offset {pos}: {msg}")]
    Parse { pos: usize, msg: String },

    /// Value cannot be represented in QSON text.
    #[error("format error: {0}")]
    Format(String),

    /// Message raised through the serde `Error` traits.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a parse error at the given offset into the input.
    pub fn parse(pos: usize, msg: impl Into<String>) -> Self {
        Error::Parse {
            pos,
            msg: msg.into(),
        }
    }

    /// Creates a serialization contract violation.
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// Offset into the input for parse errors, `None` otherwise.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Parse { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
