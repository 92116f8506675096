//! Error types for rule configuration and document addressing
//!
//! The engine distinguishes two error families:
//!
//! - [`RuleError`] — programmer errors raised synchronously at the
//!   offending call: invalid rule construction arguments and illegal
//!   state transitions (reconfiguring a running scanner, re-attaching a
//!   partitioner). These are never caught internally.
//! - [`BadPosition`] — a position argument outside the document's
//!   addressable range.
//!
//! Content-driven "failure" (no rule matches anywhere) is not an error;
//! it degrades to a single default partition or an unstyled token.

use crate::position::Position;
use std::fmt;

/// Configuration error raised at the offending call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// An argument was structurally invalid: an empty pattern where one is
    /// required, a duplicate rule registration, a malformed regex, an
    /// unusable content-type pairing
    InvalidArgument {
        /// Reason the argument was rejected
        reason: String,
    },

    /// The operation is not permitted in the receiver's current state,
    /// e.g. mutating rule sets while a scan is active or re-attaching an
    /// already installed partitioner
    IllegalState {
        /// Reason the operation was rejected
        reason: String,
    },
}

impl RuleError {
    /// Create an `InvalidArgument` error
    #[inline]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        RuleError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create an `IllegalState` error
    #[inline]
    pub fn illegal_state(reason: impl Into<String>) -> Self {
        RuleError::IllegalState {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::InvalidArgument { reason } => {
                write!(f, "invalid argument: {reason}")
            }
            RuleError::IllegalState { reason } => {
                write!(f, "illegal state: {reason}")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// A position outside the document's addressable range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadPosition {
    /// The offending position
    pub position: Position,
}

impl BadPosition {
    /// Create a new `BadPosition` error
    #[inline]
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl fmt::Display for BadPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position {} is outside the document", self.position)
    }
}

impl std::error::Error for BadPosition {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = RuleError::invalid_argument("the start sequence is empty");
        assert_eq!(
            e.to_string(),
            "invalid argument: the start sequence is empty"
        );

        let e = RuleError::illegal_state("the scanner is running");
        assert_eq!(e.to_string(), "illegal state: the scanner is running");

        let e = BadPosition::new(Position::new(3, 7));
        assert_eq!(e.to_string(), "position (3, 7) is outside the document");
    }
}
