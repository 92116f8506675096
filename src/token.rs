//! Tokens produced by scanning inside one partition
//!
//! Tokens are transient values: a scanner produces them, the consumer
//! (styling, content assist, bracket matching) uses them and throws them
//! away. They are never stored by the engine.

use crate::position::Region;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a token kind
///
/// Identifiers are opaque small integers chosen by the rule author. The
/// reserved [`TokenId::NONE`] marks unstyled filler between rule matches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenId(u16);

impl TokenId {
    /// Unstyled filler
    pub const NONE: TokenId = TokenId(0);

    /// Create a token identifier from a raw value
    #[inline]
    pub const fn new(id: u16) -> Self {
        TokenId(id)
    }

    /// The raw value
    #[inline]
    pub const fn id(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token({})", self.0)
    }
}

/// A typed, positioned span produced by a token rule
///
/// Tokens are single-line: `region` never crosses a line boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The token kind
    pub id: TokenId,
    /// The span the token covers
    pub region: Region,
}

impl Token {
    /// Create a new token
    #[inline]
    pub fn new(id: TokenId, region: Region) -> Self {
        Self { id, region }
    }

    /// Check whether this token is unstyled filler
    #[inline]
    pub fn is_filler(&self) -> bool {
        self.id == TokenId::NONE
    }
}
