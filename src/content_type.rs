//! Content types classifying document partitions
//!
//! A [`ContentType`] is a small opaque tag attached to every partition
//! (code, comment, string, ...). Two values are reserved:
//!
//! - [`ContentType::DEFAULT`] — the type occupying the document start.
//! - [`ContentType::UNDETERMINED`] — returned when no transition rule
//!   matches; never stored in a partitioning.
//!
//! The numeric ordering of content types is load-bearing: when a
//! transition fires, the boundary token belongs to the partition whose
//! type ranks numerically greater (see the partitioner). Content types
//! therefore implement `Ord` on their raw identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque tag classifying a partition's lexical category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContentType(u32);

impl ContentType {
    /// The content type occupying the document start
    pub const DEFAULT: ContentType = ContentType(0);

    /// Reported when no transition rule matches; never stored
    pub const UNDETERMINED: ContentType = ContentType(u32::MAX);

    /// Create a content type from a raw identifier
    #[inline]
    pub const fn new(id: u32) -> Self {
        ContentType(id)
    }

    /// The raw identifier
    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::DEFAULT
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == ContentType::UNDETERMINED {
            write!(f, "content-type(undetermined)")
        } else {
            write!(f, "content-type({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_values() {
        assert_eq!(ContentType::DEFAULT.id(), 0);
        assert_eq!(ContentType::default(), ContentType::DEFAULT);
        assert_ne!(ContentType::DEFAULT, ContentType::UNDETERMINED);
    }

    #[test]
    fn test_numeric_ordering() {
        // The rank comparison decides boundary-token ownership; it must
        // follow the raw identifier.
        assert!(ContentType::new(1) > ContentType::DEFAULT);
        assert!(ContentType::new(2) > ContentType::new(1));
    }
}
