//! Thread-local cache of compiled regex patterns
//!
//! Regex rules and regex transition rules are often constructed many
//! times with the same pattern (one rule set per document). Compiled
//! patterns are cached per thread to avoid recompilation; thread-local
//! storage keeps the cache safe without locking.

use crate::error::RuleError;
use hashbrown::HashMap;
use regex::{Regex, RegexBuilder};
use std::cell::RefCell;

thread_local! {
    /// Compiled patterns keyed by (pattern, case_sensitive)
    static REGEX_CACHE: RefCell<HashMap<(String, bool), Regex>> = RefCell::new(HashMap::new());
}

/// Get or compile a regex pattern
///
/// A malformed pattern is a construction-time error
/// ([`RuleError::InvalidArgument`]); it is never deferred to match time.
pub fn get_or_compile(pattern: &str, case_sensitive: bool) -> Result<Regex, RuleError> {
    REGEX_CACHE.with(|cache| {
        let key = (pattern.to_owned(), case_sensitive);
        if let Some(regex) = cache.borrow().get(&key) {
            return Ok(regex.clone());
        }

        match RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
        {
            Ok(regex) => {
                cache.borrow_mut().insert(key, regex.clone());
                Ok(regex)
            }
            Err(e) => Err(RuleError::invalid_argument(format!(
                "malformed pattern {pattern:?}: {e}"
            ))),
        }
    })
}

/// Clear the cache for the current thread
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of patterns cached by the current thread
pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_compilation() {
        clear_cache();

        assert!(get_or_compile("[0-9]+", true).is_ok());
        assert_eq!(cache_size(), 1);

        // second access reuses the entry
        assert!(get_or_compile("[0-9]+", true).is_ok());
        assert_eq!(cache_size(), 1);

        // same pattern, different case sensitivity is a distinct entry
        assert!(get_or_compile("[0-9]+", false).is_ok());
        assert_eq!(cache_size(), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        clear_cache();
        let err = get_or_compile("[unclosed", true).unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument { .. }));
        assert_eq!(cache_size(), 0);
    }

    #[test]
    fn test_case_insensitive_compilation() {
        clear_cache();
        let re = get_or_compile("abc", false).unwrap();
        assert!(re.is_match("ABC"));
        let re = get_or_compile("abc", true).unwrap();
        assert!(!re.is_match("ABC"));
    }
}
