//! Partition-boundary patterns
//!
//! A transition rule is bound to exactly one source content type. Given a
//! line and a column it reports how many characters a boundary pattern
//! matched there; 0 means no match, and a genuine zero-width match is
//! reported as 1 so that the partitioner always makes forward progress.
//!
//! Rule kinds are tagged variants dispatched by `match`; the first
//! matching rule in registration order wins, which is the entire
//! precedence model.

use crate::content_type::ContentType;
use crate::error::RuleError;
use crate::position::{column_len, column_to_byte};
use crate::regex_cache;
use regex::Regex;

/// A pattern which begins a new partition in a document
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionRule {
    /// Literal prefix match with optional escape suppression
    Literal(LiteralTransitionRule),
    /// Anchored regex match
    Regex(RegexTransitionRule),
}

impl TransitionRule {
    /// Convenience constructor for a literal rule without an escape
    pub fn literal(
        source: ContentType,
        destination: ContentType,
        pattern: impl Into<String>,
    ) -> Self {
        TransitionRule::Literal(LiteralTransitionRule::new(
            source,
            destination,
            pattern,
            None,
            true,
        ))
    }

    /// Convenience constructor for a regex rule
    pub fn regex(
        source: ContentType,
        destination: ContentType,
        pattern: impl Into<String>,
    ) -> Result<Self, RuleError> {
        Ok(TransitionRule::Regex(RegexTransitionRule::new(
            source,
            destination,
            pattern,
            true,
        )?))
    }

    /// The content type this rule transitions from
    #[inline]
    pub fn source(&self) -> ContentType {
        match self {
            TransitionRule::Literal(r) => r.source,
            TransitionRule::Regex(r) => r.source,
        }
    }

    /// The content type this rule transitions to
    #[inline]
    pub fn destination(&self) -> ContentType {
        match self {
            TransitionRule::Literal(r) => r.destination,
            TransitionRule::Regex(r) => r.destination,
        }
    }

    /// Match the rule's pattern against `line` at `column`
    ///
    /// Returns the matched length in character units, 0 for no match, and
    /// 1 for a zero-width match.
    pub fn matches(&self, line: &str, column: usize) -> usize {
        match self {
            TransitionRule::Literal(r) => r.matches(line, column),
            TransitionRule::Regex(r) => r.matches(line, column),
        }
    }
}

/// Matches a literal pattern at a column
///
/// An empty pattern matches only at the end of the line (reported as
/// length 1). A configured escape character suppresses the match when it
/// immediately precedes the column.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralTransitionRule {
    source: ContentType,
    destination: ContentType,
    pattern: String,
    pattern_length: usize,
    escape: Option<char>,
    case_sensitive: bool,
}

impl LiteralTransitionRule {
    /// Create a new literal transition rule
    ///
    /// `pattern` may be empty, in which case the rule fires at line ends.
    /// The escape character is always compared case-sensitively.
    pub fn new(
        source: ContentType,
        destination: ContentType,
        pattern: impl Into<String>,
        escape: Option<char>,
        case_sensitive: bool,
    ) -> Self {
        let pattern = pattern.into();
        let pattern_length = column_len(&pattern);
        Self {
            source,
            destination,
            pattern,
            pattern_length,
            escape,
            case_sensitive,
        }
    }

    /// See [`TransitionRule::matches`]
    pub fn matches(&self, line: &str, column: usize) -> usize {
        if let Some(escape) = self.escape {
            if column > 0 && line.chars().nth(column - 1) == Some(escape) {
                return 0;
            }
        }
        let line_length = column_len(line);
        if self.pattern.is_empty() {
            // matches the end of the line, zero-width
            return usize::from(column == line_length);
        }
        if line_length - column.min(line_length) < self.pattern_length {
            return 0;
        }
        let text = &line[column_to_byte(line, column)..];
        let matched = if self.case_sensitive {
            text.starts_with(&self.pattern)
        } else {
            folded_prefix_eq(text, &self.pattern)
        };
        if matched {
            self.pattern_length
        } else {
            0
        }
    }
}

/// Matches a regex pattern anchored at a column
///
/// The match must begin exactly at the column. `^` and `\A` only match at
/// column 0, so line-start anchors behave correctly mid-line. Matching
/// never fails; a misbehaving pattern simply reports no match.
#[derive(Debug, Clone)]
pub struct RegexTransitionRule {
    source: ContentType,
    destination: ContentType,
    pattern: String,
    case_sensitive: bool,
    regex: Regex,
}

impl RegexTransitionRule {
    /// Create a new regex transition rule
    ///
    /// Fails with [`RuleError::InvalidArgument`] if `pattern` is
    /// malformed.
    pub fn new(
        source: ContentType,
        destination: ContentType,
        pattern: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        let pattern = pattern.into();
        let regex = regex_cache::get_or_compile(&pattern, case_sensitive)?;
        Ok(Self {
            source,
            destination,
            pattern,
            case_sensitive,
            regex,
        })
    }

    /// See [`TransitionRule::matches`]
    pub fn matches(&self, line: &str, column: usize) -> usize {
        let byte = column_to_byte(line, column);
        if byte > line.len() {
            return 0;
        }
        match self.regex.find_at(line, byte) {
            Some(m) if m.start() == byte => column_len(m.as_str()).max(1),
            _ => 0,
        }
    }
}

impl PartialEq for RegexTransitionRule {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.destination == other.destination
            && self.pattern == other.pattern
            && self.case_sensitive == other.case_sensitive
    }
}

/// Case-folded comparison of `pattern` against the front of `text`
fn folded_prefix_eq(text: &str, pattern: &str) -> bool {
    let mut chars = text.chars();
    pattern.chars().all(|p| match chars.next() {
        Some(t) => t.to_lowercase().eq(p.to_lowercase()),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: ContentType = ContentType::DEFAULT;

    fn string_type() -> ContentType {
        ContentType::new(1)
    }

    #[test]
    fn test_literal_prefix_match() {
        let rule = TransitionRule::literal(DEFAULT, string_type(), "\"");
        assert_eq!(rule.matches("say \"hi\"", 4), 1);
        assert_eq!(rule.matches("say \"hi\"", 0), 0);
        assert_eq!(rule.matches("say \"hi\"", 8), 0);
    }

    #[test]
    fn test_literal_multi_character() {
        let rule = TransitionRule::literal(DEFAULT, string_type(), "/*");
        assert_eq!(rule.matches("a /* b", 2), 2);
        assert_eq!(rule.matches("a / b", 2), 0);
        // not enough characters left on the line
        assert_eq!(rule.matches("ab/", 2), 0);
    }

    #[test]
    fn test_literal_escape_suppression() {
        let rule = TransitionRule::Literal(LiteralTransitionRule::new(
            string_type(),
            DEFAULT,
            "\"",
            Some('\\'),
            true,
        ));
        assert_eq!(rule.matches("a\\\"b\"", 2), 0); // preceded by the escape
        assert_eq!(rule.matches("a\\\"b\"", 4), 1);
        assert_eq!(rule.matches("\"x", 0), 1); // nothing before column 0
    }

    #[test]
    fn test_literal_empty_pattern_matches_eol() {
        let rule = TransitionRule::Literal(LiteralTransitionRule::new(
            string_type(),
            DEFAULT,
            "",
            None,
            true,
        ));
        assert_eq!(rule.matches("abc", 3), 1);
        assert_eq!(rule.matches("abc", 1), 0);
        assert_eq!(rule.matches("", 0), 1);
    }

    #[test]
    fn test_literal_case_folding() {
        let rule = TransitionRule::Literal(LiteralTransitionRule::new(
            DEFAULT,
            string_type(),
            "rem",
            None,
            false,
        ));
        assert_eq!(rule.matches("REM comment", 0), 3);
        assert_eq!(rule.matches("Rem comment", 0), 3);
        assert_eq!(rule.matches("ram comment", 0), 0);
    }

    #[test]
    fn test_regex_anchored_at_column() {
        let rule = TransitionRule::regex(DEFAULT, string_type(), "[0-9]+").unwrap();
        assert_eq!(rule.matches("ab12cd", 2), 2);
        // a match further right does not count
        assert_eq!(rule.matches("ab12cd", 1), 0);
        assert_eq!(rule.matches("ab12cd", 4), 0);
    }

    #[test]
    fn test_regex_line_start_anchor() {
        let rule = TransitionRule::regex(DEFAULT, string_type(), "^#").unwrap();
        assert_eq!(rule.matches("#include", 0), 1);
        assert_eq!(rule.matches("a#include", 1), 0);
    }

    #[test]
    fn test_regex_zero_width_reported_as_one() {
        let rule = TransitionRule::regex(string_type(), DEFAULT, "$").unwrap();
        assert_eq!(rule.matches("abc", 3), 1);
        assert_eq!(rule.matches("abc", 1), 0);
    }

    #[test]
    fn test_regex_invalid_pattern() {
        let err = TransitionRule::regex(DEFAULT, string_type(), "[oops").unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument { .. }));
    }

    #[test]
    fn test_source_and_destination() {
        let rule = TransitionRule::literal(DEFAULT, string_type(), "\"");
        assert_eq!(rule.source(), DEFAULT);
        assert_eq!(rule.destination(), string_type());
    }
}
