//! Token recognition rules
//!
//! Token rules attempt to recognize one token at a scan position. Each
//! rule sees the text from the current position to the end of the scan
//! range on the current line, and either produces a [`Token`] or reports
//! no match — rules never fail at match time.
//!
//! Rule kinds are tagged variants of [`TokenRule`], dispatched by
//! `match`; registration order is the only precedence. [`WordRule`] is
//! kept apart: the scanner runs word rules only against an isolated
//! identifier lexeme, never against a prefix of one.

use crate::error::RuleError;
use crate::identifier::IdentifierSyntax;
use crate::position::{column_len, Position, Region};
use crate::regex_cache;
use crate::token::{Token, TokenId};
use crate::uri::UriDetector;
use crate::word_set::WordSet;
use regex::Regex;

/// A rule recognizing one token at a scan position
#[derive(Debug, Clone, PartialEq)]
pub enum TokenRule {
    /// Delimited region with optional escape character
    Region(RegionRule),
    /// Anchored regex match
    Regex(RegexRule),
    /// Numeric literal
    Number(NumberRule),
    /// URI
    Uri(UriRule),
}

impl TokenRule {
    /// The identifier of the tokens this rule produces
    #[inline]
    pub fn token_id(&self) -> TokenId {
        match self {
            TokenRule::Region(r) => r.id,
            TokenRule::Regex(r) => r.id,
            TokenRule::Number(r) => r.id,
            TokenRule::Uri(r) => r.id,
        }
    }

    /// Try to recognize a token in `text`, which starts at position `at`
    ///
    /// `text` runs from the scan position to the end of the scan range on
    /// the current line.
    pub fn parse(
        &self,
        at: Position,
        text: &str,
        syntax: &dyn IdentifierSyntax,
    ) -> Option<Token> {
        match self {
            TokenRule::Region(r) => r.parse(at, text),
            TokenRule::Regex(r) => r.parse(at, text),
            TokenRule::Number(r) => r.parse(at, text, syntax),
            TokenRule::Uri(r) => r.parse(at, text),
        }
    }
}

/// Produce the token covering `length` characters starting at `at`
#[inline]
fn token_at(id: TokenId, at: Position, length: usize) -> Token {
    Token::new(
        id,
        Region::new(at, Position::new(at.line, at.column + length)),
    )
}

/// Compare two characters, optionally folding case
#[inline]
fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase().eq(b.to_lowercase())
    }
}

fn sequence_matches(text: &[char], sequence: &[char], case_sensitive: bool) -> bool {
    text.len() >= sequence.len()
        && sequence
            .iter()
            .zip(text)
            .all(|(&s, &t)| chars_eq(t, s, case_sensitive))
}

/// Matches a literal start sequence and scans for a literal end sequence
///
/// An optional escape character hides the character following it from the
/// end-sequence search. With an empty end sequence the token ends at the
/// end of the line; when the end sequence is never found the token
/// extends to the end of the scan range.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRule {
    id: TokenId,
    start_sequence: Vec<char>,
    end_sequence: Vec<char>,
    escape: Option<char>,
    case_sensitive: bool,
}

impl RegionRule {
    /// Create a new region rule
    ///
    /// Fails with [`RuleError::InvalidArgument`] if `start_sequence` is
    /// empty.
    pub fn new(
        id: TokenId,
        start_sequence: &str,
        end_sequence: &str,
        escape: Option<char>,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        if start_sequence.is_empty() {
            return Err(RuleError::invalid_argument("the start sequence is empty"));
        }
        Ok(Self {
            id,
            start_sequence: start_sequence.chars().collect(),
            end_sequence: end_sequence.chars().collect(),
            escape,
            case_sensitive,
        })
    }

    fn parse(&self, at: Position, text: &str) -> Option<Token> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() < self.start_sequence.len() + self.end_sequence.len()
            || !sequence_matches(&chars, &self.start_sequence, self.case_sensitive)
        {
            return None;
        }
        let mut end = chars.len();
        if !self.end_sequence.is_empty() {
            let mut p = self.start_sequence.len();
            while p + self.end_sequence.len() <= chars.len() {
                if self.escape == Some(chars[p]) {
                    p += 2;
                    continue;
                }
                if sequence_matches(&chars[p..], &self.end_sequence, self.case_sensitive) {
                    end = p + self.end_sequence.len();
                    break;
                }
                p += 1;
            }
        }
        Some(token_at(self.id, at, end))
    }
}

/// Matches a regex pattern anchored at the scan position
///
/// A zero-width match is treated as no match so that the scanner always
/// makes progress.
#[derive(Debug, Clone)]
pub struct RegexRule {
    id: TokenId,
    pattern: String,
    case_sensitive: bool,
    regex: Regex,
}

impl RegexRule {
    /// Create a new regex rule
    ///
    /// Fails with [`RuleError::InvalidArgument`] if `pattern` is
    /// malformed.
    pub fn new(id: TokenId, pattern: &str, case_sensitive: bool) -> Result<Self, RuleError> {
        let regex = regex_cache::get_or_compile(pattern, case_sensitive)?;
        Ok(Self {
            id,
            pattern: pattern.to_owned(),
            case_sensitive,
            regex,
        })
    }

    fn parse(&self, at: Position, text: &str) -> Option<Token> {
        match self.regex.find(text) {
            Some(m) if m.start() == 0 && m.end() > 0 => {
                Some(token_at(self.id, at, column_len(m.as_str())))
            }
            _ => None,
        }
    }
}

impl PartialEq for RegexRule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.pattern == other.pattern
            && self.case_sensitive == other.case_sensitive
    }
}

/// Matches numeric literals
///
/// Follows the ECMAScript 3 "Numeric Literals" grammar: decimal literals
/// with optional fraction and exponent, and `0x` hexadecimal integers.
/// Octal literals are not recognized. A literal immediately followed by a
/// digit or an identifier character does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRule {
    id: TokenId,
}

impl NumberRule {
    /// Create a new number rule
    #[inline]
    pub fn new(id: TokenId) -> Self {
        Self { id }
    }

    fn parse(&self, at: Position, text: &str, syntax: &dyn IdentifierSyntax) -> Option<Token> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return None;
        }
        let len = chars.len();
        let mut e;
        if len > 2 && chars[0] == '0' && (chars[1] == 'x' || chars[1] == 'X') {
            // HexIntegerLiteral
            e = 2;
            while e < len && chars[e].is_ascii_hexdigit() {
                e += 1;
            }
            if e == 2 {
                return None;
            }
        } else {
            // DecimalLiteral
            let mut found_integer = false;
            let mut found_dot = false;
            e = 0;
            if chars[0].is_ascii_digit() {
                // DecimalIntegerLiteral: 0 | [1-9][0-9]*
                found_integer = true;
                e = 1;
                if chars[0] != '0' {
                    while e < len && chars[e].is_ascii_digit() {
                        e += 1;
                    }
                }
            }
            if e < len && chars[e] == '.' {
                // . DecimalDigits
                let fraction_start = e + 1;
                e = fraction_start;
                while e < len && chars[e].is_ascii_digit() {
                    e += 1;
                }
                if e == fraction_start {
                    return None;
                }
                found_dot = true;
            }
            if !found_integer && !found_dot {
                return None;
            }
            if e < len && (chars[e] == 'e' || chars[e] == 'E') {
                // ExponentPart: [eE][+-]?[0-9]+
                let mut x = e + 1;
                if x < len && (chars[x] == '+' || chars[x] == '-') {
                    x += 1;
                }
                let digits_start = x;
                while x < len && chars[x].is_ascii_digit() {
                    x += 1;
                }
                if x == digits_start {
                    return None;
                }
                e = x;
            }
        }

        // "The source character immediately following a NumericLiteral
        // must not be an IdentifierStart or DecimalDigit."
        if e < len && (chars[e].is_ascii_digit() || syntax.is_identifier_continue(chars[e])) {
            return None;
        }
        Some(token_at(self.id, at, e))
    }
}

/// Matches a URI at the scan position
#[derive(Debug, Clone, PartialEq)]
pub struct UriRule {
    id: TokenId,
    detector: UriDetector,
}

impl UriRule {
    /// Create a new URI rule around a detector
    #[inline]
    pub fn new(id: TokenId, detector: UriDetector) -> Self {
        Self { id, detector }
    }

    fn parse(&self, at: Position, text: &str) -> Option<Token> {
        let length = self.detector.detect(text)?;
        Some(token_at(self.id, at, length))
    }
}

/// Matches an isolated identifier lexeme against a fixed vocabulary
///
/// The scanner hands a word rule the whole identifier span; the rule
/// matches only if that exact span is a registered word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRule {
    id: TokenId,
    words: WordSet,
}

impl WordRule {
    /// Create a word rule from a vocabulary
    ///
    /// Fails with [`RuleError::InvalidArgument`] if the vocabulary is
    /// empty.
    pub fn new<I, S>(id: TokenId, words: I, case_sensitive: bool) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words.into_iter().map(|w| w.as_ref().to_owned()).collect();
        if words.is_empty() {
            return Err(RuleError::invalid_argument("the word list is empty"));
        }
        Ok(Self {
            id,
            words: WordSet::new(words, case_sensitive),
        })
    }

    /// Create a word rule from one string of separator-joined words
    ///
    /// Consecutive separators are skipped. Fails with
    /// [`RuleError::InvalidArgument`] if no word remains.
    pub fn from_separated(
        id: TokenId,
        words: &str,
        separator: char,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        Self::new(
            id,
            words.split(separator).filter(|w| !w.is_empty()),
            case_sensitive,
        )
    }

    /// The identifier of the tokens this rule produces
    #[inline]
    pub fn token_id(&self) -> TokenId {
        self.id
    }

    /// Try to match the isolated identifier `word` starting at `at`
    pub fn parse(&self, at: Position, word: &str) -> Option<Token> {
        if !self.words.find(word) {
            return None;
        }
        Some(token_at(self.id, at, column_len(word)))
    }
}
