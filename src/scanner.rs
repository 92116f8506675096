//! Rule-driven token scanning
//!
//! A [`TokenScanner`] walks one document region and applies an ordered
//! list of token rules to produce a stream of tokens. The scanner is a
//! two-state machine: *idle* (no active region) and *scanning*. Rules
//! must be registered while idle; the rule collections are effectively
//! immutable once a scan starts.
//!
//! Each call to [`TokenScanner::next_token`] proceeds from the current
//! position:
//!
//! 1. at the end of the region, the scan is done;
//! 2. each registered rule is tried in registration order against the
//!    text up to the end of the current line — the first match wins;
//! 3. otherwise, if the position starts an identifier lexeme, the lexeme
//!    is extended to its maximal span and each word rule is tried against
//!    that exact span — a word rule never matches a prefix;
//! 4. otherwise the scanner advances one character.
//!
//! Text skipped by steps 3 and 4 is reported as filler tokens carrying
//! [`TokenId::NONE`], so the emitted tokens tile the scanned region.
//! Tokens are single-line; filler is flushed at every line end.

use crate::document::DocumentAccess;
use crate::error::{BadPosition, RuleError};
use crate::identifier::{DefaultIdentifierSyntax, IdentifierSyntax};
use crate::position::{column_len, column_to_byte, Position, Region};
use crate::token::{Token, TokenId};
use crate::token_rule::{TokenRule, WordRule};

/// Scans a document region and returns the tokens it finds
pub struct TokenScanner {
    rules: Vec<TokenRule>,
    word_rules: Vec<WordRule>,
    syntax: Box<dyn IdentifierSyntax>,
    scan: Option<ScanState>,
}

struct ScanState {
    region: Region,
    position: Position,
    filler_start: Position,
    pending: Option<Token>,
}

impl TokenScanner {
    /// Create an idle scanner with the default identifier syntax
    #[inline]
    pub fn new() -> Self {
        Self::with_identifier_syntax(Box::new(DefaultIdentifierSyntax))
    }

    /// Create an idle scanner with a host-supplied identifier syntax
    pub fn with_identifier_syntax(syntax: Box<dyn IdentifierSyntax>) -> Self {
        Self {
            rules: Vec::new(),
            word_rules: Vec::new(),
            syntax,
            scan: None,
        }
    }

    /// Register a token rule; tried in registration order
    ///
    /// Fails with [`RuleError::IllegalState`] while a scan is active and
    /// with [`RuleError::InvalidArgument`] if an equal rule is already
    /// registered.
    pub fn add_rule(&mut self, rule: TokenRule) -> Result<(), RuleError> {
        if !self.is_done() {
            return Err(RuleError::illegal_state(
                "rules cannot change while a scan is active",
            ));
        }
        if self.rules.contains(&rule) {
            return Err(RuleError::invalid_argument("the rule is already registered"));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Register a word rule for the identifier lane
    ///
    /// Same failure conditions as [`TokenScanner::add_rule`].
    pub fn add_word_rule(&mut self, rule: WordRule) -> Result<(), RuleError> {
        if !self.is_done() {
            return Err(RuleError::illegal_state(
                "rules cannot change while a scan is active",
            ));
        }
        if self.word_rules.contains(&rule) {
            return Err(RuleError::invalid_argument("the rule is already registered"));
        }
        self.word_rules.push(rule);
        Ok(())
    }

    /// Begin scanning `region`
    ///
    /// Resets any previous scan. Fails with [`BadPosition`] if the region
    /// does not lie inside the document.
    pub fn parse<D: DocumentAccess>(
        &mut self,
        document: &D,
        region: Region,
    ) -> Result<(), BadPosition> {
        for at in [region.begin(), region.end()] {
            if at.line >= document.line_count() || at.column > document.line_length(at.line) {
                return Err(BadPosition::new(at));
            }
        }
        self.scan = Some(ScanState {
            region,
            position: region.begin(),
            filler_start: region.begin(),
            pending: None,
        });
        Ok(())
    }

    /// Check whether the scan has produced its last token
    ///
    /// An idle scanner reports done.
    pub fn is_done(&self) -> bool {
        match &self.scan {
            None => true,
            Some(scan) => {
                scan.pending.is_none()
                    && scan.position >= scan.region.end()
                    && scan.filler_start >= scan.region.end()
            }
        }
    }

    /// The current scan position, if a scan is active
    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.scan.as_ref().map(|scan| scan.position)
    }

    /// Produce the next token, or `None` when the region is exhausted
    pub fn next_token<D: DocumentAccess>(&mut self, document: &D) -> Option<Token> {
        let scan = self.scan.as_mut()?;
        if let Some(token) = scan.pending.take() {
            return Some(token);
        }
        loop {
            let end = scan.region.end();
            if scan.position >= end {
                let up_to = scan.position;
                return take_filler(scan, up_to);
            }

            let line = document.line(scan.position.line);
            let line_end_column = if scan.position.line == end.line {
                end.column
            } else {
                column_len(line)
            };
            if scan.position.column >= line_end_column {
                // line exhausted: flush its filler, cross to the next line
                let up_to = scan.position;
                let filler = take_filler(scan, up_to);
                scan.position = Position::new(scan.position.line + 1, 0);
                scan.filler_start = scan.position;
                if filler.is_some() {
                    return filler;
                }
                continue;
            }

            let from = column_to_byte(line, scan.position.column);
            let to = column_to_byte(line, line_end_column);
            let text = &line[from..to];

            if let Some(token) = self
                .rules
                .iter()
                .find_map(|rule| rule.parse(scan.position, text, self.syntax.as_ref()))
            {
                return emit(scan, token);
            }

            let word_length = self.syntax.eat_identifier(text);
            if word_length > 0 {
                let word = &text[..column_to_byte(text, word_length)];
                if let Some(token) = self
                    .word_rules
                    .iter()
                    .find_map(|rule| rule.parse(scan.position, word))
                {
                    return emit(scan, token);
                }
                // an unknown identifier is skipped as a whole
                scan.position.column += word_length;
            } else {
                scan.position.column += 1;
            }
        }
    }
}

impl Default for TokenScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Flush accumulated filler ending at `up_to`, if any
fn take_filler(scan: &mut ScanState, up_to: Position) -> Option<Token> {
    if scan.filler_start < up_to {
        let token = Token::new(TokenId::NONE, Region::new(scan.filler_start, up_to));
        scan.filler_start = up_to;
        Some(token)
    } else {
        None
    }
}

/// Return `token`, first flushing any filler that precedes it
fn emit(scan: &mut ScanState, token: Token) -> Option<Token> {
    let filler = take_filler(scan, token.region.begin());
    scan.position = token.region.end();
    scan.filler_start = scan.position;
    match filler {
        Some(filler) => {
            scan.pending = Some(token);
            Some(filler)
        }
        None => Some(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LineDocument;
    use crate::token_rule::{NumberRule, RegionRule};

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    fn collect(scanner: &mut TokenScanner, document: &LineDocument) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token(document) {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_whole_identifier_word_matching() {
        // a word rule never matches a prefix of an identifier
        let document = LineDocument::from_text("ifx");
        let mut scanner = TokenScanner::new();
        scanner
            .add_word_rule(WordRule::new(TokenId::new(10), ["if"], true).unwrap())
            .unwrap();
        scanner.parse(&document, document.region()).unwrap();
        let tokens = collect(&mut scanner, &document);
        assert_eq!(
            tokens,
            vec![Token::new(
                TokenId::NONE,
                Region::new(pos(0, 0), pos(0, 3))
            )]
        );
        assert!(scanner.is_done());
    }

    #[test]
    fn test_keyword_and_filler() {
        let document = LineDocument::from_text("if x");
        let mut scanner = TokenScanner::new();
        scanner
            .add_word_rule(WordRule::new(TokenId::new(10), ["if"], true).unwrap())
            .unwrap();
        scanner.parse(&document, document.region()).unwrap();
        let tokens = collect(&mut scanner, &document);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenId::new(10), Region::new(pos(0, 0), pos(0, 2))),
                Token::new(TokenId::NONE, Region::new(pos(0, 2), pos(0, 4))),
            ]
        );
    }

    #[test]
    fn test_registration_order_precedence() {
        // both rules match at column 0; the first registered wins
        let document = LineDocument::from_text("''x");
        let mut scanner = TokenScanner::new();
        scanner
            .add_rule(TokenRule::Region(
                RegionRule::new(TokenId::new(1), "'", "'", None, true).unwrap(),
            ))
            .unwrap();
        scanner
            .add_rule(TokenRule::Region(
                RegionRule::new(TokenId::new(2), "''", "", None, true).unwrap(),
            ))
            .unwrap();
        scanner.parse(&document, document.region()).unwrap();
        let first = scanner.next_token(&document).unwrap();
        assert_eq!(first.id, TokenId::new(1));
    }

    #[test]
    fn test_tokens_are_single_line() {
        let document = LineDocument::from_text("ab\ncd");
        let mut scanner = TokenScanner::new();
        scanner.parse(&document, document.region()).unwrap();
        let tokens = collect(&mut scanner, &document);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenId::NONE, Region::new(pos(0, 0), pos(0, 2))),
                Token::new(TokenId::NONE, Region::new(pos(1, 0), pos(1, 2))),
            ]
        );
    }

    #[test]
    fn test_scan_scoped_to_region() {
        let document = LineDocument::from_text("1 23 4");
        let mut scanner = TokenScanner::new();
        scanner
            .add_rule(TokenRule::Number(NumberRule::new(TokenId::new(5))))
            .unwrap();
        scanner
            .parse(&document, Region::new(pos(0, 2), pos(0, 4)))
            .unwrap();
        let tokens = collect(&mut scanner, &document);
        assert_eq!(
            tokens,
            vec![Token::new(
                TokenId::new(5),
                Region::new(pos(0, 2), pos(0, 4))
            )]
        );
    }

    #[test]
    fn test_reconfiguration_requires_idle() {
        let document = LineDocument::from_text("abc def");
        let mut scanner = TokenScanner::new();
        scanner
            .add_word_rule(WordRule::new(TokenId::new(10), ["abc"], true).unwrap())
            .unwrap();
        scanner.parse(&document, document.region()).unwrap();
        assert!(!scanner.is_done());
        let err = scanner
            .add_rule(TokenRule::Number(NumberRule::new(TokenId::new(5))))
            .unwrap_err();
        assert!(matches!(err, RuleError::IllegalState { .. }));

        // run the scan to completion, then reconfiguration is legal again
        collect(&mut scanner, &document);
        assert!(scanner.is_done());
        assert!(scanner
            .add_rule(TokenRule::Number(NumberRule::new(TokenId::new(5))))
            .is_ok());
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let mut scanner = TokenScanner::new();
        scanner
            .add_rule(TokenRule::Number(NumberRule::new(TokenId::new(5))))
            .unwrap();
        let err = scanner
            .add_rule(TokenRule::Number(NumberRule::new(TokenId::new(5))))
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument { .. }));
    }

    #[test]
    fn test_parse_outside_document() {
        let document = LineDocument::from_text("ab");
        let mut scanner = TokenScanner::new();
        let err = scanner
            .parse(&document, Region::new(pos(0, 0), pos(1, 0)))
            .unwrap_err();
        assert_eq!(err.position, pos(1, 0));
    }

    #[test]
    fn test_position_tracking() {
        let document = LineDocument::from_text("9 9");
        let mut scanner = TokenScanner::new();
        scanner
            .add_rule(TokenRule::Number(NumberRule::new(TokenId::new(5))))
            .unwrap();
        assert_eq!(scanner.position(), None);
        scanner.parse(&document, document.region()).unwrap();
        assert_eq!(scanner.position(), Some(pos(0, 0)));
        scanner.next_token(&document).unwrap();
        assert_eq!(scanner.position(), Some(pos(0, 1)));
    }
}
