//! Declarative rule-set definitions
//!
//! Hosts usually ship their lexical rules as data (one definition per
//! language mode) rather than as code. This module defines serde-enabled
//! definition types mirroring the engine's rule kinds, loadable from JSON
//! with [`RuleSetDef::from_json`], plus builders producing a configured
//! [`LexicalPartitioner`] and per-content-type [`TokenScanner`]s.
//!
//! Content types are named; a name's index in `content_types` is its
//! numeric rank. The order is load-bearing: the rank decides which
//! partition a boundary token belongs to. The first entry names the
//! default type occupying the document start.

use crate::content_type::ContentType;
use crate::error::RuleError;
use crate::partitioner::LexicalPartitioner;
use crate::scanner::TokenScanner;
use crate::token::TokenId;
use crate::token_rule::{NumberRule, RegexRule, RegionRule, TokenRule, UriRule, WordRule};
use crate::transition::{LiteralTransitionRule, RegexTransitionRule, TransitionRule};
use crate::uri::UriDetector;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A complete lexical description of one language mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDef {
    /// Content type names; the index is the numeric rank and the first
    /// entry is the default type
    pub content_types: Vec<String>,

    /// Partition boundary patterns
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,

    /// Token rules, grouped by the content type they apply inside
    #[serde(default)]
    pub scanners: Vec<ScannerDef>,
}

/// Definition of one transition rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitionDef {
    /// Literal boundary pattern
    Literal {
        /// Source content type name
        source: String,
        /// Destination content type name
        destination: String,
        /// Pattern text; empty matches at line ends
        pattern: String,
        /// Escape character suppressing the match
        #[serde(default)]
        escape: Option<char>,
        /// Case-sensitive comparison
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    /// Regex boundary pattern
    Regex {
        /// Source content type name
        source: String,
        /// Destination content type name
        destination: String,
        /// Pattern; matches are anchored at the scan column
        pattern: String,
        /// Case-sensitive compilation
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },
}

/// Token rules for one content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerDef {
    /// The content type the rules apply inside
    pub content_type: String,

    /// Token rules, tried in order
    #[serde(default)]
    pub rules: Vec<TokenRuleDef>,

    /// Word rules for the identifier lane
    #[serde(default)]
    pub word_rules: Vec<WordRuleDef>,
}

/// Definition of one token rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenRuleDef {
    /// Delimited region
    Region {
        /// Token identifier
        id: u16,
        /// Start sequence; must not be empty
        start: String,
        /// End sequence; empty means the token ends at the line end
        #[serde(default)]
        end: String,
        /// Escape character hiding the following character
        #[serde(default)]
        escape: Option<char>,
        /// Case-sensitive comparison
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    /// Anchored regex
    Regex {
        /// Token identifier
        id: u16,
        /// Pattern
        pattern: String,
        /// Case-sensitive compilation
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    /// Numeric literal
    Number {
        /// Token identifier
        id: u16,
    },

    /// URI
    Uri {
        /// Token identifier
        id: u16,
        /// Accepted schemes; empty accepts any valid scheme
        #[serde(default)]
        schemes: Vec<String>,
    },
}

/// Definition of one word rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRuleDef {
    /// Token identifier
    pub id: u16,
    /// The vocabulary
    pub words: Vec<String>,
    /// Case-sensitive membership
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

impl RuleSetDef {
    /// Load a definition from JSON
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        serde_json::from_str(json)
            .map_err(|e| RuleError::invalid_argument(format!("malformed rule set: {e}")))
    }

    /// The content type registered under `name`
    pub fn content_type(&self, name: &str) -> Option<ContentType> {
        self.content_types
            .iter()
            .position(|n| n == name)
            .map(|rank| ContentType::new(rank as u32))
    }

    fn resolve(&self, name: &str) -> Result<ContentType, RuleError> {
        self.content_type(name)
            .ok_or_else(|| RuleError::invalid_argument(format!("unknown content type {name:?}")))
    }

    /// Build the transition rules
    pub fn transition_rules(&self) -> Result<Vec<TransitionRule>, RuleError> {
        if self.content_types.is_empty() {
            return Err(RuleError::invalid_argument("no content types are defined"));
        }
        let mut rules = Vec::with_capacity(self.transitions.len());
        for definition in &self.transitions {
            rules.push(match definition {
                TransitionDef::Literal {
                    source,
                    destination,
                    pattern,
                    escape,
                    case_sensitive,
                } => TransitionRule::Literal(LiteralTransitionRule::new(
                    self.resolve(source)?,
                    self.resolve(destination)?,
                    pattern.clone(),
                    *escape,
                    *case_sensitive,
                )),
                TransitionDef::Regex {
                    source,
                    destination,
                    pattern,
                    case_sensitive,
                } => TransitionRule::Regex(RegexTransitionRule::new(
                    self.resolve(source)?,
                    self.resolve(destination)?,
                    pattern.clone(),
                    *case_sensitive,
                )?),
            });
        }
        Ok(rules)
    }

    /// Build a partitioner configured with the transition rules
    pub fn build_partitioner(&self) -> Result<LexicalPartitioner, RuleError> {
        let mut partitioner = LexicalPartitioner::new();
        partitioner.set_rules(self.transition_rules()?)?;
        Ok(partitioner)
    }

    /// Build the token scanner for the content type named `name`
    ///
    /// Returns `Ok(None)` when the definition has no scanner for it.
    pub fn build_scanner(&self, name: &str) -> Result<Option<TokenScanner>, RuleError> {
        self.resolve(name)?;
        let Some(definition) = self.scanners.iter().find(|s| s.content_type == name) else {
            return Ok(None);
        };
        let mut scanner = TokenScanner::new();
        for rule in &definition.rules {
            scanner.add_rule(match rule {
                TokenRuleDef::Region {
                    id,
                    start,
                    end,
                    escape,
                    case_sensitive,
                } => TokenRule::Region(RegionRule::new(
                    TokenId::new(*id),
                    start,
                    end,
                    *escape,
                    *case_sensitive,
                )?),
                TokenRuleDef::Regex {
                    id,
                    pattern,
                    case_sensitive,
                } => TokenRule::Regex(RegexRule::new(TokenId::new(*id), pattern, *case_sensitive)?),
                TokenRuleDef::Number { id } => TokenRule::Number(NumberRule::new(TokenId::new(*id))),
                TokenRuleDef::Uri { id, schemes } => {
                    let mut detector = UriDetector::new();
                    if !schemes.is_empty() {
                        detector.set_valid_schemes(schemes)?;
                    }
                    TokenRule::Uri(UriRule::new(TokenId::new(*id), detector))
                }
            })?;
        }
        for rule in &definition.word_rules {
            scanner.add_word_rule(WordRule::new(
                TokenId::new(rule.id),
                &rule.words,
                rule.case_sensitive,
            )?)?;
        }
        Ok(Some(scanner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_mode_json() -> &'static str {
        r#"{
            "content_types": ["default", "string"],
            "transitions": [
                { "Literal": { "source": "default", "destination": "string", "pattern": "\"" } },
                { "Literal": { "source": "string", "destination": "default", "pattern": "\"" } }
            ],
            "scanners": [
                {
                    "content_type": "default",
                    "rules": [ { "Number": { "id": 5 } } ],
                    "word_rules": [ { "id": 10, "words": ["if", "else"] } ]
                }
            ]
        }"#
    }

    #[test]
    fn test_from_json() {
        let def = RuleSetDef::from_json(string_mode_json()).unwrap();
        assert_eq!(def.content_types.len(), 2);
        assert_eq!(def.transitions.len(), 2);
        assert_eq!(def.content_type("string"), Some(ContentType::new(1)));
        assert_eq!(def.content_type("default"), Some(ContentType::DEFAULT));
        assert_eq!(def.content_type("comment"), None);
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = RuleSetDef::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument { .. }));
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let def = RuleSetDef::from_json(
            r#"{
                "content_types": ["default"],
                "transitions": [
                    { "Literal": { "source": "default", "destination": "ghost", "pattern": "x" } }
                ]
            }"#,
        )
        .unwrap();
        assert!(def.transition_rules().is_err());
        assert!(def.build_partitioner().is_err());
    }

    #[test]
    fn test_build_scanner() {
        let def = RuleSetDef::from_json(string_mode_json()).unwrap();
        assert!(def.build_scanner("default").unwrap().is_some());
        assert!(def.build_scanner("string").unwrap().is_none());
        assert!(def.build_scanner("ghost").is_err());
    }

    #[test]
    fn test_round_trip() {
        let def = RuleSetDef::from_json(string_mode_json()).unwrap();
        let json = serde_json::to_string(&def).unwrap();
        assert_eq!(RuleSetDef::from_json(&json).unwrap(), def);
    }
}
