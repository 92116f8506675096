//! Lexipart - Incremental Lexical Partitioning and Tokenization
//!
//! This is a rule-based lexical engine for line-oriented, continuously
//! edited documents. It provides:
//! - Document partitioning into content-typed ranges (code, string,
//!   comment, ...) driven by flat transition rules
//! - Incremental, convergence-bounded repartitioning on every edit
//!   instead of full re-scans
//! - Rule-based tokenization inside one partition for styling,
//!   content assist and bracket matching
//! - Word sets, region/regex/number/URI token rules
//! - Declarative JSON rule-set definitions
//! - Styled-run reconstruction for presentation layers
//!
//! ## Quick Start
//!
//! ```rust
//! use lexipart::{ContentType, LineDocument, LexicalPartitioner, Position, TransitionRule};
//!
//! // "…" opens and closes a string partition
//! let string = ContentType::new(1);
//! let rules = vec![
//!     TransitionRule::literal(ContentType::DEFAULT, string, "\""),
//!     TransitionRule::literal(string, ContentType::DEFAULT, "\""),
//! ];
//!
//! let mut document = LineDocument::from_text("say \"hi\" now");
//! let mut partitioner = LexicalPartitioner::new();
//! partitioner.set_rules(rules).unwrap();
//! partitioner.install(&document).unwrap();
//!
//! let partition = partitioner.partition_at(&document, Position::new(0, 5)).unwrap();
//! assert_eq!(partition.content_type, string);
//!
//! // edits re-derive only the affected partitions
//! let change = document.insert(Position::new(0, 5), "!").unwrap();
//! partitioner.document_changed(&document, &change).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable diagnostic logging using the `log` crate

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

// Prelude module for convenient imports
pub mod prelude;

pub mod content_type;
pub mod document;
pub mod error;
pub mod highlight;
pub mod identifier;
pub mod partitioner;
pub mod position;
pub mod regex_cache;
pub mod ruleset;
pub mod scanner;
pub mod token;
pub mod token_rule;
pub mod transition;
pub mod uri;
pub mod word_set;

// ============================================================================
// Core Types
// ============================================================================

pub use content_type::ContentType;
pub use position::{Position, Region};
pub use token::{Token, TokenId};

// ============================================================================
// Documents
// ============================================================================

pub use document::{update_position, DocumentAccess, DocumentChange, LineDocument};

// ============================================================================
// Partitioning
// ============================================================================

pub use partitioner::{DocumentPartition, LexicalPartitioner, Partition};
pub use transition::{LiteralTransitionRule, RegexTransitionRule, TransitionRule};

// ============================================================================
// Tokenization
// ============================================================================

pub use identifier::{DefaultIdentifierSyntax, IdentifierSyntax};
pub use scanner::TokenScanner;
pub use token_rule::{NumberRule, RegexRule, RegionRule, TokenRule, UriRule, WordRule};
pub use uri::UriDetector;
pub use word_set::WordSet;

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{BadPosition, RuleError};

// ============================================================================
// Rule-Set Definitions
// ============================================================================

pub use ruleset::{RuleSetDef, ScannerDef, TokenRuleDef, TransitionDef, WordRuleDef};

// ============================================================================
// Presentation
// ============================================================================

pub use highlight::{HighlightReconstructor, StyledRun};
