//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from lexipart.
//! Importing this module with a wildcard import brings the core types
//! into scope:
//!
//! ```
//! use lexipart::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`Position`] / [`Region`] - line/column addressing
//! - [`ContentType`] - partition classification tag
//! - [`Token`] / [`TokenId`] - scanner output
//!
//! ## Documents
//! - [`DocumentAccess`] - the line-oriented document view
//! - [`DocumentChange`] - edit descriptor
//! - [`LineDocument`] - concrete line-store document
//!
//! ## Partitioning
//! - [`LexicalPartitioner`] - incremental partitioner
//! - [`TransitionRule`] - partition boundary patterns
//!
//! ## Tokenization
//! - [`TokenScanner`] - rule-driven token scanner
//! - [`TokenRule`] / [`WordRule`] - token recognition rules
//! - [`WordSet`] - fixed-vocabulary membership tests
//!
//! ## Error Handling
//! - [`RuleError`] / [`BadPosition`]

// ============================================================================
// Core Types
// ============================================================================

pub use crate::content_type::ContentType;
pub use crate::position::{Position, Region};
pub use crate::token::{Token, TokenId};

// ============================================================================
// Documents
// ============================================================================

pub use crate::document::{DocumentAccess, DocumentChange, LineDocument};

// ============================================================================
// Partitioning
// ============================================================================

pub use crate::partitioner::{DocumentPartition, LexicalPartitioner};
pub use crate::transition::TransitionRule;

// ============================================================================
// Tokenization
// ============================================================================

pub use crate::scanner::TokenScanner;
pub use crate::token_rule::{TokenRule, WordRule};
pub use crate::word_set::WordSet;

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::error::{BadPosition, RuleError};
