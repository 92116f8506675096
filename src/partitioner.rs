//! Incremental lexical partitioning
//!
//! [`LexicalPartitioner`] maintains an ordered list of partitions tiling
//! the whole document, derived from the registered transition rules. The
//! list is kept consistent across edits by incremental, convergence-
//! bounded recomputation instead of full re-scans.
//!
//! # Invariants
//!
//! After every mutation:
//!
//! 1. the first partition starts at the document start (a `DEFAULT`
//!    partition is synthesized there when no rule claims it);
//! 2. partition starts are ascending — no overlap, no gap: a partition
//!    implicitly ends where the next one starts (or at the document end);
//! 3. no two adjacent partitions share a content type;
//! 4. no partition starts at the document end.
//!
//! # Incremental update
//!
//! On `document_changed` the partitioner drops the partitions inside a
//! deleted span, shifts the surviving ones by the edit's length delta,
//! and rescans forward from the start of the first edited line. Each
//! boundary token found inserts a partition; the token belongs to the
//! destination partition when the destination type ranks numerically
//! greater than the source type, otherwise to the one being left.
//! Partitions the rescan overtakes without re-deriving are stale and are
//! dropped. The rescan stops at the end of an edited line as soon as the
//! recomputed content type converges with the type that held there
//! before the edit, or at the document end.

use crate::content_type::ContentType;
use crate::document::{update_position, DocumentAccess, DocumentChange};
use crate::error::{BadPosition, RuleError};
use crate::position::{column_len, Position, Region};
use crate::transition::TransitionRule;

/// Logging is a no-op unless the `logging` feature is enabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

/// One partition of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    content_type: ContentType,
    start: Position,
    token_start: Position,
    token_length: usize,
}

impl Partition {
    #[inline]
    fn new(
        content_type: ContentType,
        start: Position,
        token_start: Position,
        token_length: usize,
    ) -> Self {
        Self {
            content_type,
            start,
            token_start,
            token_length,
        }
    }

    /// The partition's content type
    #[inline]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The partition's effective beginning
    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    /// Start of the boundary token which created the partition
    #[inline]
    pub fn token_start(&self) -> Position {
        self.token_start
    }

    /// Length of the boundary token in character units
    #[inline]
    pub fn token_length(&self) -> usize {
        self.token_length
    }

    /// End of the boundary token
    #[inline]
    fn token_end(&self) -> Position {
        Position::new(self.token_start.line, self.token_start.column + self.token_length)
    }
}

/// Result of a content-type query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentPartition {
    /// The content type in effect
    pub content_type: ContentType,
    /// The partition's extent
    pub region: Region,
}

/// Partitions a document with lexical transition rules
pub struct LexicalPartitioner {
    rules: Vec<TransitionRule>,
    partitions: Vec<Partition>,
    installed: bool,
}

impl LexicalPartitioner {
    /// Create a partitioner with no rules, not yet attached to a document
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            partitions: vec![Partition::new(
                ContentType::DEFAULT,
                Position::zero(),
                Position::zero(),
                0,
            )],
            installed: false,
        }
    }

    /// Configure the transition rules
    ///
    /// Must be called before [`LexicalPartitioner::install`]; afterwards
    /// it fails with [`RuleError::IllegalState`]. A rule whose source and
    /// destination coincide, or which names the `UNDETERMINED` type, is
    /// rejected with [`RuleError::InvalidArgument`].
    pub fn set_rules<I>(&mut self, rules: I) -> Result<(), RuleError>
    where
        I: IntoIterator<Item = TransitionRule>,
    {
        if self.installed {
            return Err(RuleError::illegal_state(
                "the partitioner is already connected to a document",
            ));
        }
        let rules: Vec<TransitionRule> = rules.into_iter().collect();
        for rule in &rules {
            if rule.source() == rule.destination() {
                return Err(RuleError::invalid_argument(
                    "a transition rule must change the content type",
                ));
            }
            if rule.source() == ContentType::UNDETERMINED
                || rule.destination() == ContentType::UNDETERMINED
            {
                return Err(RuleError::invalid_argument(
                    "the undetermined content type cannot appear in a rule",
                ));
            }
        }
        self.rules = rules;
        Ok(())
    }

    /// Attach to a document and compute its initial partitioning
    ///
    /// Returns the invalidated region. A partitioner attaches to exactly
    /// one document; a second call fails with [`RuleError::IllegalState`].
    pub fn install<D: DocumentAccess>(&mut self, document: &D) -> Result<Region, RuleError> {
        if self.installed {
            return Err(RuleError::illegal_state(
                "the partitioner is already connected to a document",
            ));
        }
        self.installed = true;
        self.partitions = vec![Partition::new(
            ContentType::DEFAULT,
            Position::zero(),
            Position::zero(),
            0,
        )];
        let end = document.end_position();
        if end == Position::zero() {
            return Ok(Region::empty(Position::zero()));
        }
        let change = DocumentChange::insertion(Region::new(Position::zero(), end));
        Ok(self.reconstruct(document, &change))
    }

    /// First phase of the document's edit notification; a no-op hook
    pub fn document_about_to_change(&mut self) {}

    /// Second phase of the edit notification: incrementally re-derive the
    /// partitioning
    ///
    /// `document` must already reflect the edit described by `change`.
    /// Returns the region whose styling must be re-derived, from the
    /// start of the first edited line to the final rescan position.
    pub fn document_changed<D: DocumentAccess>(
        &mut self,
        document: &D,
        change: &DocumentChange,
    ) -> Result<Region, RuleError> {
        if !self.installed {
            return Err(RuleError::illegal_state(
                "the partitioner is not connected to a document",
            ));
        }
        if change.is_empty() {
            return Ok(Region::empty(change.begin()));
        }
        Ok(self.reconstruct(document, change))
    }

    /// The partition containing `at`
    ///
    /// When `at` lies exactly on a partition boundary which is also a
    /// line end, the previous partition is preferred: a partition extends
    /// through a trailing line-end token rather than yielding a
    /// zero-width partition at the next line start.
    pub fn partition_at<D: DocumentAccess>(
        &self,
        document: &D,
        at: Position,
    ) -> Result<DocumentPartition, BadPosition> {
        if at.line >= document.line_count() || at.column > document.line_length(at.line) {
            return Err(BadPosition::new(at));
        }
        let index = self.index_of(document, at);
        let partition = &self.partitions[index];
        let end = if index + 1 < self.partitions.len() {
            self.partitions[index + 1].start
        } else {
            document.end_position()
        };
        Ok(DocumentPartition {
            content_type: partition.content_type,
            region: Region::new(partition.start, end),
        })
    }

    /// The current partitions, ascending by start
    #[inline]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Log the partition list for diagnosis
    pub fn dump(&self) {
        log_debug!("partitioner dump start:");
        #[cfg(feature = "logging")]
        for partition in &self.partitions {
            log::debug!(
                "  {} = ({}, {})",
                partition.content_type,
                partition.start.line,
                partition.start.column
            );
        }
    }

    /// Recompute the partitioning for the region affected by `change`
    fn reconstruct<D: DocumentAccess>(
        &mut self,
        document: &D,
        change: &DocumentChange,
    ) -> Region {
        let document_end = document.end_position();
        let zero = Position::zero();

        // the translated pre-edit partitioning: every convergence target
        // below is answered from this frozen view, never from the list
        // being rebuilt
        let mut old_partitions = self.partitions.clone();
        for partition in &mut old_partitions {
            partition.start = update_position(partition.start, change);
            partition.token_start = update_position(partition.token_start, change);
        }

        // drop the partitions encompassed by a deleted span (pre-edit
        // coordinates), then shift the survivors
        if change.is_deletion() {
            self.erase_partitions(document, change.erased().begin(), change.erased().end());
        }
        for partition in &mut self.partitions {
            partition.start = update_position(partition.start, change);
            partition.token_start = update_position(partition.token_start, change);
        }

        // the rescan covers at least the edited lines
        let scan_start = Position::new(change.begin().line, 0);
        let mut affected_end = if change.inserted().is_empty() {
            change.erased().begin()
        } else {
            change.inserted().end()
        };
        affected_end.column = document.line_length(affected_end.line);
        self.erase_partitions(document, scan_start, affected_end);
        let mut affected_end_type = content_type_before(&old_partitions, affected_end);

        // forward rescan
        let mut index = self.index_of(document, scan_start);
        let mut content_type = self.partitions[index].content_type;
        let mut position = scan_start;
        loop {
            self.remove_stale(&mut index, position, None);

            let line = document.line(position.line);
            let at_eol = position.column == column_len(line);
            let (mut token_length, destination) =
                self.try_transition(line, position.column, content_type);
            if token_length != 0 {
                if at_eol {
                    token_length = 0; // a line terminator is zero-length
                }
                let token_start = position;
                let token_end =
                    Position::new(position.line, position.column + token_length);
                // the delimiter belongs to the partition of the greater type
                let start = if destination > content_type {
                    token_start
                } else {
                    token_end
                };
                debug_assert_ne!(destination, content_type);
                if index > 0 || token_start > zero {
                    index += 1;
                    self.partitions.insert(
                        index,
                        Partition::new(destination, start, token_start, token_length),
                    );
                } else {
                    // a transition at the document start claims the first
                    // partition
                    self.partitions[0] =
                        Partition::new(destination, start, token_start, token_length);
                }
                content_type = destination;
                if !at_eol {
                    position = token_end;
                }
                self.remove_stale(&mut index, position, Some(token_start));
            }
            // the rescan converges when, at the end of an edited line, the
            // recomputed content type matches the pre-edit one
            if position == document_end
                || (at_eol && position == affected_end && content_type == affected_end_type)
            {
                break;
            }
            if token_length == 0 {
                if at_eol {
                    position = Position::new(position.line + 1, 0);
                    if position.line > affected_end.line {
                        affected_end =
                            Position::new(position.line, document.line_length(position.line));
                        affected_end_type =
                            content_type_before(&old_partitions, affected_end);
                    }
                } else {
                    position.column += 1;
                }
            }
        }

        // a partition opened exactly at the document end is dropped
        if self.partitions.len() > 1
            && self.partitions.last().map(|p| p.start) == Some(document_end)
        {
            self.partitions.pop();
        }

        self.verify();
        log_debug!(
            "rescan of {} partitions stopped at ({}, {})",
            self.partitions.len(),
            position.line,
            position.column
        );
        Region::new(scan_start, position)
    }

    /// Erase the partitions whose boundary tokens lie inside
    /// `[first, last]`, then restore invariants 1 and 4
    fn erase_partitions<D: DocumentAccess>(
        &mut self,
        document: &D,
        first: Position,
        last: Position,
    ) {
        let mut deleted_first = self.index_of(document, first);
        let front = &self.partitions[deleted_first];
        if first > front.token_end() || (first == front.token_end() && front.token_length > 0) {
            deleted_first += 1; // this partition's token is untouched
        }
        let mut deleted_last = self.index_of(document, last) + 1; // exclusive
        if deleted_last < self.partitions.len()
            && self.partitions[deleted_last].token_start < last
        {
            deleted_last += 1;
        }
        if deleted_last > deleted_first {
            self.partitions.drain(deleted_first..deleted_last);
        }

        // restore the partition at the document start
        let zero = Position::zero();
        if self.partitions.first().map(|p| p.start) != Some(zero) {
            if self.partitions.first().map(|p| p.content_type) != Some(ContentType::DEFAULT) {
                self.partitions
                    .insert(0, Partition::new(ContentType::DEFAULT, zero, zero, 0));
            } else {
                let front = &mut self.partitions[0];
                front.start = zero;
                front.token_start = zero;
                front.token_length = 0;
            }
        }

        // drop a partition opening at the document end
        if self.partitions.len() > 1
            && self.partitions.last().map(|p| p.start) == Some(document.end_position())
        {
            self.partitions.pop();
        }
    }

    /// Drop partitions after `index` which the rescan has overtaken
    /// without re-deriving
    fn remove_stale(
        &mut self,
        index: &mut usize,
        position: Position,
        matched_token_start: Option<Position>,
    ) {
        while *index + 1 < self.partitions.len() {
            let token_start = self.partitions[*index + 1].token_start;
            if token_start < position || matched_token_start == Some(token_start) {
                self.partitions.remove(*index + 1);
            } else {
                break;
            }
        }
    }

    /// Index of the partition containing `at` in the live list
    fn index_of<D: DocumentAccess>(&self, document: &D, at: Position) -> usize {
        let upper = self.partitions.partition_point(|p| p.start <= at);
        if upper == 0 {
            // only restoring invariant 1 can observe this state
            return 0;
        }
        let mut index = upper - 1;
        // a boundary on a line end belongs to the partition before it
        if at.line < document.line_count()
            && index > 0
            && self.partitions[index].token_start == at
            && at.column == document.line_length(at.line)
        {
            index -= 1;
        }
        // zero-width partitions sort before their successor at one start
        while index + 1 < self.partitions.len()
            && self.partitions[index + 1].start == self.partitions[index].start
        {
            index += 1;
        }
        index
    }

    /// First matching rule bound to `content_type`, by registration order
    fn try_transition(
        &self,
        line: &str,
        column: usize,
        content_type: ContentType,
    ) -> (usize, ContentType) {
        for rule in &self.rules {
            if rule.source() == content_type {
                let length = rule.matches(line, column);
                if length != 0 {
                    return (length, rule.destination());
                }
            }
        }
        (0, ContentType::UNDETERMINED)
    }

    /// Diagnose the partition list
    fn verify(&self) {
        #[cfg(debug_assertions)]
        {
            assert!(!self.partitions.is_empty());
            assert_eq!(self.partitions[0].start, Position::zero());
            let mut previous_was_empty = false;
            for pair in self.partitions.windows(2) {
                assert_ne!(pair[0].content_type, pair[1].content_type);
                if pair[0].start == pair[1].start {
                    assert!(!previous_was_empty);
                    previous_was_empty = true;
                } else {
                    assert!(pair[0].start < pair[1].start);
                    previous_was_empty = false;
                }
            }
        }
    }
}

impl Default for LexicalPartitioner {
    fn default() -> Self {
        Self::new()
    }
}

/// The content type in effect when a scan arrives at `at`, answered from
/// a frozen partition list
///
/// A partition whose boundary token begins exactly at `at` has not fired
/// for a scanner arriving there, so the type before it applies.
fn content_type_before(partitions: &[Partition], at: Position) -> ContentType {
    if at == Position::zero() {
        return ContentType::DEFAULT;
    }
    let upper = partitions.partition_point(|p| p.start <= at);
    if upper == 0 {
        return ContentType::DEFAULT;
    }
    let mut index = upper - 1;
    while partitions[index].start == at && partitions[index].start == partitions[index].token_start
    {
        if index == 0 {
            return ContentType::DEFAULT;
        }
        index -= 1;
    }
    partitions[index].content_type
}
