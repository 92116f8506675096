//! Document collaborator surface
//!
//! The engine does not own a text buffer. It consumes a minimal
//! line-oriented view of one through [`DocumentAccess`], and learns about
//! mutations through [`DocumentChange`] descriptors delivered by the host
//! in a two-phase protocol (`about to change` / `changed`).
//!
//! [`LineDocument`] is a small concrete implementation — a growable line
//! store — sufficient for tests, benches and simple hosts. Storage
//! engines (gap buffers, piece tables, undo) are out of scope.

use crate::error::BadPosition;
use crate::position::{column_len, column_to_byte, Position, Region};

/// Read access to a line-oriented document
///
/// A document always contains at least one (possibly empty) line. Line
/// text is returned without terminators; columns count character units.
pub trait DocumentAccess {
    /// Number of lines (at least 1)
    fn line_count(&self) -> usize;

    /// Text of the line at `index`, without a terminator
    fn line(&self, index: usize) -> &str;

    /// Length of the line at `index` in character units
    fn line_length(&self, index: usize) -> usize {
        column_len(self.line(index))
    }

    /// The position just past the last character of the document
    fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last, self.line_length(last))
    }

    /// The region covering the whole document
    fn region(&self) -> Region {
        Region::new(Position::zero(), self.end_position())
    }
}

/// Describes one document mutation
///
/// An edit erases a region (in pre-edit coordinates) and/or inserts one
/// (in post-edit coordinates); both regions share the same begin
/// position. Either may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChange {
    erased: Region,
    inserted: Region,
}

impl DocumentChange {
    /// Describe a pure insertion covering `inserted` (post-edit coordinates)
    #[inline]
    pub fn insertion(inserted: Region) -> Self {
        Self {
            erased: Region::empty(inserted.begin()),
            inserted,
        }
    }

    /// Describe a pure deletion of `erased` (pre-edit coordinates)
    #[inline]
    pub fn deletion(erased: Region) -> Self {
        Self {
            erased,
            inserted: Region::empty(erased.begin()),
        }
    }

    /// Describe a replacement of `erased` by `inserted`
    ///
    /// Both regions must begin at the same position.
    #[inline]
    pub fn replacement(erased: Region, inserted: Region) -> Self {
        debug_assert_eq!(erased.begin(), inserted.begin());
        Self { erased, inserted }
    }

    /// The erased region, in pre-edit coordinates
    #[inline]
    pub fn erased(&self) -> Region {
        self.erased
    }

    /// The inserted region, in post-edit coordinates
    #[inline]
    pub fn inserted(&self) -> Region {
        self.inserted
    }

    /// Check whether the edit erases text
    #[inline]
    pub fn is_deletion(&self) -> bool {
        !self.erased.is_empty()
    }

    /// The position at which the edit takes place
    #[inline]
    pub fn begin(&self) -> Position {
        if self.erased.is_empty() {
            self.inserted.begin()
        } else {
            self.erased.begin()
        }
    }

    /// Check whether the edit is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.erased.is_empty() && self.inserted.is_empty()
    }
}

/// Translate a pre-edit position into post-edit coordinates
///
/// Uses forward gravity: a position exactly at the change point moves
/// past inserted text, and positions inside an erased region collapse to
/// its begin.
pub fn update_position(at: Position, change: &DocumentChange) -> Position {
    let mut p = at;

    let erased = change.erased();
    if !erased.is_empty() {
        if p <= erased.begin() {
            // unchanged
        } else if p >= erased.end() {
            p = if p.line == erased.end().line {
                Position::new(
                    erased.begin().line,
                    erased.begin().column + (p.column - erased.end().column),
                )
            } else {
                Position::new(p.line - (erased.end().line - erased.begin().line), p.column)
            };
        } else {
            p = erased.begin();
        }
    }

    let inserted = change.inserted();
    if !inserted.is_empty() && p >= inserted.begin() {
        p = if p.line == inserted.begin().line {
            Position::new(
                inserted.end().line,
                inserted.end().column + (p.column - inserted.begin().column),
            )
        } else {
            Position::new(p.line + (inserted.end().line - inserted.begin().line), p.column)
        };
    }

    p
}

/// A growable line store implementing [`DocumentAccess`]
///
/// Mutations return the [`DocumentChange`] descriptor the host forwards
/// to the partitioner's `document_changed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDocument {
    lines: Vec<String>,
}

impl LineDocument {
    /// Create an empty document (one empty line)
    #[inline]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Create a document from initial text; `\n` separates lines
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_owned).collect(),
        }
    }

    /// Validate that `at` addresses a position inside the document
    fn check_position(&self, at: Position) -> Result<(), BadPosition> {
        if at.line >= self.lines.len() || at.column > column_len(&self.lines[at.line]) {
            return Err(BadPosition::new(at));
        }
        Ok(())
    }

    /// Insert `text` at `at` and describe the edit
    ///
    /// `\n` characters in `text` introduce new lines.
    pub fn insert(&mut self, at: Position, text: &str) -> Result<DocumentChange, BadPosition> {
        self.check_position(at)?;
        let byte = column_to_byte(&self.lines[at.line], at.column);
        let end = if let Some((head, rest)) = text.split_once('\n') {
            let tail = self.lines[at.line].split_off(byte);
            self.lines[at.line].push_str(head);
            let mut new_lines: Vec<String> = rest.split('\n').map(str::to_owned).collect();
            let end_line = at.line + new_lines.len();
            let mut end_column = 0;
            if let Some(last) = new_lines.last_mut() {
                end_column = column_len(last);
                last.push_str(&tail);
            }
            let insert_at = at.line + 1;
            self.lines.splice(insert_at..insert_at, new_lines);
            Position::new(end_line, end_column)
        } else {
            self.lines[at.line].insert_str(byte, text);
            Position::new(at.line, at.column + column_len(text))
        };
        Ok(DocumentChange::insertion(Region::new(at, end)))
    }

    /// Erase `region` and describe the edit
    pub fn erase(&mut self, region: Region) -> Result<DocumentChange, BadPosition> {
        self.check_position(region.begin())?;
        self.check_position(region.end())?;
        let (begin, end) = (region.begin(), region.end());
        if begin.line == end.line {
            let b = column_to_byte(&self.lines[begin.line], begin.column);
            let e = column_to_byte(&self.lines[begin.line], end.column);
            self.lines[begin.line].replace_range(b..e, "");
        } else {
            let tail_byte = column_to_byte(&self.lines[end.line], end.column);
            let tail = self.lines[end.line].split_off(tail_byte);
            let head_byte = column_to_byte(&self.lines[begin.line], begin.column);
            self.lines[begin.line].truncate(head_byte);
            self.lines[begin.line].push_str(&tail);
            self.lines.drain(begin.line + 1..=end.line);
        }
        Ok(DocumentChange::deletion(region))
    }

    /// Replace `region` by `text` and describe the edit
    pub fn replace(
        &mut self,
        region: Region,
        text: &str,
    ) -> Result<DocumentChange, BadPosition> {
        let erased = self.erase(region)?;
        let inserted = self.insert(region.begin(), text)?;
        Ok(DocumentChange::replacement(
            erased.erased(),
            inserted.inserted(),
        ))
    }

    /// The document content joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl Default for LineDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAccess for LineDocument {
    #[inline]
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    fn line(&self, index: usize) -> &str {
        &self.lines[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_insert_single_line() {
        let mut doc = LineDocument::from_text("hello world");
        let change = doc.insert(pos(0, 5), ",").unwrap();
        assert_eq!(doc.text(), "hello, world");
        assert_eq!(change.inserted(), Region::new(pos(0, 5), pos(0, 6)));
        assert!(!change.is_deletion());
    }

    #[test]
    fn test_insert_multi_line() {
        let mut doc = LineDocument::from_text("ab");
        let change = doc.insert(pos(0, 1), "x\ny\nz").unwrap();
        assert_eq!(doc.text(), "ax\ny\nzb");
        assert_eq!(change.inserted(), Region::new(pos(0, 1), pos(2, 1)));
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.end_position(), pos(2, 2));
    }

    #[test]
    fn test_erase_within_line() {
        let mut doc = LineDocument::from_text("say \"hi\" now");
        let change = doc.erase(Region::new(pos(0, 4), pos(0, 8))).unwrap();
        assert_eq!(doc.text(), "say  now");
        assert!(change.is_deletion());
    }

    #[test]
    fn test_erase_across_lines() {
        let mut doc = LineDocument::from_text("one\ntwo\nthree");
        doc.erase(Region::new(pos(0, 2), pos(2, 3))).unwrap();
        assert_eq!(doc.text(), "onee");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn test_replace() {
        let mut doc = LineDocument::from_text("abc def");
        let change = doc.replace(Region::new(pos(0, 4), pos(0, 7)), "xy").unwrap();
        assert_eq!(doc.text(), "abc xy");
        assert_eq!(change.erased(), Region::new(pos(0, 4), pos(0, 7)));
        assert_eq!(change.inserted(), Region::new(pos(0, 4), pos(0, 6)));
    }

    #[test]
    fn test_bad_positions() {
        let mut doc = LineDocument::from_text("ab");
        assert!(doc.insert(pos(1, 0), "x").is_err());
        assert!(doc.insert(pos(0, 3), "x").is_err());
        assert!(doc.erase(Region::new(pos(0, 0), pos(0, 3))).is_err());
    }

    #[test]
    fn test_update_position_insertion() {
        // insert 1 character at (0, 5)
        let change = DocumentChange::insertion(Region::new(pos(0, 5), pos(0, 6)));
        assert_eq!(update_position(pos(0, 4), &change), pos(0, 4));
        // forward gravity: the change point itself moves past the insertion
        assert_eq!(update_position(pos(0, 5), &change), pos(0, 6));
        assert_eq!(update_position(pos(0, 9), &change), pos(0, 10));
        assert_eq!(update_position(pos(1, 3), &change), pos(1, 3));
    }

    #[test]
    fn test_update_position_multi_line_insertion() {
        // insert "x\ny" at (1, 2): end lands at (2, 1)
        let change = DocumentChange::insertion(Region::new(pos(1, 2), pos(2, 1)));
        assert_eq!(update_position(pos(1, 1), &change), pos(1, 1));
        assert_eq!(update_position(pos(1, 4), &change), pos(2, 3));
        assert_eq!(update_position(pos(3, 7), &change), pos(4, 7));
    }

    #[test]
    fn test_update_position_deletion() {
        let change = DocumentChange::deletion(Region::new(pos(0, 4), pos(0, 8)));
        assert_eq!(update_position(pos(0, 2), &change), pos(0, 2));
        assert_eq!(update_position(pos(0, 6), &change), pos(0, 4));
        assert_eq!(update_position(pos(0, 8), &change), pos(0, 4));
        assert_eq!(update_position(pos(0, 11), &change), pos(0, 7));

        let change = DocumentChange::deletion(Region::new(pos(0, 2), pos(2, 1)));
        assert_eq!(update_position(pos(2, 5), &change), pos(0, 6));
        assert_eq!(update_position(pos(3, 5), &change), pos(1, 5));
    }

    #[test]
    fn test_document_matches_change_descriptor() {
        let mut doc = LineDocument::from_text("abcdef");
        let change = doc.insert(pos(0, 3), "12\n34").unwrap();
        // a position after the edit translates onto the same character
        let translated = update_position(pos(0, 4), &change);
        assert_eq!(translated, pos(1, 3));
        let line = doc.line(translated.line);
        assert_eq!(&line[translated.column..translated.column + 1], "e");
    }
}
