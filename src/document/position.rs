//! Editor positions and the line index used to map them onto the grammar tree.
//!
//! Editors address text by zero-based line and UTF-16 character, the grammar
//! by row and byte column. `LineIndex` converts between the two and clamps
//! anything out of range, so a stale or degenerate cursor still lands on the
//! closest real location instead of failing.

use serde::{Deserialize, Serialize};
use tree_sitter::Point;

/// A zero-based cursor position as sent by the editing host.
///
/// `character` counts UTF-16 code units, matching the Language Server
/// Protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Byte offsets of every line start in one version of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Number of lines; a trailing newline opens one more (empty) line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, row: usize) -> Option<usize> {
        self.line_starts.get(row).copied()
    }

    /// Byte range of `row`, excluding its line terminator.
    pub fn line_range(&self, text: &str, row: usize) -> Option<(usize, usize)> {
        let start = self.line_start(row)?;
        let mut end = self
            .line_starts
            .get(row + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        if end > start && text.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some((start, end))
    }

    /// Text of `row` without its terminator; empty for rows past the end.
    pub fn line<'a>(&self, text: &'a str, row: usize) -> &'a str {
        match self.line_range(text, row) {
            Some((start, end)) => &text[start..end],
            None => "",
        }
    }

    /// Converts an editor position to a grammar point, clamping the line to
    /// the document and the character to the line.
    pub fn point_for(&self, text: &str, position: Position) -> Point {
        let row = position.line.min(self.line_count() - 1);
        let line = self.line(text, row);

        let mut units = 0;
        let mut column = line.len();
        for (offset, ch) in line.char_indices() {
            if units >= position.character {
                column = offset;
                break;
            }
            units += ch.len_utf16();
        }
        Point::new(row, column)
    }

    /// Converts a grammar point back to an editor position.
    pub fn position_for(&self, text: &str, point: Point) -> Position {
        let line = self.line(text, point.row);
        let column = point.column.min(line.len());
        let character = line
            .char_indices()
            .take_while(|(offset, _)| *offset < column)
            .map(|(_, ch)| ch.len_utf16())
            .sum();
        Position::new(point.row, character)
    }

    /// Byte offset of `point`, or `None` if it lies outside the document.
    pub fn offset_of(&self, text: &str, point: Point) -> Option<usize> {
        let (start, end) = self.line_range(text, point.row)?;
        let offset = start + point.column;
        (offset <= end && text.is_char_boundary(offset)).then_some(offset)
    }
}

/// The point reached after writing `text` starting at `start`.
pub fn advance(start: Point, text: &str) -> Point {
    match text.rfind('\n') {
        Some(last) => Point::new(
            start.row + text.matches('\n').count(),
            text.len() - last - 1,
        ),
        None => Point::new(start.row, start.column + text.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_access() {
        let text = "a: 1\r\nb: 2\n\nc: 3";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line(text, 0), "a: 1");
        assert_eq!(index.line(text, 1), "b: 2");
        assert_eq!(index.line(text, 2), "");
        assert_eq!(index.line(text, 3), "c: 3");
        assert_eq!(index.line(text, 9), "");
    }

    #[test]
    fn test_trailing_newline_opens_empty_line() {
        let text = "a: 1\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line(text, 1), "");
    }

    #[test]
    fn test_point_for_clamps_out_of_range() {
        let text = "key: value\nnext: 1";
        let index = LineIndex::new(text);

        assert_eq!(index.point_for(text, Position::new(0, 3)), Point::new(0, 3));
        assert_eq!(index.point_for(text, Position::new(0, 99)), Point::new(0, 10));
        assert_eq!(index.point_for(text, Position::new(42, 2)), Point::new(1, 2));
    }

    #[test]
    fn test_utf16_characters_map_to_byte_columns() {
        // 'é' is 2 bytes / 1 unit, '😀' is 4 bytes / 2 units.
        let text = "é😀x: 1";
        let index = LineIndex::new(text);

        assert_eq!(index.point_for(text, Position::new(0, 1)), Point::new(0, 2));
        assert_eq!(index.point_for(text, Position::new(0, 3)), Point::new(0, 6));
        assert_eq!(index.position_for(text, Point::new(0, 6)), Position::new(0, 3));
    }

    #[test]
    fn test_offset_of() {
        let text = "ab\ncd";
        let index = LineIndex::new(text);

        assert_eq!(index.offset_of(text, Point::new(1, 1)), Some(4));
        assert_eq!(index.offset_of(text, Point::new(1, 2)), Some(5));
        assert_eq!(index.offset_of(text, Point::new(1, 3)), None);
        assert_eq!(index.offset_of(text, Point::new(5, 0)), None);
    }

    #[test]
    fn test_advance() {
        assert_eq!(advance(Point::new(2, 4), "abc"), Point::new(2, 7));
        assert_eq!(advance(Point::new(2, 4), "a\nbc"), Point::new(3, 2));
        assert_eq!(advance(Point::new(2, 4), ""), Point::new(2, 4));
    }
}
