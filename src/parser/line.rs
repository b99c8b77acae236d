//! Display-column view of a single source line.
//!
//! Grid table geometry is positional: a `|` on a continuation line matters
//! only if it sits at the same *display column* as a `+` on the opening
//! separator. [`DisplayLine`] indexes a line both ways at once, by byte
//! offset for slicing and by display column for geometry, so wide East
//! Asian characters (occupying two columns) line up the same way they do
//! in a terminal or editor.

use unicode_width::UnicodeWidthChar;

/// Width of one character in display columns.
///
/// Tabs count as a single column: by the time table lines reach the
/// geometry pass they are treated as ordinary whitespace, not expanded.
fn char_width(ch: char) -> usize {
    if ch == '\t' { 1 } else { ch.width().unwrap_or(0) }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    byte: usize,
    col: usize,
    width: usize,
    ch: char,
}

/// A line of text with a display-column index over its characters.
#[derive(Debug)]
pub struct DisplayLine<'a> {
    text: &'a str,
    cells: Vec<Cell>,
    width: usize,
}

impl<'a> DisplayLine<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut cells = Vec::with_capacity(text.len());
        let mut col = 0;
        for (byte, ch) in text.char_indices() {
            let width = char_width(ch);
            cells.push(Cell {
                byte,
                col,
                width,
                ch,
            });
            col += width;
        }
        DisplayLine {
            text,
            cells,
            width: col,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Total width of the line in display columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of leading space characters.
    pub fn indent(&self) -> usize {
        self.cells.iter().take_while(|c| c.ch == ' ').count()
    }

    /// The character that *starts* at display column `col`, if any. A column
    /// that falls inside a wide character (its second half) yields `None`,
    /// as does a column past the end of the line.
    pub fn char_at(&self, col: usize) -> Option<char> {
        let i = self.cells.partition_point(|c| c.col < col);
        match self.cells.get(i) {
            Some(c) if c.col == col => Some(c.ch),
            _ => None,
        }
    }

    /// Byte offset just past the character occupying column `col`; offset of
    /// the first character starting after `col` when nothing occupies it.
    pub fn byte_after(&self, col: usize) -> usize {
        let i = self.cells.partition_point(|c| c.col <= col);
        match self.cells.get(i) {
            Some(c) => c.byte,
            None => self.text.len(),
        }
    }

    /// Byte offset of the first character starting at or after column `col`.
    pub fn byte_at_or_after(&self, col: usize) -> usize {
        let i = self.cells.partition_point(|c| c.col < col);
        match self.cells.get(i) {
            Some(c) => c.byte,
            None => self.text.len(),
        }
    }

    /// Text strictly between display columns `a` and `b`: everything after
    /// the character at `a` and before the character at `b`.
    pub fn slice_between(&self, a: usize, b: usize) -> &'a str {
        let start = self.byte_after(a);
        let end = self.byte_at_or_after(b);
        if start <= end {
            &self.text[start..end]
        } else {
            ""
        }
    }

    /// `(display column, character)` pairs in line order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.cells.iter().map(|c| (c.col, c.ch))
    }
}
