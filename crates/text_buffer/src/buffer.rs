use std::convert::Infallible;
use std::str::FromStr;

use piece_tree::{PieceTree, Position, RangeError};

use crate::options::{LineEnding, TextBufferOptions};

#[derive(Debug, Clone)]
pub struct TextBuffer {
    tree: PieceTree,
    line_ending: LineEnding,
    options: TextBufferOptions,
}

impl TextBuffer {
    /// Build from multiple chunks with default options.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::with_options(chunks, TextBufferOptions::default())
    }

    /// Build from multiple chunks. The line ending is taken from the first line
    /// break of the content, falling back to the configured default.
    pub fn with_options<I>(chunks: I, options: TextBufferOptions) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let tree = PieceTree::from_chunks(chunks);
        let line_ending = first_line_break(&tree)
            .and_then(|eol| LineEnding::detect(&eol))
            .unwrap_or(options.default_line_ending);
        Self {
            tree,
            line_ending,
            options,
        }
    }

    /// Insert `value` at byte `offset` in the document.
    pub fn insert(&mut self, offset: usize, value: &str) -> Result<(), RangeError> {
        if self.options.normalize_line_endings {
            let value = self.line_ending.normalize(value);
            self.tree.insert(offset, &value)
        } else {
            self.tree.insert(offset, value)
        }
    }

    /// Delete `len` bytes starting at byte `offset`.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<(), RangeError> {
        self.tree.delete(offset, len)
    }

    /// Convenience: insert at (line, column), both 0-based.
    pub fn insert_at(&mut self, line: usize, column: usize, value: &str) -> Result<(), RangeError> {
        let off = self.get_offset_at(line, column);
        self.insert(off, value)
    }

    /// Convenience: delete `len` bytes starting at (line, column).
    pub fn delete_at(&mut self, line: usize, column: usize, len: usize) -> Result<(), RangeError> {
        let off = self.get_offset_at(line, column);
        self.delete(off, len)
    }

    /// Get complete text content.
    pub fn get_text(&self) -> String {
        self.tree.get_text()
    }

    pub fn get_text_in_range(&self, offset: usize, len: usize) -> String {
        self.tree.get_text_in_range(offset, len)
    }

    /// Get the number of lines (empty doc => 1 line).
    pub fn get_line_count(&self) -> usize {
        self.tree.line_count()
    }

    /// Get the document byte length.
    pub fn get_length(&self) -> usize {
        self.tree.len()
    }

    /// Get content of a line (0-based). Out-of-range => empty.
    pub fn get_line_content(&self, line_number: usize) -> String {
        self.tree.get_line_content(line_number).unwrap_or_default()
    }

    /// Get all lines (without EOL).
    pub fn get_lines_content(&self) -> Vec<String> {
        self.tree.get_lines_content()
    }

    /// Get the byte length (without EOL) of a line.
    pub fn get_line_length(&self, line_number: usize) -> usize {
        self.tree.get_line_length(line_number)
    }

    /// Last column a caret can take on a line.
    pub fn get_line_max_column(&self, line_number: usize) -> usize {
        self.get_line_length(line_number)
    }

    /// (line, column) to byte offset, clamped to the document.
    pub fn get_offset_at(&self, line_number: usize, column: usize) -> usize {
        self.tree.get_offset_from_line_column(line_number, column)
    }

    /// Byte offset to (line, column), clamped to the document.
    pub fn get_position_at(&self, offset: usize) -> Position {
        self.tree.get_line_column_from_offset(offset)
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn options(&self) -> &TextBufferOptions {
        &self.options
    }
}

/// Text of the first line break, if the document has one.
fn first_line_break(tree: &PieceTree) -> Option<String> {
    if tree.line_count() < 2 {
        return None;
    }
    let eol_start = tree.get_line_length(0);
    let next_line = tree.get_offset_at_line(1);
    Some(tree.get_text_in_range(eol_start, next_line - eol_start))
}

impl FromStr for TextBuffer {
    type Err = Infallible;

    /// Build from a single string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_chunks([s]))
    }
}
