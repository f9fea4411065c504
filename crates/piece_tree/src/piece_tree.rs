//! A piece table over a red-black tree.
//!
//! The document is the in-order concatenation of pieces, each naming a run of
//! bytes inside one of the tree's buffers. Buffer 0 is the append-only add
//! buffer; buffers 1.. hold the content the tree was built from. Every node
//! caches the length and line-feed count of its left subtree, so offset and
//! line lookups are a single descent.
//!
//! Offsets, lengths and columns count UTF-8 bytes. Lines are 0-based and end
//! at `\r\n`, `\n` or `\r`.

mod error;
mod node;
mod piece;
mod rb_tree;
mod string_buffer;

use std::fmt;

pub use crate::error::{InvariantError, RangeError, Result};
pub use crate::piece::Position;

use crate::node::{NodeArena, NodeColor, NodeId, SENTINEL};
use crate::piece::Piece;
use crate::string_buffer::StringBuffer;

const ADD_BUFFER: usize = 0;

#[derive(Debug, Clone, Copy)]
struct NodePosition {
    node: NodeId,
    /// Document offset of the node's first byte.
    start_offset: usize,
    /// Offset of the target inside the node's piece.
    remainder: usize,
}

#[derive(Debug, Clone)]
pub struct PieceTree {
    nodes: NodeArena,
    root: NodeId,
    buffers: Vec<StringBuffer>,
    length: usize,
    line_count: usize,
}

impl PieceTree {
    /// A tree holding `text` in a single original buffer.
    pub fn new(text: &str) -> Self {
        Self::from_chunks([text])
    }

    /// A tree with one original buffer per non-empty chunk.
    ///
    /// A chunk's trailing `\r` is moved to the front of the next chunk so a
    /// CRLF straddling two chunks stays one line break.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut tree = Self::empty();
        let mut last = SENTINEL;
        let mut carry_cr = false;
        let mut count = 0;

        for chunk in chunks {
            let mut chunk: String = chunk.into();
            if carry_cr {
                chunk.insert(0, '\r');
            }
            carry_cr = chunk.ends_with('\r');
            if carry_cr {
                chunk.pop();
            }
            if chunk.is_empty() {
                continue;
            }
            last = tree.push_original(chunk, last);
            count += 1;
        }
        if carry_cr {
            tree.push_original("\r".to_string(), last);
            count += 1;
        }

        tracing::debug!(
            chunks = count,
            length = tree.length,
            lines = tree.line_count,
            "built piece tree"
        );
        tree
    }

    fn empty() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: SENTINEL,
            buffers: vec![StringBuffer::new(String::new())],
            length: 0,
            line_count: 1,
        }
    }

    fn push_original(&mut self, chunk: String, after: NodeId) -> NodeId {
        let buffer = StringBuffer::new(chunk);
        let start = buffer.cursor_at(0);
        let end = buffer.cursor_at(buffer.len());
        let piece = Piece::new(
            self.buffers.len(),
            start,
            end,
            buffer.len(),
            buffer.line_feed_cnt(start, end),
        );
        self.buffers.push(buffer);
        self.rb_insert_right(after, piece)
    }

    /// Document length in bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of lines; an empty document has one.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Number of pieces making up the document.
    pub fn piece_count(&self) -> usize {
        self.nodes.live_count()
    }

    /// Inserts `text` before the byte at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`RangeError`] if `offset` is past the end of the document or
    /// not on a character boundary.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        if offset > self.length {
            return Err(RangeError::OffsetOutOfBounds {
                offset,
                len: self.length,
            });
        }
        if !self.is_char_boundary(offset) {
            return Err(RangeError::NotCharBoundary { offset });
        }
        tracing::trace!(offset, len = text.len(), "insert");

        let piece = self.create_piece(text);
        let node = if self.root == SENTINEL {
            self.rb_insert_right(SENTINEL, piece)
        } else if offset == self.length {
            let last = self.rightmost(self.root);
            self.rb_insert_right(last, piece)
        } else {
            // An offset on a piece's end boundary resolves to the start of the
            // following piece.
            let pos = self.node_at(offset);
            if pos.remainder == 0 {
                self.rb_insert_left(pos.node, piece)
            } else {
                self.split_node(pos.node, pos.remainder, piece)
            }
        };

        self.join_crlf_around(node);
        Ok(())
    }

    /// Removes `cnt` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`RangeError`] if the range extends past the end of the
    /// document or either end is not on a character boundary.
    pub fn delete(&mut self, offset: usize, cnt: usize) -> Result<()> {
        if cnt == 0 {
            return Ok(());
        }
        let end = match offset.checked_add(cnt) {
            Some(end) if end <= self.length => end,
            _ => {
                return Err(RangeError::RangeOutOfBounds {
                    start: offset,
                    end: offset.saturating_add(cnt),
                    len: self.length,
                });
            }
        };
        for boundary in [offset, end] {
            if !self.is_char_boundary(boundary) {
                return Err(RangeError::NotCharBoundary { offset: boundary });
            }
        }
        tracing::trace!(offset, len = cnt, "delete");

        let start_pos = self.node_at(offset);
        let end_pos = self.node_at(end);

        if start_pos.node == end_pos.node {
            self.shrink_node(start_pos.node, start_pos.remainder, end_pos.remainder);
        } else {
            let start_node = start_pos.node;
            let end_node = end_pos.node;

            let head = self.nodes[start_node].piece;
            let head = self.piece_prefix(&head, start_pos.remainder);
            self.set_piece(start_node, head);

            let tail = self.nodes[end_node].piece;
            let tail = self.piece_suffix(&tail, end_pos.remainder);
            self.set_piece(end_node, tail);

            let mut covered = Vec::new();
            let mut node = self.next(start_node);
            while node != end_node && node != SENTINEL {
                covered.push(node);
                node = self.next(node);
            }
            for node in covered {
                self.rb_delete(node);
            }

            if self.nodes[start_node].piece.is_empty() {
                self.rb_delete(start_node);
            }
            if self.nodes[end_node].piece.is_empty() {
                self.rb_delete(end_node);
            }
        }

        self.join_crlf_at(offset);
        Ok(())
    }

    /// Text of `[offset, offset + length)`, clamped to the document. A range
    /// cutting through a character is decoded lossily.
    pub fn get_text_in_range(&self, offset: usize, length: usize) -> String {
        let offset = offset.min(self.length);
        let length = length.min(self.length - offset);
        if length == 0 {
            return String::new();
        }

        let mut bytes = Vec::with_capacity(length);
        let pos = self.node_at(offset);
        let mut node = pos.node;
        let mut skip = pos.remainder;

        while bytes.len() < length && node != SENTINEL {
            let piece = self.piece_bytes(&self.nodes[node].piece);
            let take = (piece.len() - skip).min(length - bytes.len());
            bytes.extend_from_slice(&piece[skip..skip + take]);
            skip = 0;
            node = self.next(node);
        }

        String::from_utf8(bytes)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    /// The whole document.
    pub fn get_text(&self) -> String {
        let mut text = String::with_capacity(self.length);
        for chunk in self.chunks() {
            text.push_str(chunk);
        }
        text
    }

    /// Pieces' text in document order.
    pub fn chunks(&self) -> Chunks<'_> {
        let node = if self.root == SENTINEL {
            SENTINEL
        } else {
            self.leftmost(self.root)
        };
        Chunks { tree: self, node }
    }

    /// Content of `line_number` without its line ending, or `None` past the
    /// last line.
    pub fn get_line_content(&self, line_number: usize) -> Option<String> {
        if line_number >= self.line_count {
            return None;
        }
        let (start, end) = self.line_bounds(line_number);
        let mut line = self.get_text_in_range(start, end - start);

        if line.ends_with("\r\n") {
            line.truncate(line.len() - 2);
        } else if line.ends_with('\n') || line.ends_with('\r') {
            line.truncate(line.len() - 1);
        }
        Some(line)
    }

    /// Every line, without line endings.
    pub fn get_lines_content(&self) -> Vec<String> {
        (0..self.line_count)
            .filter_map(|line| self.get_line_content(line))
            .collect()
    }

    /// Byte length of `line_number` without its line ending; 0 past the last line.
    pub fn get_line_length(&self, line_number: usize) -> usize {
        self.get_line_content(line_number)
            .map_or(0, |line| line.len())
    }

    /// Offset of the first byte of `line_number`; the document length past the
    /// last line.
    pub fn get_offset_at_line(&self, line_number: usize) -> usize {
        if line_number == 0 {
            return 0;
        }
        let mut target_lf = line_number - 1;
        let mut offset = 0;
        let mut x = self.root;

        while x != SENTINEL {
            let node = &self.nodes[x];
            if node.lf_left > target_lf {
                x = node.left;
            } else if node.lf_left + node.piece.line_feed_cnt > target_lf {
                offset += node.size_left;
                return offset + self.line_break_end(&node.piece, target_lf - node.lf_left);
            } else {
                target_lf -= node.lf_left + node.piece.line_feed_cnt;
                offset += node.size_left + node.piece.length;
                x = node.right;
            }
        }
        self.length
    }

    /// The (line, column) of `offset`, clamped to the document.
    pub fn get_line_column_from_offset(&self, offset: usize) -> Position {
        let offset = offset.min(self.length);
        let mut low = 0;
        let mut high = self.line_count - 1;

        while low <= high {
            let mid = low + (high - low) / 2;
            let (line_start, next_start) = self.line_bounds(mid);

            if offset >= line_start && offset < next_start {
                return Position::new(mid, offset - line_start);
            }
            if offset < line_start {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }

        let last_line = self.line_count - 1;
        Position::new(last_line, offset - self.get_offset_at_line(last_line))
    }

    /// The offset of (line, column). The line is clamped to the document and
    /// the column to the line, line ending included.
    pub fn get_offset_from_line_column(&self, line: usize, column: usize) -> usize {
        if self.length == 0 {
            return 0;
        }
        let line = line.min(self.line_count - 1);
        let (line_start, next_start) = self.line_bounds(line);
        line_start + column.min(next_start - line_start)
    }

    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found.
    pub fn validate(&self) -> std::result::Result<(), InvariantError> {
        if self.nodes.color(self.root) == NodeColor::Red {
            return Err(InvariantError::RedRoot);
        }
        let (size, lf, _) = self.validate_subtree(self.root, SENTINEL)?;
        if size != self.length {
            return Err(InvariantError::StaleLength {
                cached: self.length,
                actual: size,
            });
        }
        if lf + 1 != self.line_count {
            return Err(InvariantError::StaleLineCount {
                cached: self.line_count,
                actual: lf + 1,
            });
        }

        let mut prev = SENTINEL;
        let mut node = if self.root == SENTINEL {
            SENTINEL
        } else {
            self.leftmost(self.root)
        };
        while node != SENTINEL {
            let piece = &self.nodes[node].piece;
            if piece.is_empty() {
                return Err(InvariantError::EmptyPiece { node });
            }
            let actual = StringBuffer::create_line_starts(self.piece_text(piece)).len() - 1;
            if actual != piece.line_feed_cnt {
                return Err(InvariantError::WrongLineFeedCount {
                    node,
                    cached: piece.line_feed_cnt,
                    actual,
                });
            }
            if prev != SENTINEL && self.ends_with_cr(prev) && self.starts_with_lf(node) {
                return Err(InvariantError::SplitCrlf { node: prev });
            }
            prev = node;
            node = self.next(node);
        }
        Ok(())
    }

    /// Returns (size, line feeds, black height) of the subtree at `x`.
    fn validate_subtree(
        &self,
        x: NodeId,
        parent: NodeId,
    ) -> std::result::Result<(usize, usize, usize), InvariantError> {
        if x == SENTINEL {
            return Ok((0, 0, 1));
        }
        let node = &self.nodes[x];
        if node.parent != parent {
            return Err(InvariantError::BrokenParentLink { node: x, parent });
        }
        if node.color == NodeColor::Red
            && (self.nodes.color(node.left) == NodeColor::Red
                || self.nodes.color(node.right) == NodeColor::Red)
        {
            return Err(InvariantError::RedRedViolation { node: x });
        }

        let (left_size, left_lf, left_height) = self.validate_subtree(node.left, x)?;
        let (right_size, right_lf, right_height) = self.validate_subtree(node.right, x)?;
        if left_size != node.size_left {
            return Err(InvariantError::StaleSizeLeft {
                node: x,
                cached: node.size_left,
                actual: left_size,
            });
        }
        if left_lf != node.lf_left {
            return Err(InvariantError::StaleLineFeedLeft {
                node: x,
                cached: node.lf_left,
                actual: left_lf,
            });
        }
        if left_height != right_height {
            return Err(InvariantError::BlackHeightMismatch {
                node: x,
                left: left_height,
                right: right_height,
            });
        }

        let height = left_height + usize::from(node.color == NodeColor::Black);
        Ok((
            left_size + node.piece.length + right_size,
            left_lf + node.piece.line_feed_cnt + right_lf,
            height,
        ))
    }

    // ---------- Lookups ----------

    fn node_at(&self, mut offset: usize) -> NodePosition {
        if self.root == SENTINEL {
            return NodePosition {
                node: SENTINEL,
                start_offset: 0,
                remainder: 0,
            };
        }
        if offset >= self.length {
            let last = self.rightmost(self.root);
            let len = self.nodes[last].piece.length;
            return NodePosition {
                node: last,
                start_offset: self.length - len,
                remainder: len,
            };
        }

        let mut x = self.root;
        let mut node_start = 0;
        while x != SENTINEL {
            let node = &self.nodes[x];
            if node.size_left > offset {
                x = node.left;
            } else if node.size_left + node.piece.length > offset {
                return NodePosition {
                    node: x,
                    start_offset: node_start + node.size_left,
                    remainder: offset - node.size_left,
                };
            } else {
                offset -= node.size_left + node.piece.length;
                node_start += node.size_left + node.piece.length;
                x = node.right;
            }
        }
        NodePosition {
            node: SENTINEL,
            start_offset: 0,
            remainder: 0,
        }
    }

    /// Start offset of `line` and of the line after it (the document length
    /// for the last line).
    fn line_bounds(&self, line: usize) -> (usize, usize) {
        let start = self.get_offset_at_line(line);
        let end = if line + 1 >= self.line_count {
            self.length
        } else {
            self.get_offset_at_line(line + 1)
        };
        (start, end)
    }

    /// Bytes from the start of `piece` through its `index`-th line break.
    fn line_break_end(&self, piece: &Piece, index: usize) -> usize {
        let buffer = &self.buffers[piece.buffer_idx];
        let piece_start = buffer.offset_of(piece.start);
        let line = piece.start.line + index + 1;
        if line > piece.end.line {
            // The break is a CR whose LF lies past the piece.
            buffer.offset_of(piece.end) - piece_start
        } else {
            buffer.line_starts()[line] - piece_start
        }
    }

    fn is_char_boundary(&self, offset: usize) -> bool {
        if offset == 0 || offset >= self.length {
            return offset <= self.length;
        }
        let pos = self.node_at(offset);
        let piece = &self.nodes[pos.node].piece;
        let buffer = &self.buffers[piece.buffer_idx];
        buffer
            .byte_at(buffer.offset_of(piece.start) + pos.remainder)
            .is_some_and(|byte| (byte as i8) >= -0x40)
    }

    fn piece_bytes(&self, piece: &Piece) -> &[u8] {
        let buffer = &self.buffers[piece.buffer_idx];
        let start = buffer.offset_of(piece.start);
        &buffer.as_str().as_bytes()[start..start + piece.length]
    }

    fn piece_text(&self, piece: &Piece) -> &str {
        let buffer = &self.buffers[piece.buffer_idx];
        let start = buffer.offset_of(piece.start);
        buffer.as_str().get(start..start + piece.length).unwrap_or_default()
    }

    // ---------- Piece edits ----------

    fn create_piece(&mut self, text: &str) -> Piece {
        let buffer = &mut self.buffers[ADD_BUFFER];
        let start_offset = buffer.append(text);
        let start = buffer.cursor_at(start_offset);
        let end = buffer.cursor_at(start_offset + text.len());
        Piece::new(
            ADD_BUFFER,
            start,
            end,
            text.len(),
            buffer.line_feed_cnt(start, end),
        )
    }

    /// The first `len` bytes of `piece`.
    fn piece_prefix(&self, piece: &Piece, len: usize) -> Piece {
        let buffer = &self.buffers[piece.buffer_idx];
        let end = buffer.cursor_after(piece.start, len);
        Piece::new(
            piece.buffer_idx,
            piece.start,
            end,
            len,
            buffer.line_feed_cnt(piece.start, end),
        )
    }

    /// `piece` without its first `from` bytes.
    fn piece_suffix(&self, piece: &Piece, from: usize) -> Piece {
        let buffer = &self.buffers[piece.buffer_idx];
        let start = buffer.cursor_after(piece.start, from);
        Piece::new(
            piece.buffer_idx,
            start,
            piece.end,
            piece.length - from,
            buffer.line_feed_cnt(start, piece.end),
        )
    }

    /// Splits `node` at `offset_in_node` and puts `piece` between the halves.
    fn split_node(&mut self, node: NodeId, offset_in_node: usize, piece: Piece) -> NodeId {
        let original = self.nodes[node].piece;
        let left = self.piece_prefix(&original, offset_in_node);
        let right = self.piece_suffix(&original, offset_in_node);

        self.set_piece(node, left);
        let inserted = self.rb_insert_right(node, piece);
        self.rb_insert_right(inserted, right);
        inserted
    }

    /// Removes `[start, end)` from inside one node's piece.
    fn shrink_node(&mut self, node: NodeId, start: usize, end: usize) {
        let original = self.nodes[node].piece;
        let left = self.piece_prefix(&original, start);
        self.set_piece(node, left);

        if end < original.length {
            let right = self.piece_suffix(&original, end);
            self.rb_insert_right(node, right);
        }
        if left.is_empty() {
            self.rb_delete(node);
        }
    }

    // ---------- CRLF joining ----------

    fn ends_with_cr(&self, node: NodeId) -> bool {
        self.piece_bytes(&self.nodes[node].piece).last() == Some(&b'\r')
    }

    fn starts_with_lf(&self, node: NodeId) -> bool {
        self.piece_bytes(&self.nodes[node].piece).first() == Some(&b'\n')
    }

    /// Joins a `\r` | `\n` pair formed around a freshly inserted node.
    fn join_crlf_around(&mut self, node: NodeId) {
        let prev = self.prev(node);
        let next = self.next(node);
        let with_prev = prev != SENTINEL && self.ends_with_cr(prev) && self.starts_with_lf(node);
        let with_next = next != SENTINEL && self.ends_with_cr(node) && self.starts_with_lf(next);

        // When both hold the node starts with LF and ends with CR, so it keeps
        // at least one byte after the first join.
        if with_prev {
            self.fix_crlf(prev, node);
        }
        if with_next {
            self.fix_crlf(node, next);
        }
    }

    /// Joins a `\r` | `\n` pair formed at `offset` by a deletion.
    fn join_crlf_at(&mut self, offset: usize) {
        if offset == 0 || offset >= self.length {
            return;
        }
        let pos = self.node_at(offset);
        if pos.start_offset != offset {
            return;
        }
        let prev = self.prev(pos.node);
        if prev != SENTINEL && self.ends_with_cr(prev) && self.starts_with_lf(pos.node) {
            self.fix_crlf(prev, pos.node);
        }
    }

    /// Moves the CR ending `prev` and the LF starting `next` into one new
    /// `"\r\n"` piece placed between them.
    fn fix_crlf(&mut self, prev: NodeId, next: NodeId) {
        tracing::trace!("joining CRLF across pieces");

        let head = self.nodes[prev].piece;
        let head = self.piece_prefix(&head, head.length - 1);
        self.set_piece(prev, head);

        let tail = self.nodes[next].piece;
        let tail = self.piece_suffix(&tail, 1);
        self.set_piece(next, tail);

        let crlf = self.create_piece("\r\n");
        self.rb_insert_right(prev, crlf);

        if self.nodes[prev].piece.is_empty() {
            self.rb_delete(prev);
        }
        if self.nodes[next].piece.is_empty() {
            self.rb_delete(next);
        }
    }
}

impl Default for PieceTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for PieceTree {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for PieceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

/// Iterator over the text of each piece, in document order.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    tree: &'a PieceTree,
    node: NodeId,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.node == SENTINEL {
            return None;
        }
        let tree = self.tree;
        let text = tree.piece_text(&tree.nodes[self.node].piece);
        self.node = tree.next(self.node);
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(text: &str) -> PieceTree {
        let tree = PieceTree::new(text);
        tree.validate().unwrap();
        tree
    }

    #[test]
    fn empty_document_has_one_line() {
        let tree = PieceTree::default();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.line_count(), 1);
        assert_eq!(tree.get_line_content(0).as_deref(), Some(""));
        assert_eq!(tree.get_line_content(1), None);
        assert_eq!(tree.get_text_in_range(0, 10), "");
        assert_eq!(tree.get_line_column_from_offset(5), Position::new(0, 0));
        assert_eq!(tree.get_offset_from_line_column(3, 3), 0);
        tree.validate().unwrap();
    }

    #[test]
    fn insert_into_empty_tree_splits_lines() {
        let mut tree = PieceTree::default();
        tree.insert(0, "hello\nworld").unwrap();
        assert_eq!(tree.get_line_content(0).as_deref(), Some("hello"));
        assert_eq!(tree.get_line_content(1).as_deref(), Some("world"));
        assert_eq!(tree.line_count(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn deleting_crlf_removes_one_line() {
        let mut tree = tree("line1\r\nline2");
        assert_eq!(tree.line_count(), 2);
        tree.delete(5, 2).unwrap();
        assert_eq!(tree.line_count(), 1);
        assert_eq!(tree.get_text(), "line1line2");
        tree.validate().unwrap();
    }

    #[test]
    fn appending_leaves_no_empty_pieces() {
        let mut tree = PieceTree::default();
        tree.insert(0, "abc").unwrap();
        tree.insert(3, "def").unwrap();
        assert_eq!(tree.get_text_in_range(0, 6), "abcdef");
        assert_eq!(tree.chunks().collect::<Vec<_>>(), vec!["abc", "def"]);
        assert_eq!(tree.piece_count(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn insert_at_start_middle_and_end() {
        let mut tree = tree("world");
        tree.insert(0, "hello ").unwrap();
        tree.insert(11, "!").unwrap();
        tree.insert(5, ",").unwrap();
        assert_eq!(tree.get_text(), "hello, world!");
        assert_eq!(tree.len(), 13);
        tree.validate().unwrap();
    }

    #[test]
    fn insert_rejects_out_of_range_offset() {
        let mut tree = tree("abc");
        assert_eq!(
            tree.insert(4, "x"),
            Err(RangeError::OffsetOutOfBounds { offset: 4, len: 3 })
        );
        // Empty text is a no-op even out of range.
        assert_eq!(tree.insert(10, ""), Ok(()));
        assert_eq!(tree.get_text(), "abc");
    }

    #[test]
    fn edits_must_land_on_char_boundaries() {
        let mut tree = tree("héllo");
        assert_eq!(
            tree.insert(2, "x"),
            Err(RangeError::NotCharBoundary { offset: 2 })
        );
        assert_eq!(
            tree.delete(1, 1),
            Err(RangeError::NotCharBoundary { offset: 2 })
        );
        tree.delete(1, 2).unwrap();
        assert_eq!(tree.get_text(), "hllo");
    }

    #[test]
    fn delete_rejects_out_of_range() {
        let mut tree = tree("abc");
        assert_eq!(
            tree.delete(2, 2),
            Err(RangeError::RangeOutOfBounds {
                start: 2,
                end: 4,
                len: 3
            })
        );
        assert_eq!(
            tree.delete(1, usize::MAX),
            Err(RangeError::RangeOutOfBounds {
                start: 1,
                end: usize::MAX,
                len: 3
            })
        );
        assert_eq!(tree.delete(7, 0), Ok(()));
        assert_eq!(tree.get_text(), "abc");
    }

    #[test]
    fn delete_inside_one_piece_keeps_both_sides() {
        let mut tree = tree("Hello beautiful world!");
        tree.delete(6, 10).unwrap();
        assert_eq!(tree.get_text(), "Hello world!");
        assert_eq!(tree.piece_count(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn delete_across_many_pieces() {
        let mut tree = PieceTree::default();
        for (i, word) in ["one ", "two ", "three ", "four ", "five"].iter().enumerate() {
            let at = tree.len();
            tree.insert(at, word).unwrap();
            assert_eq!(tree.piece_count(), i + 1);
        }
        tree.delete(2, 16).unwrap();
        assert_eq!(tree.get_text(), "on five");
        tree.validate().unwrap();

        tree.delete(0, tree.len()).unwrap();
        assert_eq!(tree.get_text(), "");
        assert_eq!(tree.piece_count(), 0);
        assert_eq!(tree.line_count(), 1);
        tree.validate().unwrap();
    }

    #[test]
    fn insert_between_cr_and_lf_makes_two_breaks() {
        let mut tree = tree("a\r\nb");
        tree.insert(2, "X").unwrap();
        assert_eq!(tree.get_text(), "a\rX\nb");
        assert_eq!(tree.line_count(), 3);
        assert_eq!(tree.get_lines_content(), vec!["a", "X", "b"]);
        assert_eq!(tree.get_offset_at_line(1), 2);
        assert_eq!(tree.get_offset_at_line(2), 4);
        tree.validate().unwrap();

        tree.delete(2, 1).unwrap();
        assert_eq!(tree.get_text(), "a\r\nb");
        assert_eq!(tree.line_count(), 2);
        assert_eq!(tree.get_lines_content(), vec!["a", "b"]);
        tree.validate().unwrap();
    }

    #[test]
    fn splitting_a_crlf_counts_it_once() {
        let mut tree = tree("ab\r\ncd");
        // Delete only the CR: the LF that is left still ends the line.
        tree.delete(2, 1).unwrap();
        assert_eq!(tree.get_text(), "ab\ncd");
        assert_eq!(tree.line_count(), 2);
        assert_eq!(tree.get_offset_at_line(1), 3);
        tree.validate().unwrap();

        let mut tree = self::tree("ab\r\ncd");
        tree.delete(3, 1).unwrap();
        assert_eq!(tree.get_text(), "ab\rcd");
        assert_eq!(tree.line_count(), 2);
        assert_eq!(tree.get_line_content(0).as_deref(), Some("ab"));
        tree.validate().unwrap();
    }

    #[test]
    fn typed_cr_then_lf_form_one_break() {
        let mut tree = tree("a");
        tree.insert(1, "\r").unwrap();
        assert_eq!(tree.line_count(), 2);
        tree.insert(2, "\n").unwrap();
        assert_eq!(tree.get_text(), "a\r\n");
        assert_eq!(tree.line_count(), 2);
        assert_eq!(tree.get_lines_content(), vec!["a", ""]);
        tree.validate().unwrap();

        let mut tree = self::tree("a\nb");
        tree.insert(1, "\r").unwrap();
        assert_eq!(tree.get_text(), "a\r\nb");
        assert_eq!(tree.line_count(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn deletion_joining_cr_and_lf_drops_a_line() {
        let mut tree = tree("a\rX\nb");
        assert_eq!(tree.line_count(), 3);
        tree.delete(2, 1).unwrap();
        assert_eq!(tree.get_text(), "a\r\nb");
        assert_eq!(tree.line_count(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn chunks_keep_crlf_that_straddles_them() {
        let tree = PieceTree::from_chunks(["foo\r", "\nbar\r", "", "baz\r"]);
        assert_eq!(tree.get_text(), "foo\r\nbar\rbaz\r");
        assert_eq!(tree.line_count(), 4);
        assert_eq!(tree.get_lines_content(), vec!["foo", "bar", "baz", ""]);
        tree.validate().unwrap();
    }

    #[test]
    fn lines_basic_unix() {
        let tree = tree("Hello\nWorld");
        assert_eq!(tree.get_lines_content(), vec!["Hello", "World"]);
        assert_eq!(tree.get_line_content(0).as_deref(), Some("Hello"));
        assert_eq!(tree.get_line_content(1).as_deref(), Some("World"));
        assert_eq!(tree.get_line_content(2), None);
    }

    #[test]
    fn lines_crlf_single_buffer() {
        let tree = tree("abc\r\ndef\r\nxyz");
        assert_eq!(tree.get_lines_content(), vec!["abc", "def", "xyz"]);
        assert_eq!(tree.get_line_length(1), 3);
        assert_eq!(tree.get_line_length(3), 0);
    }

    #[test]
    fn lines_multiple_chunks() {
        let tree = PieceTree::from_chunks(["foo\n", "bar\nbaz"]);
        assert_eq!(tree.get_lines_content(), vec!["foo", "bar", "baz"]);
        assert_eq!(tree.get_line_content(2).as_deref(), Some("baz"));
    }

    #[test]
    fn lines_trailing_newline() {
        let tree = tree("a\nb\n");
        assert_eq!(tree.get_lines_content(), vec!["a", "b", ""]);
        assert_eq!(tree.line_count(), 3);
    }

    #[test]
    fn text_in_range_is_clamped() {
        let tree = tree("hello world");
        assert_eq!(tree.get_text_in_range(6, 100), "world");
        assert_eq!(tree.get_text_in_range(50, 3), "");
        assert_eq!(tree.get_text_in_range(3, 0), "");
    }

    #[test]
    fn text_in_range_spans_pieces() {
        let mut tree = tree("0123456789");
        tree.insert(5, "abc").unwrap();
        tree.insert(0, "xy").unwrap();
        assert_eq!(tree.get_text(), "xy01234abc56789");
        assert_eq!(tree.get_text_in_range(4, 7), "234abc5");
    }

    #[test]
    fn line_column_conversions() {
        let tree = tree("hello\nworld");
        assert_eq!(tree.get_line_column_from_offset(0), Position::new(0, 0));
        assert_eq!(tree.get_line_column_from_offset(5), Position::new(0, 5));
        assert_eq!(tree.get_line_column_from_offset(6), Position::new(1, 0));
        assert_eq!(tree.get_line_column_from_offset(11), Position::new(1, 5));
        assert_eq!(tree.get_line_column_from_offset(99), Position::new(1, 5));

        assert_eq!(tree.get_offset_from_line_column(1, 2), 8);
        assert_eq!(tree.get_offset_from_line_column(1, 99), 11);
        assert_eq!(tree.get_offset_from_line_column(7, 0), 6);
        // The column may reach the line ending.
        assert_eq!(tree.get_offset_from_line_column(0, 99), 6);
    }

    #[test]
    fn conversions_invert_each_other() {
        let mut tree = tree("a\r\n\nbc\rd\r\n");
        tree.insert(4, "xyz\n").unwrap();
        for offset in 0..=tree.len() {
            let pos = tree.get_line_column_from_offset(offset);
            assert_eq!(tree.get_offset_from_line_column(pos.line, pos.column), offset);
        }
    }

    #[test]
    fn many_inserts_stay_balanced() {
        let mut tree = PieceTree::default();
        let mut expected = String::new();
        for i in 0..200 {
            let at = (i * 7) % (expected.len() + 1);
            let text = format!("{i}\n");
            tree.insert(at, &text).unwrap();
            expected.insert_str(at, &text);
            tree.validate().unwrap();
        }
        assert_eq!(tree.get_text(), expected);
        assert_eq!(tree.line_count(), 201);

        for i in 0..100 {
            let at = (i * 13) % expected.len();
            let len = 3.min(expected.len() - at);
            tree.delete(at, len).unwrap();
            expected.replace_range(at..at + len, "");
            tree.validate().unwrap();
        }
        assert_eq!(tree.get_text(), expected);
    }

    #[test]
    fn node_at_reports_piece_start() {
        let mut tree = tree("abcdef");
        tree.insert(3, "XY").unwrap();
        // abc | XY | def
        let pos = tree.node_at(4);
        assert_eq!((pos.start_offset, pos.remainder), (3, 1));
        let pos = tree.node_at(5);
        assert_eq!((pos.start_offset, pos.remainder), (5, 0));
        let pos = tree.node_at(tree.len());
        assert_eq!((pos.start_offset, pos.remainder), (5, 3));
    }

    #[test]
    fn display_writes_the_document() {
        let mut tree = tree("abc");
        tree.insert(1, "-").unwrap();
        assert_eq!(tree.to_string(), "a-bc");
    }
}
