/// A (line, column) position inside one buffer's own coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferCursor {
    pub line: usize,
    pub column: usize,
}

impl BufferCursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A 0-based (line, column) position in document coordinates. Columns are byte
/// offsets from the start of the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A run of `length` bytes of `buffers[buffer_idx]` between `start` and `end`.
///
/// `line_feed_cnt` is the number of line breaks in that run taken on its own,
/// so a run cut between `\r` and `\n` credits the `\r` as a break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Piece {
    pub buffer_idx: usize,
    pub start: BufferCursor,
    pub end: BufferCursor,
    pub length: usize,
    pub line_feed_cnt: usize,
}

impl Piece {
    pub fn new(
        buffer_idx: usize,
        start: BufferCursor,
        end: BufferCursor,
        length: usize,
        line_feed_cnt: usize,
    ) -> Self {
        Self {
            buffer_idx,
            start,
            end,
            length,
            line_feed_cnt,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
