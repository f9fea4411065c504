use crate::piece::BufferCursor;

/// Byte written between two appended runs that would otherwise fuse into a
/// CRLF inside the add buffer. Never referenced by any piece.
const CRLF_GUARD: char = '_';

#[derive(Debug, Clone)]
pub(crate) struct StringBuffer {
    buffer: String,
    line_starts: Vec<usize>,
}

impl StringBuffer {
    pub fn new(buffer: String) -> Self {
        let line_starts = Self::create_line_starts(&buffer);
        Self {
            buffer,
            line_starts,
        }
    }

    /// Offsets at which a line begins. `\r\n`, lone `\n` and lone `\r` each end a line.
    pub fn create_line_starts(text: &str) -> Vec<usize> {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut i = 0;

        while i < len {
            match bytes[i] {
                b'\r' => {
                    if i + 1 < len && bytes[i + 1] == b'\n' {
                        line_starts.push(i + 2);
                        i += 1;
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                b'\n' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }

        line_starts
    }

    /// Appends `text` and returns the buffer offset at which it starts.
    pub fn append(&mut self, text: &str) -> usize {
        if self.buffer.ends_with('\r') && text.starts_with('\n') {
            self.buffer.push(CRLF_GUARD);
        }

        let start_offset = self.buffer.len();
        self.buffer.push_str(text);
        self.line_starts.extend(
            Self::create_line_starts(text)
                .into_iter()
                .skip(1)
                .map(|start| start + start_offset),
        );
        start_offset
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.buffer.as_bytes().get(offset).copied()
    }

    /// Index of the line containing `offset`.
    pub fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    pub fn offset_of(&self, cursor: BufferCursor) -> usize {
        self.line_starts[cursor.line] + cursor.column
    }

    pub fn cursor_at(&self, offset: usize) -> BufferCursor {
        let line = self.line_index(offset);
        BufferCursor::new(line, offset - self.line_starts[line])
    }

    /// Cursor `delta` bytes after `start`.
    pub fn cursor_after(&self, start: BufferCursor, delta: usize) -> BufferCursor {
        self.cursor_at(self.offset_of(start) + delta)
    }

    /// Number of line breaks between two cursors, crediting a `\r` at `end`
    /// whose `\n` lies beyond it.
    pub fn line_feed_cnt(&self, start: BufferCursor, end: BufferCursor) -> usize {
        if start == end {
            return 0;
        }
        let mut cnt = end.line - start.line;
        let end_offset = self.offset_of(end);
        if end_offset > 0
            && self.byte_at(end_offset) == Some(b'\n')
            && self.byte_at(end_offset - 1) == Some(b'\r')
        {
            cnt += 1;
        }
        cnt
    }
}
