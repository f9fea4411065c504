use crate::buffer::TextBuffer;
use crate::options::TextBufferOptions;

/// Collects the initial content of a document, one chunk at a time.
#[derive(Default, Debug)]
pub struct TextBufferBuilder {
    chunks: Vec<String>,
    options: TextBufferOptions,
}

impl TextBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TextBufferOptions) -> Self {
        Self {
            chunks: Vec::new(),
            options,
        }
    }

    /// Accept a chunk of text (may include multiple lines). A chunk may end
    /// between the `\r` and `\n` of a line break.
    pub fn accept_chunk(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.chunks.push(chunk.to_string());
    }

    /// Finish building and return a `TextBuffer`.
    pub fn finish(self) -> TextBuffer {
        let chunks = self.chunks.len();
        let buffer = TextBuffer::with_options(self.chunks, self.options);
        tracing::debug!(
            chunks,
            length = buffer.get_length(),
            line_ending = buffer.line_ending().display_name(),
            "text buffer loaded"
        );
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineEnding;

    #[test]
    fn builds_from_streamed_chunks() {
        let mut builder = TextBufferBuilder::new();
        for chunk in ["# Title\r", "\n", "", "body line\r\n", "tail"] {
            builder.accept_chunk(chunk);
        }
        let buffer = builder.finish();
        assert_eq!(buffer.get_text(), "# Title\r\nbody line\r\ntail");
        assert_eq!(buffer.get_lines_content(), vec!["# Title", "body line", "tail"]);
        assert_eq!(buffer.line_ending(), LineEnding::Crlf);
    }

    #[test]
    fn empty_builder_gives_empty_document() {
        let buffer = TextBufferBuilder::new().finish();
        assert_eq!(buffer.get_text(), "");
        assert_eq!(buffer.get_line_count(), 1);
        assert_eq!(buffer.get_line_content(0), "");
    }

    #[test]
    fn options_reach_the_buffer() {
        let options = TextBufferOptions {
            default_line_ending: LineEnding::Cr,
            normalize_line_endings: true,
        };
        let mut builder = TextBufferBuilder::with_options(options.clone());
        builder.accept_chunk("one line");
        let mut buffer = builder.finish();
        assert_eq!(buffer.options(), &options);
        assert_eq!(buffer.line_ending(), LineEnding::Cr);

        buffer.insert(8, "\n").unwrap();
        assert_eq!(buffer.get_text(), "one line\r");
    }
}
