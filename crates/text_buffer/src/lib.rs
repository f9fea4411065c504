//! Document facade over [`piece_tree::PieceTree`]: chunked loading, line-ending
//! handling and line/column addressed edits.

mod buffer;
mod buffer_builder;
mod options;

pub use crate::buffer::TextBuffer;
pub use crate::buffer_builder::TextBufferBuilder;
pub use crate::options::{LineEnding, TextBufferOptions};
pub use piece_tree::{Position, RangeError};
