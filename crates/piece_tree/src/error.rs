use thiserror::Error;

pub type Result<T> = std::result::Result<T, RangeError>;

/// Raised by mutations whose arguments fall outside the current document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RangeError {
    #[error("offset {offset} is out of bounds for document length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("range {start}..{end} is out of bounds for document length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },
}

/// First broken invariant found by [`crate::PieceTree::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantError {
    #[error("root node is red")]
    RedRoot,
    #[error("red node {node} has a red child")]
    RedRedViolation { node: usize },
    #[error("black height differs below node {node}: {left} on the left, {right} on the right")]
    BlackHeightMismatch {
        node: usize,
        left: usize,
        right: usize,
    },
    #[error("node {node} does not point back to its parent {parent}")]
    BrokenParentLink { node: usize, parent: usize },
    #[error("node {node} caches size_left={cached} but its left subtree holds {actual}")]
    StaleSizeLeft {
        node: usize,
        cached: usize,
        actual: usize,
    },
    #[error("node {node} caches lf_left={cached} but its left subtree holds {actual}")]
    StaleLineFeedLeft {
        node: usize,
        cached: usize,
        actual: usize,
    },
    #[error("node {node} holds an empty piece")]
    EmptyPiece { node: usize },
    #[error("node {node} counts {cached} line feeds but its text holds {actual}")]
    WrongLineFeedCount {
        node: usize,
        cached: usize,
        actual: usize,
    },
    #[error("node {node} ends with CR and its successor starts with LF")]
    SplitCrlf { node: usize },
    #[error("cached length {cached} differs from the pieces' total {actual}")]
    StaleLength { cached: usize, actual: usize },
    #[error("cached line count {cached} differs from the pieces' total {actual}")]
    StaleLineCount { cached: usize, actual: usize },
}
