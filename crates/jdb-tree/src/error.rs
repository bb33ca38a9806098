use thiserror::Error;

/// Errors produced while building document paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("invalid path segment {segment:?}: {reason}")]
    InvalidSegment { segment: String, reason: String },
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
