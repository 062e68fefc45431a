//! Error types for HEALPix indexing.

use thiserror::Error;

/// Result type alias using HealpixError.
pub type HealpixResult<T> = Result<T, HealpixError>;

/// Primary error type for HEALPix operations.
///
/// Every variant is a precondition violation on caller input. Nothing is
/// retryable, and no operation clamps an offending value into range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealpixError {
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("{kind} {index} out of range [0, {len})")]
    IndexOutOfRange {
        kind: IndexKind,
        index: i64,
        len: i64,
    },
}

/// Which index an `IndexOutOfRange` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Row,
    Rank,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Row => write!(f, "Row"),
            IndexKind::Rank => write!(f, "Rank"),
        }
    }
}

impl HealpixError {
    pub(crate) fn invalid(param: &str, message: impl Into<String>) -> Self {
        HealpixError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }

    /// Check an index against `[0, len)`.
    pub(crate) fn check_index(kind: IndexKind, index: i64, len: i64) -> HealpixResult<usize> {
        if index < 0 || index >= len {
            return Err(HealpixError::IndexOutOfRange { kind, index, len });
        }
        Ok(index as usize)
    }

    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            HealpixError::InvalidParameter { .. } => "InvalidParameter",
            HealpixError::IndexOutOfRange { .. } => "IndexOutOfRange",
        }
    }
}
