//! Sort model errors

use thiserror::Error;

/// Result type for sort operations
pub type SortResult<T> = Result<T, SortError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// Positional edit past the end of the list
    #[error("Sort index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Direction other than asc/desc
    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),
}

impl SortError {
    pub fn code(&self) -> &'static str {
        match self {
            SortError::IndexOutOfRange { .. } => "DYNQ_SORT_INDEX_OUT_OF_RANGE",
            SortError::InvalidDirection(_) => "DYNQ_SORT_INVALID_DIRECTION",
        }
    }
}
