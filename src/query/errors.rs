//! Query state errors

use thiserror::Error;

use crate::filter::FilterError;
use crate::sort::SortError;

/// Result type for query state operations
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Page size must be positive
    #[error("Page size must be positive")]
    InvalidPageSize,

    /// No preset with this number
    #[error("Unknown sample: {0}")]
    UnknownSample(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sort(#[from] SortError),
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidPageSize => "DYNQ_QUERY_INVALID_PAGE_SIZE",
            QueryError::UnknownSample(_) => "DYNQ_QUERY_UNKNOWN_SAMPLE",
            QueryError::Filter(e) => e.code(),
            QueryError::Sort(e) => e.code(),
        }
    }
}
