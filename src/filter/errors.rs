//! Filter model errors

use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while building or decoding filters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Key does not name a field
    #[error("Invalid filter key: '{0}'")]
    InvalidKey(String),

    /// Value shape does not match the predicate kind encoded in the key
    #[error("Invalid value for filter '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// Subquery spec lacks `entity` or `field`
    #[error("Subquery spec must contain '{0}'")]
    MissingSubqueryField(&'static str),

    /// Nested subqueries go deeper than allowed
    #[error("Subquery nesting depth {depth} exceeds maximum {max}")]
    SubqueryTooDeep { depth: usize, max: usize },
}

impl FilterError {
    pub(crate) fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::InvalidKey(_) => "DYNQ_FILTER_INVALID_KEY",
            FilterError::InvalidValue { .. } => "DYNQ_FILTER_INVALID_VALUE",
            FilterError::MissingSubqueryField(_) => "DYNQ_FILTER_SUBQUERY_INCOMPLETE",
            FilterError::SubqueryTooDeep { .. } => "DYNQ_FILTER_SUBQUERY_TOO_DEEP",
        }
    }
}
