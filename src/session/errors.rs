//! Session error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::query::QueryError;
use crate::transport::TransportError;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Download requested before any export produced a handle
    #[error("No export")]
    NoExport,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::NoExport => "DYNQ_SESSION_NO_EXPORT",
            SessionError::Query(e) => e.code(),
            SessionError::Filter(e) => e.code(),
            SessionError::Transport(e) => e.code(),
            SessionError::Config(e) => e.code(),
        }
    }
}
