//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit. Inside the shell
//! they are printed and the session continues.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::query::QueryError;
use crate::session::SessionError;
use crate::sort::SortError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/output file)
    IoError,
    /// Malformed command-line or shell input
    UsageError,
    /// Query edit rejected
    QueryError,
    /// Round trip to the endpoint failed
    RequestFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DYNQ_CLI_CONFIG_ERROR",
            Self::IoError => "DYNQ_CLI_IO_ERROR",
            Self::UsageError => "DYNQ_CLI_USAGE_ERROR",
            Self::QueryError => "DYNQ_CLI_QUERY_ERROR",
            Self::RequestFailed => "DYNQ_CLI_REQUEST_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::UsageError, msg)
    }

    pub fn query_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::QueryError, msg)
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RequestFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        Self::query_error(e.to_string())
    }
}

impl From<FilterError> for CliError {
    fn from(e: FilterError) -> Self {
        Self::query_error(e.to_string())
    }
}

impl From<SortError> for CliError {
    fn from(e: SortError) -> Self {
        Self::query_error(e.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Config(e) => e.into(),
            SessionError::Query(e) => e.into(),
            SessionError::Filter(e) => e.into(),
            SessionError::NoExport => Self::request_failed("No export"),
            SessionError::Transport(e) => Self::request_failed(e.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
