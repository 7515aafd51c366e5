//! # Transport
//!
//! The seam between the session and the execution endpoint. Everything
//! above this module deals in `RequestPayload` and raw JSON bodies; how
//! they travel is the transport's business.

mod errors;
mod http;

pub use errors::{TransportError, TransportResult};
pub use http::HttpTransport;

use async_trait::async_trait;
use serde_json::Value;

use crate::query::RequestPayload;
use crate::response::ExportHandle;

/// A downloaded export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// One request/response exchange with the execution endpoint
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Send a payload and return the parsed JSON body
    ///
    /// Non-success statuses and unparseable bodies are errors.
    async fn execute(&self, payload: &RequestPayload) -> TransportResult<Value>;

    /// Fetch the file behind an export handle
    async fn download(&self, handle: &ExportHandle) -> TransportResult<Download>;
}
