//! In-flight request bookkeeping

use std::sync::Arc;

use serde_json::Value;

use crate::query::RequestPayload;
use crate::response::FetchMode;
use crate::transport::{QueryTransport, TransportResult};

/// Sequence number of an issued request, unique within a session
pub type Ticket = u64;

/// A request that has been issued but not yet sent
///
/// The payload is a snapshot taken at issue time. Edits to the session
/// state after issue do not reach it.
pub struct PendingFetch {
    pub(crate) ticket: Ticket,
    pub(crate) mode: FetchMode,
    pub(crate) payload: RequestPayload,
    pub(crate) transport: Arc<dyn QueryTransport>,
}

impl PendingFetch {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    /// Perform the round trip. Borrows nothing from the session, so
    /// several may be awaited concurrently.
    pub async fn send(self) -> FetchResponse {
        let result = self.transport.execute(&self.payload).await;
        FetchResponse {
            ticket: self.ticket,
            mode: self.mode,
            result,
        }
    }
}

impl std::fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFetch")
            .field("ticket", &self.ticket)
            .field("mode", &self.mode)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// Outcome of a sent request, waiting to be applied to its session
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub ticket: Ticket,
    pub mode: FetchMode,
    pub result: TransportResult<Value>,
}
