//! # Response Consumer
//!
//! Turns the outcome of one execution round trip into display state and,
//! for exports, the recorded file handle.
//!
//! The response shape is chosen by the `export` flag that was sent, not by
//! anything in the body. Any transport failure (bad status, network error,
//! unparseable or wrongly shaped browse body) resets the display to an
//! error and leaves query state untouched.

use serde_json::Value;

use crate::query::QueryState;
use crate::transport::{TransportError, TransportResult};

use super::browse::BrowseResponse;
use super::display::{DisplayState, Notice};
use super::export::ExportOutcome;

/// Which response shape a request expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Browse,
    Export,
}

impl FetchMode {
    pub fn from_export_flag(export: bool) -> Self {
        if export {
            FetchMode::Export
        } else {
            FetchMode::Browse
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Browse => "browse",
            FetchMode::Export => "export",
        }
    }
}

/// Result of consuming one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumed {
    pub display: DisplayState,
    pub notice: Option<Notice>,
}

impl Consumed {
    fn failed(err: &TransportError) -> Self {
        Self {
            display: DisplayState::Error(err.to_string()),
            notice: Some(Notice::Alert(err.to_string())),
        }
    }
}

/// Apply a response to `state`
///
/// Browse rows are projected onto the state's current fields, i.e. the
/// fields at the time the response lands.
pub fn consume(state: &mut QueryState, mode: FetchMode, outcome: TransportResult<Value>) -> Consumed {
    let body = match outcome {
        Ok(body) => body,
        Err(err) => return Consumed::failed(&err),
    };

    match mode {
        FetchMode::Export => {
            let notice = match ExportOutcome::from_body(&body) {
                ExportOutcome::Ready(handle) => {
                    state.record_export_handle(handle.clone());
                    Notice::ExportReady(handle)
                }
                ExportOutcome::Diagnostic(raw) => Notice::ExportDiagnostic(raw),
            };
            Consumed {
                display: DisplayState::ExportFinished,
                notice: Some(notice),
            }
        }
        FetchMode::Browse => {
            let response: BrowseResponse = match serde_json::from_value(body) {
                Ok(r) => r,
                Err(e) => return Consumed::failed(&TransportError::MalformedBody(e.to_string())),
            };
            let display = match response.render(state.fields()) {
                Some(table) => DisplayState::Table(table),
                None => DisplayState::NoResults(response.page_info()),
            };
            Consumed {
                display,
                notice: None,
            }
        }
    }
}
