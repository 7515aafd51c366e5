//! Observable session events
//!
//! Events are explicit and typed. Every log line the crate emits names one
//! of these.

use std::fmt;

use super::logger::Severity;

/// Observable events in a query session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration file loaded
    ConfigLoaded,
    /// New session created
    SessionStart,

    // State mutation
    /// Entity switched; sorts dropped, fields truncated
    EntityChanged,
    /// Sample preset applied
    SampleApplied,

    // Execution endpoint round trip
    /// Request issued
    FetchBegin,
    /// Browse response rendered
    FetchComplete,
    /// Transport failure; display reset to error state
    FetchFailed,
    /// A response landed after a newer request was issued
    StaleResponseApplied,

    // Export / download
    /// Export response carried a file handle
    ExportReady,
    /// Export response had no file handle
    ExportDiagnostic,
    /// Export artifact retrieved
    DownloadComplete,
    /// Export artifact retrieval failed
    DownloadFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SessionStart => "SESSION_START",
            Event::EntityChanged => "ENTITY_CHANGED",
            Event::SampleApplied => "SAMPLE_APPLIED",
            Event::FetchBegin => "FETCH_BEGIN",
            Event::FetchComplete => "FETCH_COMPLETE",
            Event::FetchFailed => "FETCH_FAILED",
            Event::StaleResponseApplied => "STALE_RESPONSE_APPLIED",
            Event::ExportReady => "EXPORT_READY",
            Event::ExportDiagnostic => "EXPORT_DIAGNOSTIC",
            Event::DownloadComplete => "DOWNLOAD_COMPLETE",
            Event::DownloadFailed => "DOWNLOAD_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::FetchFailed | Event::DownloadFailed => Severity::Error,
            Event::StaleResponseApplied | Event::ExportDiagnostic => Severity::Warn,
            Event::FetchBegin => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
