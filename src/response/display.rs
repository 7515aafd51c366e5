//! Presentation-facing state

use super::browse::{PageInfo, RenderedTable};
use super::export::ExportHandle;

/// What the result area currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// Request issued, no response applied since
    Loading,
    Table(RenderedTable),
    /// Browse succeeded with zero rows
    NoResults(PageInfo),
    ExportFinished,
    /// Transport failure; nothing partial is kept
    Error(String),
}

impl DisplayState {
    pub fn is_error(&self) -> bool {
        matches!(self, DisplayState::Error(_))
    }

    /// Text for a terminal
    pub fn to_text(&self) -> String {
        match self {
            DisplayState::Idle => String::new(),
            DisplayState::Loading => "Loading...".to_string(),
            DisplayState::Table(table) => table.to_string(),
            DisplayState::NoResults(info) => format!("No results\n{}", info),
            DisplayState::ExportFinished => "Export finished".to_string(),
            DisplayState::Error(_) => "Error fetching data".to_string(),
        }
    }
}

/// One-off message for the user (the alert of a browser UI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Export produced a downloadable file
    ExportReady(ExportHandle),
    /// Export answered without a file handle; raw body
    ExportDiagnostic(String),
    /// Transport failure
    Alert(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::ExportReady(handle) => format!(
                "Export ready: {}\nRun download to fetch the file.",
                handle
            ),
            Notice::ExportDiagnostic(raw) => format!("Export response: {}", raw),
            Notice::Alert(msg) => format!("Error: {}", msg),
        }
    }
}
