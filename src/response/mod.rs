//! # Response Handling
//!
//! Browse and export response shapes, the consumer that applies them to
//! query state, and the display state it produces.

mod browse;
mod consumer;
mod display;
mod export;

pub use browse::{cell_text, BrowseResponse, PageInfo, RenderedTable};
pub use consumer::{consume, Consumed, FetchMode};
pub use display::{DisplayState, Notice};
pub use export::{ExportHandle, ExportOutcome};
