//! Observability for query sessions
//!
//! Structured JSON logging of typed session events. Observability is
//! read-only: nothing here feeds back into query state.
//!
//! ```ignore
//! use dynquery::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::FetchBegin, &[("entity", "Employee")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a session event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a session event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
