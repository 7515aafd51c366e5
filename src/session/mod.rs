//! # Session
//!
//! An owned, independently instantiated query session. Each session holds
//! its own `QueryState`; nothing is shared between sessions.

mod errors;
mod flight;
mod lifecycle;

pub use errors::{SessionError, SessionResult};
pub use flight::{FetchResponse, PendingFetch, Ticket};
pub use lifecycle::Session;
