//! # Query State and Request Encoding
//!
//! The session's query model and its canonical wire payload.

mod encode;
mod errors;
mod samples;
mod state;

pub use encode::{encode, RequestPayload};
pub use errors::{QueryError, QueryResult};
pub use samples::Sample;
pub use state::{QueryState, DEFAULT_ENTITY, DEFAULT_PAGE_SIZE};
