//! # Sort Model
//!
//! Multi-column sort list plus the deprecated single-string sort kept for
//! wire compatibility.

mod errors;
mod list;
mod spec;

pub use errors::{SortError, SortResult};
pub use list::SortList;
pub use spec::{LegacySort, SortDirection, SortSpec};
