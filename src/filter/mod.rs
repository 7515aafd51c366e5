//! # Filter Model
//!
//! Typed filter predicates and their suffix-keyed wire encoding.

mod coerce;
mod draft;
mod errors;
mod key;
mod model;

pub use coerce::{coerce, is_numeric_literal, Scalar};
pub use draft::FilterDraft;
pub use errors::{FilterError, FilterResult};
pub use key::{FilterKey, FilterKind};
pub use model::{FilterModel, FilterValue, SubqueryFilter, DEFAULT_MAX_SUBQUERY_DEPTH};
