//! # Request Encoder
//!
//! Serializes a [`QueryState`] into the execution endpoint's request body:
//!
//! ```json
//! { "entity": "Employee",
//!   "fields": ["id", "name", "salary"],
//!   "filters": {"name_like": "John"},
//!   "page": 0, "size": 10,
//!   "sort": "",
//!   "sorts": [{"field": "salary", "direction": "desc"}],
//!   "distinct": false,
//!   "export": false }
//! ```
//!
//! Filter and sort structures pass through verbatim; nested subqueries stay
//! nested. Nothing is defaulted beyond what the state already holds.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::FilterModel;
use crate::sort::{LegacySort, SortList};

use super::state::QueryState;

/// Wire request for the execution endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub entity: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: FilterModel,
    pub page: u32,
    pub size: u32,
    /// Legacy single sort
    #[serde(default)]
    pub sort: LegacySort,
    #[serde(default)]
    pub sorts: SortList,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub export: bool,
}

impl RequestPayload {
    /// JSON form of the request body
    ///
    /// Cannot fail: every field is a string, number, bool, sequence or a
    /// map with string keys, so `to_value` has no error path here.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Snapshot `state` as a request payload
pub fn encode(state: &QueryState) -> RequestPayload {
    RequestPayload {
        entity: state.entity().to_string(),
        fields: state.fields().to_vec(),
        filters: state.filters().clone(),
        page: state.page(),
        size: state.size(),
        sort: state.legacy_sort().clone(),
        sorts: state.sorts().clone(),
        distinct: state.distinct(),
        export: state.export_mode(),
    }
}
