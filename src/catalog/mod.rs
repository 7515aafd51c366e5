//! # Field Catalog
//!
//! Static mapping from entity name to the ordered list of selectable field
//! names (including dotted relation paths such as `department.name`).
//!
//! Lookups are total: an unknown entity yields an empty slice, which callers
//! read as "no fields known" rather than as a failure.

use std::collections::BTreeMap;

/// Number of catalog fields projected after an entity change
pub const DEFAULT_PROJECTION_LEN: usize = 3;

/// Fallback sort field when the catalog knows nothing about an entity
pub const FALLBACK_SORT_FIELD: &str = "id";

/// Registered entities and their selectable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    entries: BTreeMap<String, Vec<String>>,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FieldCatalog {
    /// Catalog for the stock `Employee`/`Department` backend
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Employee".to_string(),
            to_owned(&[
                "id",
                "name",
                "salary",
                "joiningDate",
                "department.name",
                "active",
            ]),
        );
        entries.insert("Department".to_string(), to_owned(&["id", "name"]));
        Self { entries }
    }

    /// Build a catalog from explicit entity entries
    pub fn from_entries(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Ordered selectable fields for `entity`; empty when unknown
    pub fn fields_for(&self, entity: &str) -> &[String] {
        self.entries.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The projection used right after switching to `entity`
    pub fn default_projection(&self, entity: &str) -> Vec<String> {
        self.fields_for(entity)
            .iter()
            .take(DEFAULT_PROJECTION_LEN)
            .cloned()
            .collect()
    }

    /// Field a freshly appended sort row starts on
    pub fn default_sort_field(&self, entity: &str) -> &str {
        self.fields_for(entity)
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_SORT_FIELD)
    }

    /// Whether `entity` is registered
    pub fn has_entity(&self, entity: &str) -> bool {
        self.entries.contains_key(entity)
    }

    /// Registered entity names, sorted
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn to_owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}
