//! # Query State
//!
//! The aggregate root for one session's query: entity, projection, filters,
//! sorts, paging, distinct/export flags and the last export handle.
//!
//! State is plain owned data. Nothing here talks to the network or logs;
//! the session layer drives it.

use crate::catalog::FieldCatalog;
use crate::config::ClientConfig;
use crate::filter::{FilterModel, DEFAULT_MAX_SUBQUERY_DEPTH};
use crate::response::ExportHandle;
use crate::sort::{LegacySort, SortList};

use super::encode::RequestPayload;
use super::errors::{QueryError, QueryResult};

/// Entity a new session starts on
pub const DEFAULT_ENTITY: &str = "Employee";

/// Page size a new session starts with
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    entity: String,
    fields: Vec<String>,
    filters: FilterModel,
    sorts: SortList,
    legacy_sort: LegacySort,
    page: u32,
    size: u32,
    distinct: bool,
    export_mode: bool,
    last_export_handle: Option<ExportHandle>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            entity: DEFAULT_ENTITY.to_string(),
            fields: vec!["id".to_string(), "name".to_string(), "salary".to_string()],
            filters: FilterModel::with_max_depth(DEFAULT_MAX_SUBQUERY_DEPTH),
            sorts: SortList::new(),
            legacy_sort: LegacySort::default(),
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            distinct: false,
            export_mode: false,
            last_export_handle: None,
        }
    }
}

impl QueryState {
    /// Fresh state for a configured session
    ///
    /// Starts on `Employee` when the catalog has it, else on the first
    /// catalog entity, with that entity's default projection.
    pub fn from_config(config: &ClientConfig, catalog: &FieldCatalog) -> Self {
        let entity = if catalog.has_entity(DEFAULT_ENTITY) {
            DEFAULT_ENTITY.to_string()
        } else {
            catalog
                .entities()
                .next()
                .unwrap_or(DEFAULT_ENTITY)
                .to_string()
        };

        Self {
            fields: catalog.default_projection(&entity),
            entity,
            filters: FilterModel::with_max_depth(config.max_subquery_depth),
            size: config.default_page_size,
            ..Default::default()
        }
    }

    /// Rebuild state from a previously encoded payload
    pub fn from_payload(payload: RequestPayload) -> Self {
        Self {
            entity: payload.entity,
            fields: payload.fields,
            filters: payload.filters,
            sorts: payload.sorts,
            legacy_sort: payload.sort,
            page: payload.page,
            size: payload.size.max(1),
            distinct: payload.distinct,
            export_mode: payload.export,
            last_export_handle: None,
        }
    }

    // ------------------------------------------------------------------
    // Entity and projection
    // ------------------------------------------------------------------

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Switch entity
    ///
    /// The sort list is dropped (its fields belong to the old entity) and
    /// the projection resets to the catalog's first three fields. Filters
    /// are kept as-is.
    pub fn set_entity(&mut self, entity: impl Into<String>, catalog: &FieldCatalog) {
        self.entity = entity.into();
        self.fields = catalog.default_projection(&self.entity);
        self.sorts.clear();
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Replace the projection, dropping repeats but keeping first-seen order
    pub fn set_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.clear();
        for field in fields {
            self.select_field(field);
        }
    }

    /// Add to the projection if absent
    pub fn select_field(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if self.fields.contains(&field) {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Drop from the projection if present
    pub fn deselect_field(&mut self, field: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f != field);
        self.fields.len() != before
    }

    // ------------------------------------------------------------------
    // Filters and sorts
    // ------------------------------------------------------------------

    pub fn filters(&self) -> &FilterModel {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterModel {
        &mut self.filters
    }

    pub fn sorts(&self) -> &SortList {
        &self.sorts
    }

    pub fn sorts_mut(&mut self) -> &mut SortList {
        &mut self.sorts
    }

    /// Append an ascending sort on the entity's first catalog field
    pub fn append_sort(&mut self, catalog: &FieldCatalog) -> usize {
        let field = catalog.default_sort_field(&self.entity).to_string();
        self.sorts.append(field)
    }

    pub fn legacy_sort(&self) -> &LegacySort {
        &self.legacy_sort
    }

    pub fn set_legacy_sort(&mut self, raw: impl Into<String>) {
        self.legacy_sort = LegacySort::new(raw);
    }

    // ------------------------------------------------------------------
    // Paging and flags
    // ------------------------------------------------------------------

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Step back one page; false (and no change) on the first page
    pub fn prev_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) -> QueryResult<()> {
        if size == 0 {
            return Err(QueryError::InvalidPageSize);
        }
        self.size = size;
        Ok(())
    }

    pub fn distinct(&self) -> bool {
        self.distinct
    }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    pub fn export_mode(&self) -> bool {
        self.export_mode
    }

    pub fn set_export_mode(&mut self, export_mode: bool) {
        self.export_mode = export_mode;
    }

    // ------------------------------------------------------------------
    // Export handle
    // ------------------------------------------------------------------

    pub fn last_export_handle(&self) -> Option<&ExportHandle> {
        self.last_export_handle.as_ref()
    }

    /// Record the handle of a successful export. Only ever overwritten,
    /// never cleared.
    pub fn record_export_handle(&mut self, handle: ExportHandle) {
        self.last_export_handle = Some(handle);
    }

    /// Replace query-defining parts in one step; the legacy sort, export
    /// mode and export handle are left alone
    pub(crate) fn reset_query(
        &mut self,
        entity: &str,
        fields: &[&str],
        size: u32,
        distinct: bool,
    ) {
        self.entity = entity.to_string();
        self.set_fields(fields.iter().copied());
        self.filters.clear();
        self.sorts.clear();
        self.page = 0;
        self.size = size.max(1);
        self.distinct = distinct;
    }
}
