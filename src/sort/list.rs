//! Ordered multi-column sort list
//!
//! Earlier entries take priority. Edits are positional against the list as
//! it is at call time: removing an entry shifts every later index down by
//! one, so callers must re-read indices after a removal.

use serde::{Deserialize, Serialize};

use super::errors::{SortError, SortResult};
use super::spec::{SortDirection, SortSpec};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortList {
    specs: Vec<SortSpec>,
}

impl SortList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: Vec<SortSpec>) -> Self {
        Self { specs }
    }

    /// Add `{default_field, asc}` at the end; returns its index
    pub fn append(&mut self, default_field: impl Into<String>) -> usize {
        self.specs.push(SortSpec::asc(default_field));
        self.specs.len() - 1
    }

    pub fn set_field(&mut self, index: usize, field: impl Into<String>) -> SortResult<()> {
        let spec = self.slot(index)?;
        spec.field = field.into();
        Ok(())
    }

    pub fn set_direction(&mut self, index: usize, direction: SortDirection) -> SortResult<()> {
        let spec = self.slot(index)?;
        spec.direction = direction;
        Ok(())
    }

    /// Remove the entry at `index`, shifting later entries down
    pub fn remove(&mut self, index: usize) -> SortResult<SortSpec> {
        if index >= self.specs.len() {
            return Err(SortError::IndexOutOfRange {
                index,
                len: self.specs.len(),
            });
        }
        Ok(self.specs.remove(index))
    }

    pub fn clear(&mut self) {
        self.specs.clear();
    }

    pub fn get(&self, index: usize) -> Option<&SortSpec> {
        self.specs.get(index)
    }

    pub fn as_slice(&self) -> &[SortSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// `#<i> <field> <DIR>` per entry, or `No multi-sort defined`
    pub fn display_lines(&self) -> Vec<String> {
        if self.specs.is_empty() {
            return vec!["No multi-sort defined".to_string()];
        }
        self.specs
            .iter()
            .enumerate()
            .map(|(i, s)| format!("#{} {} {}", i, s.field, s.direction.as_str().to_uppercase()))
            .collect()
    }

    fn slot(&mut self, index: usize) -> SortResult<&mut SortSpec> {
        let len = self.specs.len();
        self.specs
            .get_mut(index)
            .ok_or(SortError::IndexOutOfRange { index, len })
    }
}
