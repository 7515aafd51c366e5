//! Filter key suffix grammar
//!
//! On the wire a filter key is a field name with an optional predicate-kind
//! suffix:
//!
//! | key                   | predicate                         |
//! |-----------------------|-----------------------------------|
//! | `<field>`             | equals                            |
//! | `<field>_like`        | substring match                   |
//! | `<field>_between`     | inclusive 2-element range         |
//! | `<field>_inSubquery`  | membership in a nested query      |
//!
//! Decoding checks the suffixes in that table order, so a bare field that
//! happens to end in `_like` reads back as a LIKE on the shorter name.

use std::fmt;
use std::str::FromStr;

use super::errors::FilterError;

/// Predicate kind encoded by a key suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKind {
    Equals,
    Like,
    Between,
    InSubquery,
}

impl FilterKind {
    /// Suffix appended to the field name
    pub fn suffix(&self) -> &'static str {
        match self {
            FilterKind::Equals => "",
            FilterKind::Like => "_like",
            FilterKind::Between => "_between",
            FilterKind::InSubquery => "_inSubquery",
        }
    }

    /// Short name used in logs and CLI help
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Equals => "equals",
            FilterKind::Like => "like",
            FilterKind::Between => "between",
            FilterKind::InSubquery => "inSubquery",
        }
    }

    const SUFFIXED: [FilterKind; 3] = [FilterKind::Like, FilterKind::Between, FilterKind::InSubquery];
}

/// Field name plus predicate kind
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterKey {
    field: String,
    kind: FilterKind,
}

impl FilterKey {
    pub fn new(field: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn equals(field: impl Into<String>) -> Self {
        Self::new(field, FilterKind::Equals)
    }

    pub fn like(field: impl Into<String>) -> Self {
        Self::new(field, FilterKind::Like)
    }

    pub fn between(field: impl Into<String>) -> Self {
        Self::new(field, FilterKind::Between)
    }

    pub fn in_subquery(field: impl Into<String>) -> Self {
        Self::new(field, FilterKind::InSubquery)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Wire form: field followed by the kind suffix
    pub fn encode(&self) -> String {
        format!("{}{}", self.field, self.kind.suffix())
    }

    /// Split a wire key into field and kind
    pub fn parse(raw: &str) -> Result<Self, FilterError> {
        let (field, kind) = FilterKind::SUFFIXED
            .iter()
            .find_map(|kind| raw.strip_suffix(kind.suffix()).map(|f| (f, *kind)))
            .unwrap_or((raw, FilterKind::Equals));

        if field.is_empty() {
            return Err(FilterError::InvalidKey(raw.to_string()));
        }

        Ok(Self::new(field, kind))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.field, self.kind.suffix())
    }
}

impl FromStr for FilterKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
