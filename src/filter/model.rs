//! # Filter Model
//!
//! Filter predicates keyed by (field, kind). Each value is a closed,
//! exhaustively matchable variant; `InSubquery` nests another filter model,
//! so predicates form a tree.
//!
//! Keys are unique: setting the same field and kind again overwrites. The
//! same field may carry several kinds at once (`name` and `name_like`).
//! Fields are not checked against the catalog; the backend decides
//! validity.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::{coerce, Scalar};
use super::errors::{FilterError, FilterResult};
use super::key::{FilterKey, FilterKind};

/// Default bound on subquery nesting
pub const DEFAULT_MAX_SUBQUERY_DEPTH: usize = 8;

/// One predicate operand set
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Equals(Scalar),
    Like(Scalar),
    /// Inclusive `[lower, upper]`
    Between(Scalar, Scalar),
    InSubquery(Box<SubqueryFilter>),
}

impl FilterValue {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Equals(_) => FilterKind::Equals,
            FilterValue::Like(_) => FilterKind::Like,
            FilterValue::Between(_, _) => FilterKind::Between,
            FilterValue::InSubquery(_) => FilterKind::InSubquery,
        }
    }

    /// Subquery nesting below this value
    pub fn depth(&self) -> usize {
        match self {
            FilterValue::InSubquery(sub) => sub.depth(),
            _ => 0,
        }
    }

    /// JSON form of the value alone
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Equals(s) | FilterValue::Like(s) => scalar_json(s),
            FilterValue::Between(lower, upper) => {
                Value::Array(vec![scalar_json(lower), scalar_json(upper)])
            }
            FilterValue::InSubquery(sub) => sub.to_json(),
        }
    }

    fn decode(key: &FilterKey, value: &Value) -> FilterResult<Self> {
        let wire_key = key.encode();
        match key.kind() {
            FilterKind::Equals => Scalar::from_json(value)
                .map(FilterValue::Equals)
                .ok_or_else(|| FilterError::invalid_value(&wire_key, "expected a scalar")),
            FilterKind::Like => Scalar::from_json(value)
                .map(FilterValue::Like)
                .ok_or_else(|| FilterError::invalid_value(&wire_key, "expected a scalar")),
            FilterKind::Between => {
                let range = value
                    .as_array()
                    .filter(|items| items.len() == 2)
                    .ok_or_else(|| {
                        FilterError::invalid_value(&wire_key, "expected a [lower, upper] pair")
                    })?;
                let lower = Scalar::from_json(&range[0]);
                let upper = Scalar::from_json(&range[1]);
                match (lower, upper) {
                    (Some(lower), Some(upper)) => Ok(FilterValue::Between(lower, upper)),
                    _ => Err(FilterError::invalid_value(&wire_key, "range bounds must be scalars")),
                }
            }
            FilterKind::InSubquery => {
                let sub = SubqueryFilter::decode(&wire_key, value)?;
                Ok(FilterValue::InSubquery(Box::new(sub)))
            }
        }
    }
}

fn scalar_json(s: &Scalar) -> Value {
    match s {
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Number(n) => Value::Number(n.clone()),
        Scalar::Text(t) => Value::String(t.clone()),
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::Equals(s) | FilterValue::Like(s) => s.serialize(serializer),
            FilterValue::Between(lower, upper) => (lower, upper).serialize(serializer),
            FilterValue::InSubquery(sub) => sub.serialize(serializer),
        }
    }
}

/// Nested query used as a containment test
///
/// Rows of the outer entity match when the outer field's value is among
/// the values of `field` across `entity` rows matching `filters`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryFilter {
    pub entity: String,
    pub field: String,
    pub filters: FilterModel,
}

impl SubqueryFilter {
    pub fn new(entity: impl Into<String>, field: impl Into<String>, filters: FilterModel) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
            filters,
        }
    }

    /// Number of subquery levels, counting this one
    pub fn depth(&self) -> usize {
        1 + self.filters.depth()
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("entity".to_string(), Value::String(self.entity.clone()));
        obj.insert("field".to_string(), Value::String(self.field.clone()));
        obj.insert("filters".to_string(), self.filters.to_json());
        Value::Object(obj)
    }

    /// Parse `{entity, field, filters}`; absent or null `filters` means none
    pub fn from_json(value: &Value) -> FilterResult<Self> {
        Self::from_json_with_max_depth(value, DEFAULT_MAX_SUBQUERY_DEPTH)
    }

    /// Parse, rejecting specs nested deeper than `max_depth`
    pub fn from_json_with_max_depth(value: &Value, max_depth: usize) -> FilterResult<Self> {
        let spec = Self::decode("subquery", value)?;
        let depth = spec.depth();
        if depth > max_depth {
            return Err(FilterError::SubqueryTooDeep {
                depth,
                max: max_depth,
            });
        }
        Ok(spec)
    }

    // Nesting is bounded afterwards by the caller; serde_json's own
    // recursion limit caps how deep the input tree can be.
    fn decode(wire_key: &str, value: &Value) -> FilterResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| FilterError::invalid_value(wire_key, "expected a subquery object"))?;

        let entity = obj
            .get("entity")
            .and_then(Value::as_str)
            .ok_or(FilterError::MissingSubqueryField("entity"))?;
        let field = obj
            .get("field")
            .and_then(Value::as_str)
            .ok_or(FilterError::MissingSubqueryField("field"))?;

        let filters = match obj.get("filters") {
            None | Some(Value::Null) => FilterModel::new(),
            Some(Value::Object(map)) => FilterModel::decode_map(map)?,
            Some(_) => {
                return Err(FilterError::invalid_value(
                    wire_key,
                    "subquery filters must be an object",
                ))
            }
        };

        Ok(Self::new(entity, field, filters))
    }
}

impl Serialize for SubqueryFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("SubqueryFilter", 3)?;
        st.serialize_field("entity", &self.entity)?;
        st.serialize_field("field", &self.field)?;
        st.serialize_field("filters", &self.filters)?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for SubqueryFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SubqueryFilter::from_json(&value).map_err(de::Error::custom)
    }
}

/// Mapping from filter key to predicate value
#[derive(Debug, Clone, PartialEq)]
pub struct FilterModel {
    entries: BTreeMap<FilterKey, FilterValue>,
    max_depth: usize,
}

impl Default for FilterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterModel {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_SUBQUERY_DEPTH)
    }

    /// Empty model that rejects subqueries nested deeper than `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// `<field>` = value, kept exactly as given
    pub fn set_equals(&mut self, field: impl Into<String>, value: impl Into<Scalar>) {
        self.insert(field.into(), FilterValue::Equals(value.into()));
    }

    /// `<field>_like` = pattern
    pub fn set_like(&mut self, field: impl Into<String>, pattern: impl Into<Scalar>) {
        self.insert(field.into(), FilterValue::Like(pattern.into()));
    }

    /// `<field>_between` = [lower, upper], each bound coerced on its own
    pub fn set_between(&mut self, field: impl Into<String>, lower: &str, upper: &str) {
        self.set_between_scalars(field, coerce(lower), coerce(upper));
    }

    /// `<field>_between` with already-typed bounds
    pub fn set_between_scalars(&mut self, field: impl Into<String>, lower: Scalar, upper: Scalar) {
        self.insert(field.into(), FilterValue::Between(lower, upper));
    }

    /// `<field>_inSubquery` = nested spec
    pub fn set_subquery(&mut self, field: impl Into<String>, spec: SubqueryFilter) -> FilterResult<()> {
        let depth = spec.depth();
        if depth > self.max_depth {
            return Err(FilterError::SubqueryTooDeep {
                depth,
                max: self.max_depth,
            });
        }
        self.insert(field.into(), FilterValue::InSubquery(Box::new(spec)));
        Ok(())
    }

    // Uniqueness is on the wire key: `name_like` as an equals field and
    // `name` as a like field collide, and the later write wins.
    fn insert(&mut self, field: String, value: FilterValue) {
        let key = FilterKey::new(field, value.kind());
        let wire = key.encode();
        self.entries.retain(|existing, _| existing.encode() != wire);
        self.entries.insert(key, value);
    }

    /// Delete one key; absent keys are a no-op
    pub fn remove(&mut self, key: &FilterKey) -> Option<FilterValue> {
        self.entries.remove(key)
    }

    /// Delete by wire key (`salary_between`)
    pub fn remove_encoded(&mut self, raw: &str) -> Option<FilterValue> {
        let key = FilterKey::parse(raw).ok()?;
        self.remove(&key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, key: &FilterKey) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterKey, &FilterValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deepest subquery nesting in this model; 0 without subqueries
    pub fn depth(&self) -> usize {
        self.entries.values().map(FilterValue::depth).max().unwrap_or(0)
    }

    /// One `<key> : <json>` line per filter, or `No filters`
    pub fn display_lines(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return vec!["No filters".to_string()];
        }
        self.entries
            .iter()
            .map(|(key, value)| format!("{} : {}", key, value.to_json()))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, value)| (key.encode(), value.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Decode a wire filter object, bounding subquery depth by `max_depth`
    pub fn from_json_with_max_depth(value: &Value, max_depth: usize) -> FilterResult<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| FilterError::invalid_value("filters", "expected an object"))?;
        let mut model = Self::decode_map(map)?;
        model.max_depth = max_depth;

        let depth = model.depth();
        if depth > max_depth {
            return Err(FilterError::SubqueryTooDeep {
                depth,
                max: max_depth,
            });
        }
        Ok(model)
    }

    fn decode_map(map: &Map<String, Value>) -> FilterResult<Self> {
        let mut model = Self::new();
        for (raw_key, raw_value) in map {
            let key = FilterKey::parse(raw_key)?;
            let value = FilterValue::decode(&key, raw_value)?;
            model.entries.insert(key, value);
        }
        Ok(model)
    }
}

impl Serialize for FilterModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&key.encode(), value)?;
        }
        map.end()
    }
}

/// Wire decoding has no session config to consult and bounds nesting by
/// [`DEFAULT_MAX_SUBQUERY_DEPTH`]; use [`FilterModel::from_json_with_max_depth`]
/// for another bound.
impl<'de> Deserialize<'de> for FilterModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FilterModel::from_json_with_max_depth(&value, DEFAULT_MAX_SUBQUERY_DEPTH)
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sales_departments() -> SubqueryFilter {
        let mut inner = FilterModel::new();
        inner.set_like("name", "Sales");
        SubqueryFilter::new("Department", "id", inner)
    }

    #[test]
    fn test_set_between_coerces_numeric_bounds() {
        let mut filters = FilterModel::new();
        filters.set_between("salary", "30000", "80000");
        filters.set_between("name", "A", "M");

        assert_eq!(
            filters.to_json(),
            json!({"salary_between": [30000, 80000], "name_between": ["A", "M"]})
        );
    }

    #[test]
    fn test_between_bounds_coerce_independently() {
        let mut filters = FilterModel::new();
        filters.set_between("salary", "30000", "30k");
        assert_eq!(filters.to_json(), json!({"salary_between": [30000, "30k"]}));
    }

    #[test]
    fn test_equals_keeps_input_verbatim() {
        let mut filters = FilterModel::new();
        filters.set_equals("id", "42");
        assert_eq!(filters.to_json(), json!({"id": "42"}));
    }

    #[test]
    fn test_same_key_overwrites() {
        let mut filters = FilterModel::new();
        filters.set_like("name", "Jo");
        filters.set_like("name", "John");
        assert_eq!(filters.len(), 1);
        assert_eq!(
            filters.get(&FilterKey::like("name")),
            Some(&FilterValue::Like(Scalar::from("John")))
        );
    }

    #[test]
    fn test_colliding_wire_keys_overwrite() {
        let mut filters = FilterModel::new();
        filters.set_like("name", "John");
        filters.set_equals("name_like", "x");

        assert_eq!(filters.len(), 1);
        assert_eq!(
            filters.get(&FilterKey::equals("name_like")),
            Some(&FilterValue::Equals(Scalar::from("x")))
        );
        assert!(filters.get(&FilterKey::like("name")).is_none());

        let wire = serde_json::to_string(&filters).unwrap();
        assert_eq!(wire, r#"{"name_like":"x"}"#);

        filters.set_like("name", "Jo");
        assert_eq!(filters.len(), 1);
        assert_eq!(filters.to_json(), json!({"name_like": "Jo"}));
    }

    #[test]
    fn test_kinds_coexist_on_one_field() {
        let mut filters = FilterModel::new();
        filters.set_equals("name", "John 5");
        filters.set_like("name", "John");
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut filters = FilterModel::new();
        filters.set_like("name", "John");
        let before = filters.clone();

        assert!(filters.remove(&FilterKey::equals("salary")).is_none());
        assert!(filters.remove_encoded("salary_between").is_none());
        assert!(filters.remove_encoded("_like").is_none());
        assert_eq!(filters, before);
    }

    #[test]
    fn test_remove_encoded_and_clear() {
        let mut filters = FilterModel::new();
        filters.set_like("name", "John");
        filters.set_between("salary", "1", "2");

        assert!(filters.remove_encoded("name_like").is_some());
        assert_eq!(filters.len(), 1);

        filters.clear();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_subquery_serializes_nested_and_unflattened() {
        let mut filters = FilterModel::new();
        filters.set_subquery("department.id", sales_departments()).unwrap();

        assert_eq!(
            serde_json::to_value(&filters).unwrap(),
            json!({
                "department.id_inSubquery": {
                    "entity": "Department",
                    "field": "id",
                    "filters": {"name_like": "Sales"}
                }
            })
        );
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let mut filters = FilterModel::new();
        filters.set_equals("active", true);
        filters.set_between("joiningDate", "2023-01-01", "2023-12-31");
        filters.set_subquery("department.id", sales_departments()).unwrap();

        assert_eq!(serde_json::to_value(&filters).unwrap(), filters.to_json());
    }

    #[test]
    fn test_depth_limit_on_set() {
        let mut spec = sales_departments();
        for _ in 0..2 {
            let mut wrapper = FilterModel::new();
            wrapper.set_subquery("id", spec).unwrap();
            spec = SubqueryFilter::new("Department", "id", wrapper);
        }
        assert_eq!(spec.depth(), 3);

        let mut shallow = FilterModel::with_max_depth(2);
        let err = shallow.set_subquery("department.id", spec.clone()).unwrap_err();
        assert_eq!(err, FilterError::SubqueryTooDeep { depth: 3, max: 2 });
        assert!(shallow.is_empty());

        let mut roomy = FilterModel::with_max_depth(3);
        roomy.set_subquery("department.id", spec).unwrap();
        assert_eq!(roomy.depth(), 3);
    }

    #[test]
    fn test_decode_wire_filters() {
        let wire = json!({
            "name_like": "John",
            "salary_between": [30000, 80000],
            "active": true,
            "department.id_inSubquery": {
                "entity": "Department",
                "field": "id",
                "filters": {"name_like": "Sales"}
            }
        });

        let filters: FilterModel = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(filters.len(), 4);
        assert_eq!(filters.depth(), 1);
        assert_eq!(serde_json::to_value(&filters).unwrap(), wire);
    }

    #[test]
    fn test_decode_subquery_without_filters() {
        let filters = FilterModel::from_json_with_max_depth(
            &json!({"department.id_inSubquery": {"entity": "Department", "field": "id", "filters": null}}),
            8,
        )
        .unwrap();

        match filters.get(&FilterKey::in_subquery("department.id")) {
            Some(FilterValue::InSubquery(sub)) => assert!(sub.filters.is_empty()),
            other => panic!("Expected subquery, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        let bad_range = json!({"salary_between": [1]});
        assert!(matches!(
            FilterModel::from_json_with_max_depth(&bad_range, 8),
            Err(FilterError::InvalidValue { .. })
        ));

        let missing_field = json!({"x_inSubquery": {"entity": "Department"}});
        assert_eq!(
            FilterModel::from_json_with_max_depth(&missing_field, 8).unwrap_err(),
            FilterError::MissingSubqueryField("field")
        );

        let object_equals = json!({"name": {"nested": 1}});
        assert!(FilterModel::from_json_with_max_depth(&object_equals, 8).is_err());
    }

    #[test]
    fn test_decode_rejects_too_deep() {
        let wire = json!({
            "a_inSubquery": {
                "entity": "E", "field": "id",
                "filters": {
                    "b_inSubquery": {"entity": "E", "field": "id", "filters": {}}
                }
            }
        });

        assert!(FilterModel::from_json_with_max_depth(&wire, 2).is_ok());
        assert_eq!(
            FilterModel::from_json_with_max_depth(&wire, 1).unwrap_err(),
            FilterError::SubqueryTooDeep { depth: 2, max: 1 }
        );
    }

    #[test]
    fn test_display_lines() {
        let mut filters = FilterModel::new();
        assert_eq!(filters.display_lines(), vec!["No filters"]);

        filters.set_between("salary", "30000", "80000");
        assert_eq!(filters.display_lines(), vec!["salary_between : [30000,80000]"]);
    }
}
