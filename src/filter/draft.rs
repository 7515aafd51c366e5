//! Interactive filter entry
//!
//! A draft holds whatever the user typed for one filter-add action. A
//! missing or empty field, or a missing value, cancels the action silently:
//! `apply` returns `Ok(false)` and the model is untouched. An empty value
//! string is still a value.

use serde_json::Value;

use super::errors::{FilterError, FilterResult};
use super::model::{FilterModel, SubqueryFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDraft {
    Equals {
        field: Option<String>,
        value: Option<String>,
    },
    Like {
        field: Option<String>,
        pattern: Option<String>,
    },
    Between {
        field: Option<String>,
        lower: Option<String>,
        upper: Option<String>,
    },
    /// Spec entered as JSON text `{entity, field, filters}`
    Subquery {
        field: Option<String>,
        spec: Option<String>,
    },
}

impl FilterDraft {
    /// Apply to `model`; `Ok(false)` when the draft was cancelled
    pub fn apply(self, model: &mut FilterModel) -> FilterResult<bool> {
        match self {
            FilterDraft::Equals { field, value } => {
                let (Some(field), Some(value)) = (present(field), value) else {
                    return Ok(false);
                };
                model.set_equals(field, value);
            }
            FilterDraft::Like { field, pattern } => {
                let (Some(field), Some(pattern)) = (present(field), pattern) else {
                    return Ok(false);
                };
                model.set_like(field, pattern);
            }
            FilterDraft::Between {
                field,
                lower,
                upper,
            } => {
                let (Some(field), Some(lower), Some(upper)) = (present(field), lower, upper) else {
                    return Ok(false);
                };
                model.set_between(field, &lower, &upper);
            }
            FilterDraft::Subquery { field, spec } => {
                let (Some(field), Some(spec)) = (present(field), spec) else {
                    return Ok(false);
                };
                let json: Value = serde_json::from_str(&spec).map_err(|e| {
                    FilterError::invalid_value(format!("{}_inSubquery", field), e.to_string())
                })?;
                let spec = SubqueryFilter::from_json_with_max_depth(&json, model.max_depth())?;
                model.set_subquery(field, spec)?;
            }
        }
        Ok(true)
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|f| !f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_field_cancels() {
        let mut model = FilterModel::new();
        let applied = FilterDraft::Like {
            field: Some(String::new()),
            pattern: Some("John".into()),
        }
        .apply(&mut model)
        .unwrap();

        assert!(!applied);
        assert!(model.is_empty());
    }

    #[test]
    fn test_missing_bound_cancels() {
        let mut model = FilterModel::new();
        let applied = FilterDraft::Between {
            field: Some("salary".into()),
            lower: Some("1".into()),
            upper: None,
        }
        .apply(&mut model)
        .unwrap();

        assert!(!applied);
        assert!(model.is_empty());
    }

    #[test]
    fn test_empty_value_is_still_a_value() {
        let mut model = FilterModel::new();
        let applied = FilterDraft::Equals {
            field: Some("name".into()),
            value: Some(String::new()),
        }
        .apply(&mut model)
        .unwrap();

        assert!(applied);
        assert_eq!(model.to_json(), json!({"name": ""}));
    }

    #[test]
    fn test_subquery_draft() {
        let mut model = FilterModel::new();
        let applied = FilterDraft::Subquery {
            field: Some("department.id".into()),
            spec: Some(r#"{"entity":"Department","field":"id","filters":{"name_like":"Sales"}}"#.into()),
        }
        .apply(&mut model)
        .unwrap();

        assert!(applied);
        assert_eq!(model.depth(), 1);
    }

    fn nested_spec(depth: usize) -> String {
        let mut spec = json!({"entity": "Department", "field": "id", "filters": {}});
        for _ in 1..depth {
            spec = json!({"entity": "Department", "field": "id", "filters": {"id_inSubquery": spec}});
        }
        spec.to_string()
    }

    #[test]
    fn test_subquery_draft_honours_model_depth() {
        let mut roomy = FilterModel::with_max_depth(20);
        let applied = FilterDraft::Subquery {
            field: Some("department.id".into()),
            spec: Some(nested_spec(10)),
        }
        .apply(&mut roomy)
        .unwrap();
        assert!(applied);
        assert_eq!(roomy.depth(), 10);

        let mut tight = FilterModel::with_max_depth(3);
        let result = FilterDraft::Subquery {
            field: Some("department.id".into()),
            spec: Some(nested_spec(4)),
        }
        .apply(&mut tight);
        assert_eq!(result, Err(FilterError::SubqueryTooDeep { depth: 4, max: 3 }));
        assert!(tight.is_empty());
    }

    #[test]
    fn test_subquery_draft_with_bad_json_is_an_error() {
        let mut model = FilterModel::new();
        let result = FilterDraft::Subquery {
            field: Some("department.id".into()),
            spec: Some("{not json".into()),
        }
        .apply(&mut model);

        assert!(matches!(result, Err(FilterError::InvalidValue { .. })));
        assert!(model.is_empty());
    }
}
