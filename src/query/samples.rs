//! Preset queries
//!
//! Each preset replaces entity, projection, filters, sorts, paging and the
//! distinct flag in one step. The legacy sort and any recorded export
//! handle are left untouched.

use std::str::FromStr;

use crate::filter::{FilterModel, Scalar, SubqueryFilter};
use crate::sort::{SortList, SortSpec};

use super::errors::{QueryError, QueryResult};
use super::state::QueryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// Employees whose name contains "John"
    NameLike,
    /// Employees earning 30000..=80000, highest first
    SalaryRange,
    /// Distinct department names
    DistinctDepartments,
    /// Employees in departments whose name contains "Sales"
    SalesSubquery,
}

impl Sample {
    pub const ALL: [Sample; 4] = [
        Sample::NameLike,
        Sample::SalaryRange,
        Sample::DistinctDepartments,
        Sample::SalesSubquery,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Sample::NameLike => 1,
            Sample::SalaryRange => 2,
            Sample::DistinctDepartments => 3,
            Sample::SalesSubquery => 4,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Sample::NameLike => "Employees with name like 'John'",
            Sample::SalaryRange => "Employees with salary between 30000 and 80000, by salary desc",
            Sample::DistinctDepartments => "Distinct department names",
            Sample::SalesSubquery => "Employees in departments named like 'Sales' (subquery)",
        }
    }

    pub fn apply(&self, state: &mut QueryState) -> QueryResult<()> {
        match self {
            Sample::NameLike => {
                state.reset_query("Employee", &["id", "name", "salary"], 10, false);
                state.filters_mut().set_like("name", "John");
            }
            Sample::SalaryRange => {
                state.reset_query("Employee", &["id", "name", "salary"], 10, false);
                state
                    .filters_mut()
                    .set_between_scalars("salary", Scalar::from(30000), Scalar::from(80000));
                *state.sorts_mut() = SortList::from_specs(vec![SortSpec::desc("salary")]);
            }
            Sample::DistinctDepartments => {
                state.reset_query("Employee", &["department.name"], 20, true);
                *state.sorts_mut() = SortList::from_specs(vec![SortSpec::asc("department.name")]);
            }
            Sample::SalesSubquery => {
                state.reset_query("Employee", &["id", "name", "department.name"], 10, false);
                let mut inner = FilterModel::new();
                inner.set_like("name", "Sales");
                state
                    .filters_mut()
                    .set_subquery("department.id", SubqueryFilter::new("Department", "id", inner))?;
                *state.sorts_mut() = SortList::from_specs(vec![SortSpec::asc("name")]);
            }
        }
        Ok(())
    }
}

impl FromStr for Sample {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sample::ALL
            .into_iter()
            .find(|sample| sample.number().to_string() == s.trim())
            .ok_or_else(|| QueryError::UnknownSample(s.to_string()))
    }
}
