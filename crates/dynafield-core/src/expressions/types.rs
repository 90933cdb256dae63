//! Filter expression tree

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Ilike,
    NotIlike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    HasKey,
    /// Any query value is in the column list
    AnyIn,
    /// Every query value is in the column list
    AllIn,
    /// No query value is in the column list
    NoneIn,
    /// Column list contains every query value
    ListContains,
    /// Column list shares at least one value with the query list
    ListOverlap,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "EQ",
            FilterOperator::Ne => "NE",
            FilterOperator::Gt => "GT",
            FilterOperator::Lt => "LT",
            FilterOperator::Ge => "GE",
            FilterOperator::Le => "LE",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::NotContains => "NOT_CONTAINS",
            FilterOperator::StartsWith => "STARTS_WITH",
            FilterOperator::EndsWith => "ENDS_WITH",
            FilterOperator::Ilike => "ILIKE",
            FilterOperator::NotIlike => "NOT_ILIKE",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT_IN",
            FilterOperator::IsNull => "IS_NULL",
            FilterOperator::IsNotNull => "IS_NOT_NULL",
            FilterOperator::HasKey => "HAS_KEY",
            FilterOperator::AnyIn => "ANY_IN",
            FilterOperator::AllIn => "ALL_IN",
            FilterOperator::NoneIn => "NONE_IN",
            FilterOperator::ListContains => "LIST_CONTAINS",
            FilterOperator::ListOverlap => "LIST_OVERLAP",
        }
    }

    /// Operators comparing a list column against a list value
    pub fn is_list_operation(self) -> bool {
        matches!(
            self,
            FilterOperator::AnyIn
                | FilterOperator::AllIn
                | FilterOperator::NoneIn
                | FilterOperator::ListContains
                | FilterOperator::ListOverlap
        )
    }

    /// Operators that ignore the filter value
    pub fn is_unary(self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

/// One condition on a column, optionally inside a JSON column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    /// Dotted path into a JSON column, e.g. `user.address.city`
    #[serde(default, alias = "jsonPath", skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
}

impl ColumnFilter {
    /// Path segments of `json_path`, empty when unset
    pub fn path_segments(&self) -> Vec<&str> {
        self.json_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| path.split('.').collect())
            .unwrap_or_default()
    }
}

/// Conditions joined by AND or OR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalFilter {
    pub operator: LogicalOperator,
    pub conditions: Vec<FilterExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterExpression {
    Logical(LogicalFilter),
    Column(ColumnFilter),
}

impl From<ColumnFilter> for FilterExpression {
    fn from(filter: ColumnFilter) -> Self {
        FilterExpression::Column(filter)
    }
}

impl From<LogicalFilter> for FilterExpression {
    fn from(filter: LogicalFilter) -> Self {
        FilterExpression::Logical(filter)
    }
}
