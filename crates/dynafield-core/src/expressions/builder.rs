//! Fluent constructors for filter expressions

use super::types::{ColumnFilter, FilterExpression, FilterOperator, LogicalFilter, LogicalOperator};
use serde_json::Value;

/// Start a filter on `column`
pub fn col(column: impl Into<String>) -> ColumnFilterBuilder {
    ColumnFilterBuilder {
        column: column.into(),
        json_path: None,
    }
}

pub fn and_<I, E>(conditions: I) -> LogicalFilter
where
    I: IntoIterator<Item = E>,
    E: Into<FilterExpression>,
{
    LogicalFilter {
        operator: LogicalOperator::And,
        conditions: conditions.into_iter().map(Into::into).collect(),
    }
}

pub fn or_<I, E>(conditions: I) -> LogicalFilter
where
    I: IntoIterator<Item = E>,
    E: Into<FilterExpression>,
{
    LogicalFilter {
        operator: LogicalOperator::Or,
        conditions: conditions.into_iter().map(Into::into).collect(),
    }
}

#[derive(Debug, Clone)]
pub struct ColumnFilterBuilder {
    column: String,
    json_path: Option<String>,
}

macro_rules! value_ops {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(self, value: impl Into<Value>) -> ColumnFilter {
                self.build(FilterOperator::$op, value.into())
            }
        )*
    };
}

macro_rules! list_ops {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<I, V>(self, values: I) -> ColumnFilter
            where
                I: IntoIterator<Item = V>,
                V: Into<Value>,
            {
                self.build(
                    FilterOperator::$op,
                    Value::Array(values.into_iter().map(Into::into).collect()),
                )
            }
        )*
    };
}

impl ColumnFilterBuilder {
    /// Address a nested key of a JSON column, e.g. `user.address.city`
    pub fn json(mut self, path: impl Into<String>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    fn build(self, operator: FilterOperator, value: Value) -> ColumnFilter {
        ColumnFilter {
            column: self.column,
            operator,
            value,
            json_path: self.json_path,
        }
    }

    value_ops! {
        eq => Eq,
        ne => Ne,
        gt => Gt,
        lt => Lt,
        ge => Ge,
        le => Le,
        contains => Contains,
        not_contains => NotContains,
        starts_with => StartsWith,
        ends_with => EndsWith,
        /// Case-insensitive LIKE pattern with `%` and `_` wildcards
        ilike => Ilike,
        not_ilike => NotIlike,
        /// JSON column has the given key
        has_key => HasKey,
    }

    list_ops! {
        in_ => In,
        not_in => NotIn,
        any_in => AnyIn,
        all_in => AllIn,
        none_in => NoneIn,
        list_contains => ListContains,
        /// Same as `any_in`
        list_overlap => ListOverlap,
    }

    pub fn is_null(self) -> ColumnFilter {
        self.build(FilterOperator::IsNull, Value::Null)
    }

    pub fn is_not_null(self) -> ColumnFilter {
        self.build(FilterOperator::IsNotNull, Value::Null)
    }
}
