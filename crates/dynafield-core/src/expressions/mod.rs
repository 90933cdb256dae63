//! Filter expressions over record columns
//!
//! A filter is a tree of [`ColumnFilter`] conditions joined by
//! [`LogicalFilter`]s. The same tree compiles to a parameterised SQL
//! `WHERE` fragment through [`SqlFilterBuilder`] or is evaluated directly
//! against JSON records with [`FilterExpression::matches`].
//!
//! ```rust
//! use dynafield_core::expressions::{and_, col, FilterExpression, SqlFilterBuilder};
//! use serde_json::json;
//!
//! let filter: FilterExpression = and_([col("age").ge(18), col("data").json("city").eq("Oslo")]).into();
//! let (sql, params) = SqlFilterBuilder::new().build(&filter).unwrap();
//! assert_eq!(sql, "(age >= %s) AND (data ->> 'city' = %s)");
//! assert_eq!(params, vec![json!(18), json!("Oslo")]);
//!
//! assert!(filter.matches(&json!({"age": 30, "data": {"city": "Oslo"}})).unwrap());
//! ```

mod builder;
mod eval;
mod sql;
mod types;

pub use builder::{and_, col, or_, ColumnFilterBuilder};
pub use sql::{PlaceholderStyle, SqlFilterBuilder};
pub use types::{ColumnFilter, FilterExpression, FilterOperator, LogicalFilter, LogicalOperator};

impl FilterExpression {
    /// SQL with `%s` placeholders
    pub fn to_sql(&self) -> crate::Result<(String, Vec<serde_json::Value>)> {
        SqlFilterBuilder::new().build(self)
    }
}
