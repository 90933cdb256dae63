//! Property-based tests for filter expressions
//!
//! The SQL builder and the in-memory evaluator must agree on structure:
//! one bound parameter per scalar value and balanced parentheses, while
//! evaluation follows ordinary comparison semantics.

use dynafield_core::expressions::{and_, col, or_, FilterExpression, PlaceholderStyle, SqlFilterBuilder};
use proptest::prelude::*;
use serde_json::json;

fn column_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,12}"
}

proptest! {
    #[test]
    fn prop_comparisons_bind_one_param(column in column_strategy(), value in any::<i64>()) {
        let filters: Vec<FilterExpression> = vec![
            col(&column).eq(value).into(),
            col(&column).ge(value).into(),
            col(&column).lt(value).into(),
        ];
        for filter in filters {
            let (sql, params) = SqlFilterBuilder::new().build(&filter).unwrap();
            prop_assert!(sql.starts_with(&column));
            prop_assert_eq!(params, vec![json!(value)]);
        }
    }

    #[test]
    fn prop_in_expands_per_item(column in column_strategy(), items in prop::collection::vec(any::<i32>(), 1..8)) {
        let filter: FilterExpression = col(&column).in_(items.clone()).into();
        let (sql, params) = SqlFilterBuilder::new().build(&filter).unwrap();
        prop_assert_eq!(sql.matches("%s").count(), items.len());
        prop_assert_eq!(params.len(), items.len());
    }

    #[test]
    fn prop_numbered_placeholders_are_sequential(values in prop::collection::vec(any::<i64>(), 1..6)) {
        let conditions: Vec<FilterExpression> = values.iter().map(|v| col("n").ne(*v).into()).collect();
        let filter: FilterExpression = or_(conditions).into();
        let (sql, params) = SqlFilterBuilder::with_style(PlaceholderStyle::Numbered).build(&filter).unwrap();
        for index in 1..=values.len() {
            let placeholder = format!("${}", index);
            prop_assert!(sql.contains(&placeholder));
        }
        prop_assert_eq!(params.len(), values.len());
        prop_assert_eq!(sql.matches('(').count(), sql.matches(')').count());
    }

    #[test]
    fn prop_eval_matches_integer_ordering(threshold in -1000i64..1000, age in -1000i64..1000) {
        let record = json!({"age": age});
        let filter: FilterExpression = and_([col("age").ge(threshold), col("age").le(threshold + 10)]).into();
        let expected = age >= threshold && age <= threshold + 10;
        prop_assert_eq!(filter.matches(&record).unwrap(), expected);
    }

    #[test]
    fn prop_invalid_columns_are_rejected(column in "[a-z]{1,5}[ ;'-][a-z]{1,5}") {
        let filter: FilterExpression = col(&column).eq(1).into();
        prop_assert!(SqlFilterBuilder::new().build(&filter).is_err());
    }
}
