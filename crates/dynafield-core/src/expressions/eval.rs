//! In-memory evaluation of filter expressions over JSON records

use super::sql::in_items;
use super::types::{ColumnFilter, FilterExpression, FilterOperator, LogicalOperator};
use crate::error::{Error, Result};
use crate::model::Record;
use regex::RegexBuilder;
use serde_json::Value;
use std::cmp::Ordering;

impl FilterExpression {
    /// Whether `record` (a JSON object) satisfies the expression
    ///
    /// Comparisons against a missing or null column are false, as in SQL.
    pub fn matches(&self, record: &Value) -> Result<bool> {
        match self {
            FilterExpression::Column(filter) => filter.matches(record),
            FilterExpression::Logical(logical) => {
                for condition in &logical.conditions {
                    let hit = condition.matches(record)?;
                    match logical.operator {
                        LogicalOperator::And if !hit => return Ok(false),
                        LogicalOperator::Or if hit => return Ok(true),
                        _ => {}
                    }
                }
                Ok(logical.operator == LogicalOperator::And)
            }
        }
    }

    pub fn matches_record(&self, record: &Record) -> Result<bool> {
        self.matches(&record.to_value())
    }

    /// The subset of `records` the expression accepts, order preserved
    pub fn filter<'a>(&self, records: &'a [Value]) -> Result<Vec<&'a Value>> {
        let mut kept = Vec::new();
        for record in records {
            if self.matches(record)? {
                kept.push(record);
            }
        }
        Ok(kept)
    }
}

impl ColumnFilter {
    fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record.get(&self.column)?;
        for segment in self.path_segments() {
            current = current.get(segment)?;
        }
        Some(current).filter(|v| !v.is_null())
    }

    pub fn matches(&self, record: &Value) -> Result<bool> {
        let actual = self.resolve(record);
        let expected = &self.value;

        if self.operator.is_list_operation() {
            let Value::Array(wanted) = expected else {
                return Err(Error::filter(format!("{} requires a list value, got {expected}", self.operator)));
            };
            let Some(Value::Array(have)) = actual else {
                return Ok(false);
            };
            let contains = |item: &Value| have.iter().any(|h| values_equal(h, item));
            return Ok(match self.operator {
                FilterOperator::AnyIn | FilterOperator::ListOverlap => wanted.iter().any(contains),
                FilterOperator::AllIn | FilterOperator::ListContains => wanted.iter().all(contains),
                _ => !wanted.iter().any(contains),
            });
        }

        match self.operator {
            FilterOperator::IsNull => return Ok(actual.is_none()),
            FilterOperator::IsNotNull => return Ok(actual.is_some()),
            _ => {}
        }
        let Some(actual) = actual else {
            return Ok(false);
        };

        let result = match self.operator {
            FilterOperator::Eq => !expected.is_null() && values_equal(actual, expected),
            FilterOperator::Ne => !expected.is_null() && !values_equal(actual, expected),
            FilterOperator::Gt => compare(actual, expected) == Some(Ordering::Greater),
            FilterOperator::Lt => compare(actual, expected) == Some(Ordering::Less),
            FilterOperator::Ge => matches!(compare(actual, expected), Some(Ordering::Greater | Ordering::Equal)),
            FilterOperator::Le => matches!(compare(actual, expected), Some(Ordering::Less | Ordering::Equal)),
            FilterOperator::Contains => text_test(actual, expected, |a, e| a.contains(e)),
            FilterOperator::NotContains => actual.is_string() && !text_test(actual, expected, |a, e| a.contains(e)),
            FilterOperator::StartsWith => text_test(actual, expected, |a, e| a.starts_with(e)),
            FilterOperator::EndsWith => text_test(actual, expected, |a, e| a.ends_with(e)),
            FilterOperator::Ilike => ilike(actual, expected)?,
            FilterOperator::NotIlike => actual.is_string() && !ilike(actual, expected)?,
            FilterOperator::In => in_items(self).iter().any(|item| values_equal(actual, item)),
            FilterOperator::NotIn => !in_items(self).iter().any(|item| values_equal(actual, item)),
            FilterOperator::HasKey => match (actual, expected) {
                (Value::Object(map), Value::String(key)) => map.contains_key(key),
                _ => false,
            },
            other => return Err(Error::filter(format!("unsupported operator {other}"))),
        };
        Ok(result)
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn operand_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_test(actual: &Value, expected: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), operand_text(expected)) {
        (Some(actual), Some(expected)) => test(actual, &expected),
        _ => false,
    }
}

/// SQL ILIKE: `%` is any run, `_` any single character, case-insensitive
fn ilike(actual: &Value, pattern: &Value) -> Result<bool> {
    let (Some(actual), Some(pattern)) = (actual.as_str(), operand_text(pattern)) else {
        return Ok(false);
    };
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');
    let compiled = RegexBuilder::new(&regex)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| Error::filter(format!("invalid ILIKE pattern '{pattern}': {e}")))?;
    Ok(compiled.is_match(actual))
}
