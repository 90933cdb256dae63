//! SQL `WHERE` fragments from filter expressions

use super::types::{ColumnFilter, FilterExpression, FilterOperator, LogicalFilter, LogicalOperator};
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static COLUMN_PATTERN: OnceLock<Regex> = OnceLock::new();
static PATH_SEGMENT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn column_pattern() -> &'static Regex {
    COLUMN_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("column pattern is valid")
    })
}

fn path_segment_pattern() -> &'static Regex {
    PATH_SEGMENT_PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("path segment pattern is valid"))
}

/// How bind parameters are written into the SQL text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `%s` (psycopg style)
    #[default]
    Format,
    /// `$1`, `$2`, … (PostgreSQL native)
    Numbered,
}

/// Compiles filter trees into parameterised SQL
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFilterBuilder {
    style: PlaceholderStyle,
}

impl SqlFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: PlaceholderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// SQL text and its bind parameters, in placeholder order
    pub fn build(&self, expression: &FilterExpression) -> Result<(String, Vec<Value>)> {
        let mut writer = SqlWriter {
            style: self.style,
            params: Vec::new(),
        };
        let sql = writer.expression(expression)?;
        tracing::trace!(sql = %sql, params = writer.params.len(), "compiled filter");
        Ok((sql, writer.params))
    }
}

struct SqlWriter {
    style: PlaceholderStyle,
    params: Vec<Value>,
}

impl SqlWriter {
    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        match self.style {
            PlaceholderStyle::Format => "%s".to_string(),
            PlaceholderStyle::Numbered => format!("${}", self.params.len()),
        }
    }

    fn expression(&mut self, expression: &FilterExpression) -> Result<String> {
        match expression {
            FilterExpression::Column(filter) => self.column(filter),
            FilterExpression::Logical(filter) => self.logical(filter),
        }
    }

    fn logical(&mut self, filter: &LogicalFilter) -> Result<String> {
        if filter.conditions.is_empty() {
            return Err(Error::filter("logical filter needs at least one condition"));
        }
        let parts = filter
            .conditions
            .iter()
            .map(|condition| self.expression(condition).map(|sql| format!("({sql})")))
            .collect::<Result<Vec<_>>>()?;
        let joiner = match filter.operator {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        };
        Ok(parts.join(joiner))
    }

    fn column(&mut self, filter: &ColumnFilter) -> Result<String> {
        let column = column_reference(filter)?;

        if filter.operator.is_list_operation() {
            if !filter.value.is_array() {
                return Err(Error::filter(format!(
                    "{} requires a list value, got {}",
                    filter.operator, filter.value
                )));
            }
            let placeholder = self.bind(filter.value.clone());
            return Ok(match filter.operator {
                FilterOperator::AnyIn | FilterOperator::ListOverlap => format!("{column} && {placeholder}::text[]"),
                FilterOperator::AllIn | FilterOperator::ListContains => format!("{column} @> {placeholder}::text[]"),
                _ => format!("NOT ({column} && {placeholder}::text[])"),
            });
        }

        let value = &filter.value;
        let sql = match filter.operator {
            FilterOperator::Eq => format!("{column} = {}", self.bind(value.clone())),
            FilterOperator::Ne => format!("{column} != {}", self.bind(value.clone())),
            FilterOperator::Gt => format!("{column} > {}", self.bind(value.clone())),
            FilterOperator::Lt => format!("{column} < {}", self.bind(value.clone())),
            FilterOperator::Ge => format!("{column} >= {}", self.bind(value.clone())),
            FilterOperator::Le => format!("{column} <= {}", self.bind(value.clone())),
            FilterOperator::Contains => {
                let pattern = format!("%{}%", like_operand(filter)?);
                format!("{column} LIKE {}", self.bind(Value::String(pattern)))
            }
            FilterOperator::NotContains => {
                let pattern = format!("%{}%", like_operand(filter)?);
                format!("{column} NOT LIKE {}", self.bind(Value::String(pattern)))
            }
            FilterOperator::StartsWith => {
                let pattern = format!("{}%", like_operand(filter)?);
                format!("{column} LIKE {}", self.bind(Value::String(pattern)))
            }
            FilterOperator::EndsWith => {
                let pattern = format!("%{}", like_operand(filter)?);
                format!("{column} LIKE {}", self.bind(Value::String(pattern)))
            }
            FilterOperator::Ilike => format!("{column} ILIKE {}", self.bind(Value::String(like_operand(filter)?))),
            FilterOperator::NotIlike => {
                format!("{column} NOT ILIKE {}", self.bind(Value::String(like_operand(filter)?)))
            }
            FilterOperator::In | FilterOperator::NotIn => {
                let items = in_items(filter);
                let negated = filter.operator == FilterOperator::NotIn;
                if items.is_empty() {
                    // IN () is a syntax error; the empty set matches nothing
                    return Ok(if negated { "TRUE" } else { "FALSE" }.to_string());
                }
                let placeholders: Vec<String> = items.into_iter().map(|item| self.bind(item)).collect();
                let keyword = if negated { "NOT IN" } else { "IN" };
                format!("{column} {keyword} ({})", placeholders.join(", "))
            }
            FilterOperator::IsNull => format!("{column} IS NULL"),
            FilterOperator::IsNotNull => format!("{column} IS NOT NULL"),
            FilterOperator::HasKey => match value {
                Value::String(_) => format!("{column} ? {}", self.bind(value.clone())),
                other => return Err(Error::filter(format!("HAS_KEY requires a string key, got {other}"))),
            },
            list_operator => return Err(Error::filter(format!("unsupported operator {list_operator}"))),
        };
        Ok(sql)
    }
}

/// `col`, `col ->> 'a'` or `col #> '{a,b}'` with every identifier checked
fn column_reference(filter: &ColumnFilter) -> Result<String> {
    if !column_pattern().is_match(&filter.column) {
        return Err(Error::filter(format!("invalid column name '{}'", filter.column)));
    }
    let segments = filter.path_segments();
    if let Some(bad) = segments.iter().find(|s| !path_segment_pattern().is_match(s)) {
        return Err(Error::filter(format!("invalid JSON path segment '{bad}'")));
    }
    Ok(match segments.as_slice() {
        [] => filter.column.clone(),
        [key] => format!("{} ->> '{key}'", filter.column),
        path => format!("{} #> '{{{}}}'", filter.column, path.join(",")),
    })
}

fn like_operand(filter: &ColumnFilter) -> Result<String> {
    match &filter.value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::filter(format!("{} requires a scalar value, got {other}", filter.operator))),
    }
}

/// A scalar IN value is treated as a one-element list
pub(super) fn in_items(filter: &ColumnFilter) -> Vec<Value> {
    match &filter.value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        scalar => vec![scalar.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::{and_, col, or_};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn build(expression: impl Into<FilterExpression>) -> (String, Vec<Value>) {
        SqlFilterBuilder::new().build(&expression.into()).unwrap()
    }

    #[test]
    fn test_column_references() {
        assert_eq!(build(col("age").ge(18)), ("age >= %s".to_string(), vec![json!(18)]));
        assert_eq!(build(col("data").json("city").eq("Oslo")).0, "data ->> 'city' = %s");
        assert_eq!(build(col("data").json("user.address.city").eq("Oslo")).0, "data #> '{user,address,city}' = %s");
        assert_eq!(build(col("t.name").is_null()), ("t.name IS NULL".to_string(), vec![]));
    }

    #[test]
    fn test_like_patterns() {
        assert_eq!(build(col("name").contains("ad")).1, vec![json!("%ad%")]);
        assert_eq!(build(col("name").starts_with("ad")).1, vec![json!("ad%")]);
        assert_eq!(build(col("name").ends_with("ad")).1, vec![json!("%ad")]);
        assert_eq!(build(col("name").not_contains("x")).0, "name NOT LIKE %s");
        assert_eq!(build(col("name").ilike("a_%")), ("name ILIKE %s".to_string(), vec![json!("a_%")]));
    }

    #[test]
    fn test_in_and_list_operators() {
        assert_eq!(
            build(col("status").in_(["a", "b"])),
            ("status IN (%s, %s)".to_string(), vec![json!("a"), json!("b")])
        );
        assert_eq!(build(col("status").in_(Vec::<String>::new())).0, "FALSE");
        assert_eq!(build(col("status").not_in(Vec::<String>::new())).0, "TRUE");
        assert_eq!(
            build(col("tags").any_in(["x", "y"])),
            ("tags && %s::text[]".to_string(), vec![json!(["x", "y"])])
        );
        assert_eq!(build(col("tags").all_in(["x"])).0, "tags @> %s::text[]");
        assert_eq!(build(col("tags").none_in(["x"])).0, "NOT (tags && %s::text[])");
        assert_eq!(build(col("meta").has_key("k")).0, "meta ? %s");
    }

    #[test]
    fn test_logical_and_numbered() {
        let expression: FilterExpression = or_::<_, FilterExpression>([
            and_([col("a").eq(1), col("b").ne(2)]).into(),
            col("c").in_([3, 4]).into(),
        ])
        .into();
        let (sql, params) = SqlFilterBuilder::with_style(PlaceholderStyle::Numbered).build(&expression).unwrap();
        assert_eq!(sql, "((a = $1) AND (b != $2)) OR (c IN ($3, $4))");
        assert_eq!(params, vec![json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_rejects_unsafe_or_malformed_input() {
        let builder = SqlFilterBuilder::new();
        assert!(builder.build(&col("name; DROP TABLE x").eq(1).into()).is_err());
        assert!(builder.build(&col("data").json("a'b").eq(1).into()).is_err());
        assert!(builder.build(&col("tags").ge(1).into()).is_ok());
        let mut bad = col("tags").any_in(["x"]);
        bad.value = json!("x");
        assert!(builder.build(&bad.into()).is_err());
        assert!(builder.build(&and_(Vec::<FilterExpression>::new()).into()).is_err());
    }
}
