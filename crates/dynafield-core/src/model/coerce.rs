//! Per-kind value checks applied while validating record input

use super::{DynamicModel, FieldValue, Record};
use crate::fields::{format_datetime, is_valid_email, parse_date, parse_datetime, CompiledField, EnumSpec, ValueKind};
use crate::utils::get_valid_uuid;
use crate::validation::{ValidationContext, ValidationError, ValidationErrors, ValidationMode};
use chrono::DateTime;
use serde_json::{Number, Value};
use std::collections::BTreeSet;
use tracing::trace;

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Value a field takes when its key is absent
pub(crate) fn default_value(field: &CompiledField) -> FieldValue {
    match (&field.default, &field.kind) {
        (Some(Value::String(raw)), ValueKind::Enum(spec)) => spec
            .lookup(raw)
            .cloned()
            .map(FieldValue::Enum)
            .unwrap_or(FieldValue::Null),
        (Some(default), _) => FieldValue::from_json(default.clone()),
        (None, _) => FieldValue::Null,
    }
}

/// Validate `input` against `model`, appending problems to `errors`
///
/// Returns `None` when `input` is not an object, or when any field failed
/// and `safe` is off. With `safe` on, failing fields become null and are
/// still reported through `errors`.
pub(crate) fn validate_object(
    model: &DynamicModel,
    input: &Value,
    context: &ValidationContext,
    safe: bool,
    errors: &mut ValidationErrors,
) -> Option<Record> {
    let Some(map) = input.as_object() else {
        errors.add(ValidationError::rule(
            &context.path,
            "Input should be a valid dictionary or object",
            "type",
            "object",
            json_type_name(input),
        ));
        return None;
    };

    let before = errors.len();
    let mut values = Vec::with_capacity(model.fields().len());
    let mut fields_set = BTreeSet::new();

    for field in model.fields() {
        let child = context.child(&field.key);
        let outcome = match map.get(&field.key) {
            None if field.required => Err(ValidationErrors::from(ValidationError::rule(
                &child.path,
                "Field required",
                "required",
                "a value",
                "missing",
            ))),
            None => {
                values.push(default_value(field));
                continue;
            }
            Some(Value::Null) if field.required => Err(ValidationErrors::from(ValidationError::rule(
                &child.path,
                format!("Input should be a valid {}", field.kind.type_name()),
                "required",
                "a value",
                "null",
            ))),
            Some(Value::Null) => Ok(FieldValue::Null),
            Some(raw) => coerce_value(field, raw, &child),
        };

        match outcome {
            Ok(value) => values.push(value),
            Err(field_errors) => {
                trace!(path = %child.path, "field failed validation");
                errors.extend(field_errors);
                values.push(FieldValue::Null);
            }
        }
        fields_set.insert(field.key.clone());
    }

    for key in map.keys().filter(|key| model.field(key).is_none()) {
        let path = context.child(key).path;
        if context.mode == ValidationMode::Strict && !safe {
            errors.add(DynamicModel::unknown_key_error(&path));
        } else {
            trace!(path = %path, "dropping unknown key");
        }
    }

    if errors.len() > before && !safe {
        return None;
    }
    Some(Record::from_parts(model.clone(), values, fields_set))
}

/// Check and normalise one present, non-null value
pub(crate) fn coerce_value(
    field: &CompiledField,
    raw: &Value,
    context: &ValidationContext,
) -> Result<FieldValue, ValidationErrors> {
    let path = context.path.as_str();
    let type_error = |message: &str| {
        ValidationErrors::from(ValidationError::rule(
            path,
            message,
            "type",
            field.kind.type_name(),
            json_type_name(raw),
        ))
    };

    match &field.kind {
        ValueKind::Str { min_length, max_length } => {
            let Value::String(text) = raw else {
                return Err(type_error("Input should be a valid string"));
            };
            let length = text.chars().count();
            if let Some(min) = min_length.filter(|min| length < *min) {
                return Err(bound_error(path, format!("String should have at least {min} characters"), "min_length", min, length));
            }
            if let Some(max) = max_length.filter(|max| length > *max) {
                return Err(bound_error(path, format!("String should have at most {max} characters"), "max_length", max, length));
            }
            Ok(FieldValue::Scalar(raw.clone()))
        }
        ValueKind::Int { ge, le } => {
            let value = as_integer(raw).ok_or_else(|| type_error("Input should be a valid integer"))?;
            if let Some(ge) = ge.filter(|ge| value < *ge) {
                return Err(bound_error(path, format!("Input should be greater than or equal to {ge}"), "ge", ge, value));
            }
            if let Some(le) = le.filter(|le| value > *le) {
                return Err(bound_error(path, format!("Input should be less than or equal to {le}"), "le", le, value));
            }
            Ok(FieldValue::Scalar(Value::from(value)))
        }
        ValueKind::Float { ge, le } => {
            let value = as_float(raw).ok_or_else(|| type_error("Input should be a valid number"))?;
            if let Some(ge) = ge.filter(|ge| value < *ge) {
                return Err(bound_error(path, format!("Input should be greater than or equal to {ge}"), "ge", ge, value));
            }
            if let Some(le) = le.filter(|le| value > *le) {
                return Err(bound_error(path, format!("Input should be less than or equal to {le}"), "le", le, value));
            }
            let number = Number::from_f64(value).ok_or_else(|| type_error("Input should be a finite number"))?;
            Ok(FieldValue::Scalar(Value::Number(number)))
        }
        ValueKind::Bool => as_bool(raw)
            .map(|b| FieldValue::Scalar(Value::Bool(b)))
            .ok_or_else(|| type_error("Input should be a valid boolean")),
        ValueKind::Date => raw
            .as_str()
            .and_then(parse_date)
            .map(|date| FieldValue::Scalar(Value::String(date.format("%Y-%m-%d").to_string())))
            .ok_or_else(|| type_error("Input should be a valid date in the format YYYY-MM-DD")),
        ValueKind::DateTime => {
            let parsed = match raw {
                Value::String(text) => parse_datetime(text),
                Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
                _ => None,
            };
            parsed
                .map(|datetime| FieldValue::Scalar(Value::String(format_datetime(&datetime))))
                .ok_or_else(|| type_error("Input should be a valid datetime"))
        }
        ValueKind::Email => match raw.as_str().map(str::trim) {
            Some(text) if is_valid_email(text) => Ok(FieldValue::Scalar(Value::String(text.to_string()))),
            Some(_) => Err(ValidationErrors::from(ValidationError::rule(
                path,
                "value is not a valid email address",
                "format",
                "email",
                raw.to_string(),
            ))),
            None => Err(type_error("Input should be a valid string")),
        },
        ValueKind::Enum(spec) => raw
            .as_str()
            .and_then(|text| spec.lookup(text))
            .cloned()
            .map(FieldValue::Enum)
            .ok_or_else(|| enum_error(path, spec, raw)),
        ValueKind::Uuid => raw
            .as_str()
            .and_then(get_valid_uuid)
            .map(|uuid| FieldValue::Scalar(Value::String(uuid.to_string())))
            .ok_or_else(|| type_error("Input should be a valid UUID")),
        ValueKind::Json => match raw {
            Value::Object(_) => Ok(FieldValue::Scalar(raw.clone())),
            _ => Err(type_error("Input should be a valid dictionary")),
        },
        ValueKind::List => match raw {
            Value::Array(_) => Ok(FieldValue::Scalar(raw.clone())),
            _ => Err(type_error("Input should be a valid list")),
        },
        ValueKind::Object(nested) => {
            let mut nested_errors = ValidationErrors::new();
            match validate_object(nested, raw, context, false, &mut nested_errors) {
                Some(record) if nested_errors.is_empty() => Ok(FieldValue::Record(record)),
                _ => Err(nested_errors),
            }
        }
    }
}

fn bound_error(path: &str, message: String, rule: &str, bound: impl ToString, actual: impl ToString) -> ValidationErrors {
    ValidationErrors::from(ValidationError::rule(path, message, rule, &bound.to_string(), actual.to_string()))
}

fn enum_error(path: &str, spec: &EnumSpec, raw: &Value) -> ValidationErrors {
    let quoted: Vec<String> = spec.values.iter().map(|v| format!("'{}'", v.value)).collect();
    let expected = match quoted.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => String::new(),
    };
    ValidationErrors::from(ValidationError::rule(
        path,
        format!("Input should be {expected}"),
        "enum",
        &expected,
        raw.to_string(),
    ))
}

fn as_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
            "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&json!(3)), Some(3));
        assert_eq!(as_integer(&json!(3.0)), Some(3));
        assert_eq!(as_integer(&json!(3.5)), None);
        assert_eq!(as_integer(&json!(" 42 ")), Some(42));
        assert_eq!(as_integer(&json!(true)), None);
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(as_bool(&json!("TRUE")), Some(true));
        assert_eq!(as_bool(&json!("off")), Some(false));
        assert_eq!(as_bool(&json!(2)), None);
        assert_eq!(as_bool(&json!("maybe")), None);
    }

    #[test]
    fn test_enum_error_message() {
        let spec = EnumSpec {
            name: "StatusEnum".into(),
            values: vec![crate::fields::EnumValue::new("new"), crate::fields::EnumValue::new("active")],
        };
        let err = enum_error("$.status", &spec, &json!("gone"));
        assert_eq!(err.errors[0].message, "Input should be 'new' or 'active'");
    }
}
