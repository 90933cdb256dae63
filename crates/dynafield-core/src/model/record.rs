//! Validated records and their dump, merge and diff operations

use super::{coerce, DynamicModel};
use crate::error::{Error, Result};
use crate::fields::{parse_date, parse_datetime, EnumValue};
use crate::utils::{get_valid_uuid, recursive_diff};
use crate::validation::{ValidationContext, ValidationError, ValidationErrors};
use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Value held by one field of a record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    /// Normalised JSON for scalar, date, uuid, json and list fields
    Scalar(Value),
    Enum(EnumValue),
    /// Nested object field
    Record(Record),
}

impl FieldValue {
    pub(crate) fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            other => FieldValue::Scalar(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            FieldValue::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }

    /// JSON form under the given dump options
    pub fn to_json(&self, options: &DumpOptions) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::Enum(member) if options.enum_as_name => Value::String(member.name.clone()),
            FieldValue::Enum(member) => Value::String(member.value.clone()),
            FieldValue::Record(record) => record.dump(options),
        }
    }
}

/// Which fields `Record::dump` leaves out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Skip fields that were never explicitly provided
    pub exclude_unset: bool,
    /// Skip null fields
    pub exclude_none: bool,
    /// Emit enum members by name instead of value
    pub enum_as_name: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            exclude_unset: true,
            exclude_none: true,
            enum_as_name: false,
        }
    }
}

impl DumpOptions {
    /// Every field, nulls included
    pub fn full() -> Self {
        Self {
            exclude_unset: false,
            exclude_none: false,
            enum_as_name: false,
        }
    }
}

/// Which incoming fields `Record::merged_with` considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub exclude_unset: bool,
    pub exclude_none: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            exclude_unset: false,
            exclude_none: true,
        }
    }
}

/// A validated instance of a [`DynamicModel`]
#[derive(Debug, Clone)]
pub struct Record {
    model: DynamicModel,
    values: Vec<FieldValue>,
    fields_set: BTreeSet<String>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.model.name() == other.model.name() && self.values == other.values
    }
}

impl Record {
    pub(crate) fn from_parts(model: DynamicModel, values: Vec<FieldValue>, fields_set: BTreeSet<String>) -> Self {
        Self {
            model,
            values,
            fields_set,
        }
    }

    pub fn model(&self) -> &DynamicModel {
        &self.model
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.model.position(key).map(|index| &self.values[index])
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_json()?.as_str()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_json()?.as_i64()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_json()?.as_f64()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_json()?.as_bool()
    }

    pub fn get_date(&self, key: &str) -> Option<NaiveDate> {
        parse_date(self.get_str(key)?)
    }

    pub fn get_datetime(&self, key: &str) -> Option<DateTime<Utc>> {
        parse_datetime(self.get_str(key)?)
    }

    pub fn get_uuid(&self, key: &str) -> Option<Uuid> {
        get_valid_uuid(self.get_str(key)?)
    }

    pub fn get_enum(&self, key: &str) -> Option<&EnumValue> {
        self.get(key)?.as_enum()
    }

    pub fn get_record(&self, key: &str) -> Option<&Record> {
        self.get(key)?.as_record()
    }

    /// Keys that were provided explicitly (or assigned) rather than defaulted
    pub fn fields_set(&self) -> &BTreeSet<String> {
        &self.fields_set
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.fields_set.contains(key)
    }

    /// Fields in model order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.model.keys().zip(self.values.iter())
    }

    /// Assign one field, validating the value like record input
    pub fn set(&mut self, key: &str, value: &Value) -> std::result::Result<(), ValidationErrors> {
        let context = ValidationContext::default().child(key);
        let Some(index) = self.model.position(key) else {
            return Err(ValidationError::new(context.path, "Object has no attribute").into());
        };
        let field = &self.model.fields()[index];
        let next = match value {
            Value::Null if field.required => {
                return Err(ValidationError::new(
                    context.path,
                    format!("Input should be a valid {}", field.kind.type_name()),
                )
                .into())
            }
            Value::Null => FieldValue::Null,
            raw => coerce::coerce_value(field, raw, &context)?,
        };
        self.values[index] = next;
        self.fields_set.insert(key.to_string());
        Ok(())
    }

    /// JSON object view of the record
    pub fn dump(&self, options: &DumpOptions) -> Value {
        let mut map = Map::new();
        for (key, value) in self.iter() {
            if options.exclude_unset && !self.is_set(key) {
                continue;
            }
            if options.exclude_none && value.is_null() {
                continue;
            }
            map.insert(key.to_string(), value.to_json(options));
        }
        Value::Object(map)
    }

    /// Every field, nulls and defaults included
    pub fn to_value(&self) -> Value {
        self.dump(&DumpOptions::full())
    }

    pub fn into_value(self) -> Value {
        self.to_value()
    }

    /// A copy of `self` with `other`'s fields merged in
    ///
    /// Incoming null keeps the current value, two JSON objects are unioned,
    /// nested records merge recursively over their explicitly set fields,
    /// two lists append the incoming items not already present. Anything
    /// else is replaced.
    pub fn merged_with(&self, other: &Record, options: MergeOptions) -> Result<Record> {
        if !self.model.is_same_model(&other.model) {
            return Err(Error::ModelMismatch {
                current: self.model.name().to_string(),
                incoming: other.model.name().to_string(),
            });
        }

        let mut result = self.clone();
        for (index, key) in self.model.keys().enumerate() {
            if options.exclude_unset && !other.is_set(key) {
                continue;
            }
            let incoming = &other.values[index];
            if options.exclude_none && incoming.is_null() {
                continue;
            }
            let merged = merge_value(&result.values[index], incoming)?;
            result.values[index] = merged;
            result.fields_set.insert(key.to_string());
        }
        Ok(result)
    }

    /// Merge `other` into `self` in place
    pub fn update_from(&mut self, other: &Record, options: MergeOptions) -> Result<&mut Self> {
        *self = self.merged_with(other, options)?;
        Ok(self)
    }

    /// Fields of `other` that differ from `self`; removed keys map to null
    pub fn diff(&self, other: &Record) -> Map<String, Value> {
        let (Value::Object(old), Value::Object(new)) = (self.to_value(), other.to_value()) else {
            return Map::new();
        };
        recursive_diff(&old, &new, &[])
    }
}

fn merge_value(current: &FieldValue, incoming: &FieldValue) -> Result<FieldValue> {
    let merged = match (current, incoming) {
        (_, FieldValue::Null) => current.clone(),
        (FieldValue::Scalar(Value::Object(a)), FieldValue::Scalar(Value::Object(b))) => {
            let mut union = a.clone();
            union.extend(b.iter().map(|(k, v)| (k.clone(), v.clone())));
            FieldValue::Scalar(Value::Object(union))
        }
        (FieldValue::Record(a), FieldValue::Record(b)) => FieldValue::Record(a.merged_with(
            b,
            MergeOptions {
                exclude_unset: true,
                exclude_none: true,
            },
        )?),
        (FieldValue::Scalar(Value::Array(a)), FieldValue::Scalar(Value::Array(b))) => {
            let mut items = a.clone();
            for item in b {
                if !items.contains(item) {
                    items.push(item.clone());
                }
            }
            FieldValue::Scalar(Value::Array(items))
        }
        _ => incoming.clone(),
    };
    Ok(merged)
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.dump(&DumpOptions {
            exclude_unset: false,
            ..DumpOptions::default()
        })
        .serialize(serializer)
    }
}
