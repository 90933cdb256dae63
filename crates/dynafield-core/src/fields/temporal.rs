//! Date and DateTime descriptors plus the lenient parsers records use

use super::{CompiledField, FieldCommon, ValueKind};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO calendar date (`2024-05-01`)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse RFC 3339, naive ISO datetimes (taken as UTC) or a bare date (midnight UTC)
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| parse_date(value).and_then(|date| date.and_hms_opt(0, 0, 0)))
        .map(|naive| naive.and_utc())
}

pub(crate) fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

mod lenient_datetime {
    use super::{format_datetime, parse_datetime};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(datetime) => serializer.serialize_str(&format_datetime(datetime)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|text| {
            parse_datetime(&text).ok_or_else(|| D::Error::custom(format!("invalid datetime '{text}'")))
        })
        .transpose()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_date", skip_serializing_if = "Option::is_none")]
    pub default_date: Option<NaiveDate>,
}

impl DateField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_date.is_some())?;
        Ok(CompiledField {
            key: self.common.label.to_lowercase(),
            label: self.common.label.clone(),
            kind: ValueKind::Date,
            required: self.common.required,
            default: self
                .default_date
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string())),
            description: self.common.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(
        default,
        alias = "default_datetime",
        with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_datetime: Option<DateTime<Utc>>,
}

impl DateTimeField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_datetime.is_some())?;
        Ok(CompiledField {
            key: self.common.label.to_lowercase(),
            label: self.common.label.clone(),
            kind: ValueKind::DateTime,
            required: self.common.required,
            default: self
                .default_datetime
                .as_ref()
                .map(|datetime| Value::String(format_datetime(datetime))),
            description: self.common.description.clone(),
        })
    }
}
