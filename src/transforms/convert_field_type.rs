//! `convertFieldType`: rewrite matching columns to a new logical type.
//!
//! Conversion never fails a stage: a cell that cannot be coerced becomes
//! `Null` so one bad row does not invalidate a column.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, FieldType, Frame, Value};

use super::{TransformOperator, frame_with_fields};

/// One conversion rule: which field, to which type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertFieldTypeConfig {
    /// Field to rewrite, matched by display name (raw name accepted too).
    pub target_field: String,
    pub destination_type: FieldType,
    /// chrono format string for to-time conversion of strings. Default
    /// parsing (RFC 3339, then `%Y-%m-%d %H:%M:%S`, then `%Y-%m-%d`) when
    /// unset.
    #[serde(default)]
    pub date_format: Option<String>,
}

/// Options for `convertFieldType`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertFieldTypeOptions {
    pub conversions: Vec<ConvertFieldTypeConfig>,
}

/// Build a `convertFieldType` operator.
pub fn operator(options: ConvertFieldTypeOptions) -> TransformResult<TransformOperator> {
    let conversions = options.conversions;
    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .map(|frame| {
                let fields = frame
                    .fields
                    .iter()
                    .map(|field| convert_field(field, &conversions))
                    .collect();
                frame_with_fields(&frame, fields)
            })
            .collect()
    }))
}

fn convert_field(field: &Field, conversions: &[ConvertFieldTypeConfig]) -> Field {
    let display = field.display_name();
    for conversion in conversions {
        if conversion.target_field != display && conversion.target_field != field.name {
            continue;
        }
        // Already the right type: nothing to rewrite.
        if field.field_type == conversion.destination_type {
            return field.clone();
        }
        let values = field
            .values
            .iter()
            .map(|v| convert_value(v, conversion.destination_type, conversion.date_format.as_deref()))
            .collect();
        return Field {
            name: field.name.clone(),
            field_type: conversion.destination_type,
            config: field.config.clone(),
            labels: field.labels.clone(),
            values,
        };
    }
    field.clone()
}

fn convert_value(value: &Value, destination: FieldType, date_format: Option<&str>) -> Value {
    match destination {
        FieldType::Time => match value {
            Value::Time(t) => Value::Time(*t),
            Value::Number(n) if n.is_finite() => Value::Time(*n as i64),
            Value::String(s) => parse_time(s, date_format).map(Value::Time).unwrap_or(Value::Null),
            _ => Value::Null,
        },
        FieldType::Number => match value.coerce_number() {
            Some(n) if n.is_finite() => Value::Number(n),
            _ => Value::Null,
        },
        FieldType::String => match value {
            Value::Null => Value::Null,
            other => Value::String(other.render()),
        },
        FieldType::Boolean => match value {
            Value::Null => Value::Bool(false),
            Value::Bool(b) => Value::Bool(*b),
            Value::Number(n) => Value::Bool(*n != 0.0 && !n.is_nan()),
            Value::Time(t) => Value::Bool(*t != 0),
            // Truthiness of a string is non-emptiness, so "false" is true.
            Value::String(s) => Value::Bool(!s.is_empty()),
        },
        FieldType::Other => value.clone(),
    }
}

/// Parse a timestamp string to epoch milliseconds. Empty strings and
/// unparseable inputs yield `None`.
fn parse_time(s: &str, format: Option<&str>) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(fmt) = format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
        }
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    None
}
