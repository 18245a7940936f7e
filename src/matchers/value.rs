//! Value matchers: per-row predicates used by `filterByValue`.
//!
//! Unlike field/frame matchers, a resolved value matcher carries an
//! applicability check: numeric comparators only apply to number fields and
//! never match values without a numeric view.

use serde::Deserialize;
use serde_json::json;

use crate::error::{TransformError, TransformResult};
use crate::frame::{Field, FieldType, Value};

use super::{MatcherConfig, compile_regex, parse_options};

/// Which fields a value matcher can meaningfully be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applicability {
    /// Any field type.
    Any,
    /// Number fields only.
    Numeric,
}

/// A resolved per-row predicate plus its applicability check.
pub struct ValueMatcher {
    applicability: Applicability,
    predicate: Box<dyn Fn(usize, &Field) -> bool + Send + Sync>,
}

impl ValueMatcher {
    /// Whether this matcher can meaningfully evaluate rows of `field`.
    pub fn is_applicable(&self, field: &Field) -> bool {
        match self.applicability {
            Applicability::Any => true,
            Applicability::Numeric => field.field_type == FieldType::Number,
        }
    }

    /// Evaluate row `row` of `field`.
    pub fn matches(&self, row: usize, field: &Field) -> bool {
        (self.predicate)(row, field)
    }
}

#[derive(Debug, Deserialize)]
struct EqualOptions {
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ThresholdOptions {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RangeOptions {
    from: f64,
    to: f64,
}

#[derive(Debug, Deserialize)]
struct RegexOptions {
    value: String,
}

pub(crate) fn resolve_value_matcher(config: &MatcherConfig) -> TransformResult<ValueMatcher> {
    let id = config.id.as_str();
    match id {
        "isNull" => Ok(any(|row, field| field.values[row].is_null())),
        "isNotNull" => Ok(any(|row, field| !field.values[row].is_null())),
        "equal" => {
            let opts: EqualOptions = parse_options(id, &config.options)?;
            let wanted = Value::from_json(&opts.value);
            Ok(any(move |row, field| field.values[row].loose_eq(&wanted)))
        }
        "notEqual" => {
            let opts: EqualOptions = parse_options(id, &config.options)?;
            let wanted = Value::from_json(&opts.value);
            Ok(any(move |row, field| !field.values[row].loose_eq(&wanted)))
        }
        "greater" => numeric_threshold(id, &config.options, |v, t| v > t),
        "greaterOrEqual" => numeric_threshold(id, &config.options, |v, t| v >= t),
        "lower" => numeric_threshold(id, &config.options, |v, t| v < t),
        "lowerOrEqual" => numeric_threshold(id, &config.options, |v, t| v <= t),
        "between" => {
            let opts: RangeOptions = parse_options(id, &config.options)?;
            Ok(numeric(move |row, field| {
                field.values[row]
                    .as_number()
                    .is_some_and(|v| v > opts.from && v < opts.to)
            }))
        }
        "regex" => {
            let opts: RegexOptions = parse_options(id, &config.options)?;
            let re = compile_regex(&opts.value)?;
            Ok(any(move |row, field| re.is_match(&field.values[row].render())))
        }
        _ => Err(TransformError::UnknownValueMatcher { id: id.to_string() }),
    }
}

/// Default options payload for a value matcher id, used by hosts building
/// editor UIs on top of the catalogue. `None` for ids without options.
pub fn value_matcher_default_options(id: &str) -> Option<serde_json::Value> {
    match id {
        "equal" | "notEqual" => Some(json!({ "value": "" })),
        "greater" | "greaterOrEqual" | "lower" | "lowerOrEqual" => Some(json!({ "value": 0 })),
        "between" => Some(json!({ "from": 0, "to": 100 })),
        "regex" => Some(json!({ "value": ".*" })),
        _ => None,
    }
}

fn any(predicate: impl Fn(usize, &Field) -> bool + Send + Sync + 'static) -> ValueMatcher {
    ValueMatcher {
        applicability: Applicability::Any,
        predicate: Box::new(predicate),
    }
}

fn numeric(predicate: impl Fn(usize, &Field) -> bool + Send + Sync + 'static) -> ValueMatcher {
    ValueMatcher {
        applicability: Applicability::Numeric,
        predicate: Box::new(predicate),
    }
}

fn numeric_threshold(
    id: &str,
    options: &serde_json::Value,
    cmp: impl Fn(f64, f64) -> bool + Send + Sync + 'static,
) -> TransformResult<ValueMatcher> {
    let opts: ThresholdOptions = parse_options(id, options)?;
    Ok(numeric(move |row, field| {
        field.values[row].as_number().is_some_and(|v| cmp(v, opts.value))
    }))
}
