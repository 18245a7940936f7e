//! `filterByValue`: row-level filtering driven by value matchers.
//!
//! Each configured filter names a field (by display name) and a value-matcher
//! config. Per frame, every row index is evaluated against all applicable
//! filters with the configured combination policy (`any` = OR, `all` = AND),
//! and a new frame is materialized holding only the selected (or, in exclude
//! mode, the unselected) rows. A filter referencing a field the frame does not
//! have, or one its matcher does not apply to, is logged and skipped rather
//! than failing the stage.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, Frame};
use crate::matchers::{MatcherConfig, ValueMatcher, resolve_value_matcher};

use super::{TransformOperator, frame_with_fields};

/// Whether selected rows are kept or dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterByValueType {
    /// Keep rows matched by the filters.
    #[default]
    Include,
    /// Drop rows matched by the filters.
    Exclude,
}

/// How multiple filters combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterByValueMatch {
    /// A row is selected when any filter matches it.
    #[default]
    Any,
    /// A row is selected only when every filter matches it.
    All,
}

/// One row filter: a target field plus a value-matcher config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterByValueFilter {
    /// Display name of the field the matcher evaluates.
    pub field_name: String,
    /// Value-matcher config (`isNull`, `greater`, `between`, ...).
    pub config: MatcherConfig,
}

/// Options for `filterByValue`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterByValueOptions {
    pub filters: Vec<FilterByValueFilter>,
    #[serde(rename = "type")]
    pub filter_type: FilterByValueType,
    #[serde(rename = "match")]
    pub match_mode: FilterByValueMatch,
}

/// Build a `filterByValue` operator.
pub fn operator(options: FilterByValueOptions) -> TransformResult<TransformOperator> {
    let mut filters: Vec<(String, ValueMatcher)> = Vec::with_capacity(options.filters.len());
    for filter in &options.filters {
        filters.push((filter.field_name.clone(), resolve_value_matcher(&filter.config)?));
    }
    let filter_type = options.filter_type;
    let match_mode = options.match_mode;

    if filters.is_empty() {
        return Ok(Box::new(|frames| frames));
    }

    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .map(|frame| filter_frame(&frame, &filters, filter_type, match_mode))
            .collect()
    }))
}

fn filter_frame(
    frame: &Frame,
    filters: &[(String, ValueMatcher)],
    filter_type: FilterByValueType,
    match_mode: FilterByValueMatch,
) -> Frame {
    // Bind each filter to its field up front; misconfigured filters drop out.
    let mut bound: Vec<(&Field, &ValueMatcher)> = Vec::with_capacity(filters.len());
    for (field_name, matcher) in filters {
        let Some(index) = frame.field_index_by_name(field_name) else {
            warn!("filterByValue: no field named '{field_name}' in frame, skipping filter");
            continue;
        };
        let field = &frame.fields[index];
        if !matcher.is_applicable(field) {
            warn!("filterByValue: matcher not applicable to field '{field_name}', skipping filter");
            continue;
        }
        bound.push((field, matcher));
    }
    if bound.is_empty() {
        return frame.clone();
    }

    let selected: Vec<usize> = (0..frame.len())
        .filter(|row| {
            let matched = match match_mode {
                FilterByValueMatch::Any => bound.iter().any(|(f, m)| m.matches(*row, f)),
                FilterByValueMatch::All => bound.iter().all(|(f, m)| m.matches(*row, f)),
            };
            match filter_type {
                FilterByValueType::Include => matched,
                FilterByValueType::Exclude => !matched,
            }
        })
        .collect();

    let fields = frame
        .fields
        .iter()
        .map(|field| Field {
            name: field.name.clone(),
            field_type: field.field_type,
            config: field.config.clone(),
            labels: field.labels.clone(),
            values: selected.iter().map(|row| field.values[*row].clone()).collect(),
        })
        .collect();
    frame_with_fields(frame, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FieldType, Value};
    use serde_json::json;

    fn sample_frame() -> Frame {
        Frame::new(vec![
            Field::new(
                "Time",
                FieldType::Time,
                vec![Value::Time(1), Value::Time(2), Value::Time(3)],
            ),
            Field::new(
                "Value",
                FieldType::Number,
                vec![Value::Number(10.0), Value::Null, Value::Number(30.0)],
            ),
        ])
    }

    fn greater_than(value: f64) -> FilterByValueFilter {
        FilterByValueFilter {
            field_name: "Value".into(),
            config: MatcherConfig::new("greater", json!({ "value": value })),
        }
    }

    #[test]
    fn include_keeps_matching_rows_in_every_field() {
        let op = operator(FilterByValueOptions {
            filters: vec![greater_than(15.0)],
            ..Default::default()
        })
        .unwrap();
        let out = op(vec![sample_frame()]);
        assert_eq!(out[0].len(), 1);
        assert_eq!(out[0].fields[0].values, vec![Value::Time(3)]);
        assert_eq!(out[0].fields[1].values, vec![Value::Number(30.0)]);
    }

    #[test]
    fn exclude_drops_matching_rows() {
        let op = operator(FilterByValueOptions {
            filters: vec![greater_than(15.0)],
            filter_type: FilterByValueType::Exclude,
            ..Default::default()
        })
        .unwrap();
        let out = op(vec![sample_frame()]);
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[0].fields[1].values, vec![Value::Number(10.0), Value::Null]);
    }

    #[test]
    fn all_mode_requires_every_filter() {
        let op = operator(FilterByValueOptions {
            filters: vec![greater_than(5.0), greater_than(15.0)],
            match_mode: FilterByValueMatch::All,
            ..Default::default()
        })
        .unwrap();
        let out = op(vec![sample_frame()]);
        assert_eq!(out[0].fields[1].values, vec![Value::Number(30.0)]);
    }

    #[test]
    fn any_mode_takes_the_union() {
        let op = operator(FilterByValueOptions {
            filters: vec![
                FilterByValueFilter {
                    field_name: "Value".into(),
                    config: MatcherConfig::id_only("isNull"),
                },
                greater_than(15.0),
            ],
            ..Default::default()
        })
        .unwrap();
        let out = op(vec![sample_frame()]);
        assert_eq!(out[0].len(), 2);
    }

    #[test]
    fn missing_field_filter_is_skipped() {
        let op = operator(FilterByValueOptions {
            filters: vec![FilterByValueFilter {
                field_name: "nope".into(),
                config: MatcherConfig::id_only("isNull"),
            }],
            ..Default::default()
        })
        .unwrap();
        let frames = vec![sample_frame()];
        assert_eq!(op(frames.clone()), frames);
    }

    #[test]
    fn empty_filter_list_is_a_noop() {
        let frames = vec![sample_frame()];
        let op = operator(FilterByValueOptions::default()).unwrap();
        assert_eq!(op(frames.clone()), frames);
    }
}
