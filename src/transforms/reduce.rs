//! `reduce`: collapse fields to single reduced values.
//!
//! Two modes:
//!
//! - `reduceFields` (default): per frame, every matching field becomes one
//!   field of length 1 per requested reducer. When more than one reducer is
//!   requested each output field is tagged with a `reducer` label. Frames with
//!   no matching fields are dropped.
//! - `seriesToRows`: one combined frame with a row per matching field across
//!   all input frames, holding a `Field` name column, optional label columns
//!   (`labelsToFields`), and one column per reducer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::TransformResult;
use crate::frame::{Field, FieldType, Frame, Value};
use crate::matchers::{MatcherConfig, resolve_field_matcher};
use crate::reducers::{ReducerId, reducer};

use super::{TransformOperator, frame_with_fields};

/// Reduce mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReduceMode {
    /// One length-1 frame per input frame.
    #[default]
    #[serde(rename = "reduceFields")]
    ReduceFields,
    /// One combined frame with a row per field.
    #[serde(rename = "seriesToRows")]
    SeriesToRows,
}

/// Options for `reduce`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReduceOptions {
    /// Reducer ids to apply, in order.
    pub reducers: Vec<String>,
    pub mode: ReduceMode,
    /// Which fields to reduce. Defaults to numeric fields.
    pub fields: Option<MatcherConfig>,
    /// In `seriesToRows` mode, emit one column per distinct label key.
    pub labels_to_fields: bool,
    /// Skip null cells while folding (default true).
    pub ignore_nulls: bool,
    /// Fold null cells as zero (default false).
    pub null_as_zero: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            reducers: Vec::new(),
            mode: ReduceMode::default(),
            fields: None,
            labels_to_fields: false,
            ignore_nulls: true,
            null_as_zero: false,
        }
    }
}

/// Build a `reduce` operator.
pub fn operator(options: ReduceOptions) -> TransformResult<TransformOperator> {
    let reducers: Vec<ReducerId> = options
        .reducers
        .iter()
        .map(|id| reducer(id))
        .collect::<TransformResult<_>>()?;
    let matcher_config = options
        .fields
        .clone()
        .unwrap_or_else(|| MatcherConfig::id_only("numeric"));
    let matcher = resolve_field_matcher(&matcher_config)?;
    let ignore_nulls = options.ignore_nulls;
    let null_as_zero = options.null_as_zero;
    let labels_to_fields = options.labels_to_fields;
    let mode = options.mode;

    Ok(Box::new(move |frames: Vec<Frame>| {
        if reducers.is_empty() {
            return frames;
        }
        match mode {
            ReduceMode::ReduceFields => frames
                .iter()
                .filter_map(|frame| {
                    reduce_fields_frame(frame, &frames, &matcher, &reducers, ignore_nulls, null_as_zero)
                })
                .collect(),
            ReduceMode::SeriesToRows => {
                series_to_rows(&frames, &matcher, &reducers, labels_to_fields, ignore_nulls, null_as_zero)
            }
        }
    }))
}

/// Field type matching a reduced value's kind, with the source type as the
/// fallback for `Null`.
fn value_field_type(value: &Value, fallback: FieldType) -> FieldType {
    match value {
        Value::Number(_) => FieldType::Number,
        Value::Bool(_) => FieldType::Boolean,
        Value::String(_) => FieldType::String,
        Value::Time(_) => FieldType::Time,
        Value::Null => fallback,
    }
}

fn reduce_fields_frame(
    frame: &Frame,
    all: &[Frame],
    matcher: &crate::matchers::FieldMatcher,
    reducers: &[ReducerId],
    ignore_nulls: bool,
    null_as_zero: bool,
) -> Option<Frame> {
    let mut fields = Vec::new();
    for field in frame.fields.iter().filter(|f| matcher(f, frame, all)) {
        for id in reducers {
            let reduced = id.reduce(field, ignore_nulls, null_as_zero);
            let mut labels = field.labels.clone();
            if reducers.len() > 1 {
                labels.insert("reducer".to_string(), id.id().to_string());
            }
            fields.push(Field {
                name: field.display_name(),
                field_type: value_field_type(&reduced, field.field_type),
                config: field.config.clone(),
                labels,
                values: vec![reduced],
            });
        }
    }
    if fields.is_empty() {
        return None;
    }
    Some(frame_with_fields(frame, fields))
}

fn series_to_rows(
    frames: &[Frame],
    matcher: &crate::matchers::FieldMatcher,
    reducers: &[ReducerId],
    labels_to_fields: bool,
    ignore_nulls: bool,
    null_as_zero: bool,
) -> Vec<Frame> {
    // One row per matching field across all frames.
    let mut names: Vec<Value> = Vec::new();
    let mut reduced: Vec<Vec<Value>> = vec![Vec::new(); reducers.len()];
    let mut label_keys: BTreeSet<String> = BTreeSet::new();
    let mut row_labels: Vec<crate::frame::Labels> = Vec::new();

    for frame in frames {
        for field in frame.fields.iter().filter(|f| matcher(f, frame, frames)) {
            names.push(Value::String(field.display_name()));
            label_keys.extend(field.labels.keys().cloned());
            row_labels.push(field.labels.clone());
            for (i, id) in reducers.iter().enumerate() {
                reduced[i].push(id.reduce(field, ignore_nulls, null_as_zero));
            }
        }
    }

    if names.is_empty() {
        return Vec::new();
    }

    let mut fields = vec![Field::new("Field", FieldType::String, names)];
    if labels_to_fields {
        for key in &label_keys {
            let values = row_labels
                .iter()
                .map(|labels| match labels.get(key) {
                    Some(v) => Value::String(v.clone()),
                    None => Value::Null,
                })
                .collect();
            fields.push(Field::new(key.clone(), FieldType::String, values));
        }
    }
    for (i, id) in reducers.iter().enumerate() {
        let values = std::mem::take(&mut reduced[i]);
        // Column type inferred from the collected values.
        let inferred = values
            .iter()
            .find(|v| !v.is_null())
            .map(|v| value_field_type(v, FieldType::Other))
            .unwrap_or(FieldType::Other);
        fields.push(Field::new(id.id(), inferred, values));
    }
    vec![Frame::new(fields)]
}
