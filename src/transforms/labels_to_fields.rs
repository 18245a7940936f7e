//! `labelsToFields`: pivot label keys into their own string columns.
//!
//! Per frame, every label key attached to any field becomes a synthetic string
//! field whose value repeats for each row, while the original fields lose
//! their `labels` map. A configured `valueLabel` key is special-cased: instead
//! of a column of its own, its value becomes the carrying field's display
//! name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, FieldType, Frame, Labels, Value};

use super::{TransformOperator, frame_with_fields};

/// Options for `labelsToFields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelsToFieldsOptions {
    /// Label key whose value renames the carrying field instead of becoming a
    /// column.
    pub value_label: Option<String>,
}

/// Build a `labelsToFields` operator.
pub fn operator(options: LabelsToFieldsOptions) -> TransformResult<TransformOperator> {
    let value_label = options.value_label;
    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .map(|frame| pivot_frame(&frame, value_label.as_deref()))
            .collect()
    }))
}

fn pivot_frame(frame: &Frame, value_label: Option<&str>) -> Frame {
    // Key -> value, first carrying field wins; deterministic via field order.
    let mut label_values: BTreeMap<String, String> = BTreeMap::new();
    for field in &frame.fields {
        for (key, value) in &field.labels {
            if value_label == Some(key.as_str()) {
                continue;
            }
            label_values.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    let len = frame.len();
    let mut fields: Vec<Field> = frame
        .fields
        .iter()
        .map(|field| {
            let mut out = field.clone();
            if let Some(key) = value_label {
                if let Some(value) = field.labels.get(key) {
                    out.config.display_name = Some(value.clone());
                }
            }
            out.labels = Labels::new();
            out
        })
        .collect();

    for (key, value) in label_values {
        fields.push(Field::new(
            key,
            FieldType::String,
            vec![Value::String(value); len],
        ));
    }
    frame_with_fields(frame, fields)
}
