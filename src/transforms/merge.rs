//! `merge`: combine the rows of multiple frames into one table.
//!
//! Rows from different frames are merged into a single row when every shared
//! field (a field name present in all input frames) holds equal values. Fields
//! missing from a row's source frame are filled with `Null`. Rows that agree
//! on the shared fields but conflict on another field stay separate.

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, Frame, Value};

use super::TransformOperator;

/// Options for `merge` (currently none; kept for config compatibility).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeOptions {}

/// Build a `merge` operator.
pub fn operator(_options: MergeOptions) -> TransformResult<TransformOperator> {
    Ok(Box::new(|frames: Vec<Frame>| {
        if frames.len() < 2 {
            return frames;
        }
        vec![merge_frames(&frames)]
    }))
}

fn merge_frames(frames: &[Frame]) -> Frame {
    // Column layout: union of field names in first-appearance order, with
    // type/config/labels taken from the first occurrence.
    let mut columns: Vec<&Field> = Vec::new();
    for frame in frames {
        for field in &frame.fields {
            if !columns.iter().any(|c| c.name == field.name) {
                columns.push(field);
            }
        }
    }

    // Shared fields (present in every frame) form the merge key.
    let key_indices: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, column)| {
            frames
                .iter()
                .all(|f| f.fields.iter().any(|field| field.name == column.name))
        })
        .map(|(i, _)| i)
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for frame in frames {
        let slots: Vec<Option<usize>> = columns
            .iter()
            .map(|column| frame.field_index_by_name(&column.name))
            .collect();
        for row in 0..frame.len() {
            let incoming: Vec<Value> = slots
                .iter()
                .map(|slot| match slot {
                    Some(idx) => frame.fields[*idx].values[row].clone(),
                    None => Value::Null,
                })
                .collect();
            merge_row(&mut rows, incoming, &key_indices);
        }
    }

    let fields = columns
        .iter()
        .enumerate()
        .map(|(i, column)| Field {
            name: column.name.clone(),
            field_type: column.field_type,
            config: column.config.clone(),
            labels: column.labels.clone(),
            values: rows.iter().map(|r| r[i].clone()).collect(),
        })
        .collect();
    Frame::new(fields)
}

/// Fold `incoming` into an existing row with equal key values, or append it.
fn merge_row(rows: &mut Vec<Vec<Value>>, incoming: Vec<Value>, key_indices: &[usize]) {
    if key_indices.is_empty() {
        rows.push(incoming);
        return;
    }
    // A row is a merge target when the keys agree and no non-null cell
    // disagrees.
    let target = rows.iter().position(|existing| {
        key_indices.iter().all(|i| existing[*i] == incoming[*i])
            && existing
                .iter()
                .zip(&incoming)
                .all(|(a, b)| a.is_null() || b.is_null() || a == b)
    });
    match target {
        Some(index) => {
            for (cell, value) in rows[index].iter_mut().zip(incoming) {
                if cell.is_null() {
                    *cell = value;
                }
            }
        }
        None => rows.push(incoming),
    }
}
