//! `seriesToColumns` / `ensureColumns`: outer-join frames on a shared field.
//!
//! `seriesToColumns` joins two or more frames on a configured field name (or
//! an inferred one), producing a single frame whose key column is the sorted
//! union of key values and whose other columns hold each frame's value at that
//! key, `Null` where a frame has no matching row. `ensureColumns` is the
//! conditional variant: it joins only when every input frame carries a time
//! field of one consistent name, and passes frames through otherwise.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, Frame, Value};

use super::TransformOperator;

/// Options for `seriesToColumns`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesToColumnsOptions {
    /// Join field name. Inferred when unset: the first frame's time-field name
    /// if every frame has it, else the first field name common to all frames.
    pub by_field: Option<String>,
}

/// Build a `seriesToColumns` operator.
pub fn operator(options: SeriesToColumnsOptions) -> TransformResult<TransformOperator> {
    let by_field = options.by_field;
    Ok(Box::new(move |frames: Vec<Frame>| {
        join_frames(frames, by_field.as_deref())
    }))
}

/// Build an `ensureColumns` operator.
pub fn ensure_columns_operator() -> TransformResult<TransformOperator> {
    Ok(Box::new(|frames: Vec<Frame>| {
        if frames.len() < 2 {
            return frames;
        }
        let Some(shared) = shared_time_field_name(&frames) else {
            return frames;
        };
        join_frames(frames, Some(&shared))
    }))
}

/// The name of the first frame's first time field, when every frame's first
/// time field carries that same name.
fn shared_time_field_name(frames: &[Frame]) -> Option<String> {
    let first = frames.first()?.first_time_field()?.name.clone();
    for frame in frames {
        if frame.first_time_field()?.name != first {
            return None;
        }
    }
    Some(first)
}

fn infer_join_field(frames: &[Frame]) -> Option<String> {
    if let Some(shared) = shared_time_field_name(frames) {
        return Some(shared);
    }
    let first = frames.first()?;
    first
        .fields
        .iter()
        .map(|f| f.name.clone())
        .find(|name| frames.iter().all(|f| f.field_index_by_name(name).is_some()))
}

fn join_frames(frames: Vec<Frame>, by_field: Option<&str>) -> Vec<Frame> {
    if frames.len() < 2 {
        return frames;
    }
    let key_name = match by_field {
        Some(name) => name.to_string(),
        None => match infer_join_field(&frames) {
            Some(name) => name,
            None => {
                warn!("seriesToColumns: no join field shared by all frames, passing through");
                return frames;
            }
        },
    };
    let key_indices: Vec<usize> = match frames
        .iter()
        .map(|f| f.field_index_by_name(&key_name))
        .collect::<Option<Vec<_>>>()
    {
        Some(indices) => indices,
        None => {
            warn!("seriesToColumns: field '{key_name}' missing from some frames, passing through");
            return frames;
        }
    };

    // Sorted, deduplicated union of key values across all frames.
    let mut keys: Vec<Value> = frames
        .iter()
        .zip(&key_indices)
        .flat_map(|(frame, idx)| frame.fields[*idx].values.iter().cloned())
        .collect();
    keys.sort_by(|a, b| a.cmp_values(b));
    keys.dedup();

    // Per frame: key value -> first row index holding it.
    let lookups: Vec<Vec<(Value, usize)>> = frames
        .iter()
        .zip(&key_indices)
        .map(|(frame, idx)| {
            let mut pairs: Vec<(Value, usize)> = frame.fields[*idx]
                .values
                .iter()
                .cloned()
                .enumerate()
                .map(|(row, value)| (value, row))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp_values(&b.0).then(a.1.cmp(&b.1)));
            pairs.dedup_by(|a, b| a.0 == b.0);
            pairs
        })
        .collect();

    let key_field = &frames[0].fields[key_indices[0]];
    let mut fields = vec![Field {
        name: key_field.name.clone(),
        field_type: key_field.field_type,
        config: key_field.config.clone(),
        labels: key_field.labels.clone(),
        values: keys.clone(),
    }];

    for ((frame, key_idx), lookup) in frames.iter().zip(&key_indices).zip(&lookups) {
        for (idx, field) in frame.fields.iter().enumerate() {
            if idx == *key_idx {
                continue;
            }
            let values = keys
                .iter()
                .map(|key| {
                    lookup
                        .binary_search_by(|(k, _)| k.cmp_values(key))
                        .ok()
                        .map(|pos| field.values[lookup[pos].1].clone())
                        .unwrap_or(Value::Null)
                })
                .collect();
            fields.push(Field {
                name: field.name.clone(),
                field_type: field.field_type,
                config: field.config.clone(),
                labels: field.labels.clone(),
                values,
            });
        }
    }

    vec![Frame::new(fields)]
}
