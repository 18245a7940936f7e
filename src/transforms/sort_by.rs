//! `sortBy`: sort each frame's rows by one field's values.
//!
//! Only the first entry of the sort config is honored; the original system
//! behaves the same way, so multi-key sorts are deliberately not guessed at.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, Frame};

use super::{TransformOperator, frame_with_fields};

/// One sort key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortByField {
    /// Display name of the field to sort by.
    pub field: String,
    /// Sort descending.
    #[serde(default)]
    pub desc: bool,
}

/// Options for `sortBy`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortByOptions {
    pub sort: Vec<SortByField>,
}

/// Build a `sortBy` operator.
pub fn operator(options: SortByOptions) -> TransformResult<TransformOperator> {
    let Some(key) = options.sort.into_iter().next() else {
        return Ok(Box::new(|frames| frames));
    };
    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .map(|frame| sort_frame(&frame, &key))
            .collect()
    }))
}

fn sort_frame(frame: &Frame, key: &SortByField) -> Frame {
    let Some(index) = frame.field_index_by_name(&key.field) else {
        warn!("sortBy: no field named '{}' in frame, leaving rows as-is", key.field);
        return frame.clone();
    };
    let sort_values = &frame.fields[index].values;
    let mut order: Vec<usize> = (0..frame.len()).collect();
    // Stable sort: equal keys keep their original relative order.
    order.sort_by(|a, b| {
        let ord = sort_values[*a].cmp_values(&sort_values[*b]);
        if key.desc { ord.reverse() } else { ord }
    });

    let fields = frame
        .fields
        .iter()
        .map(|field| Field {
            name: field.name.clone(),
            field_type: field.field_type,
            config: field.config.clone(),
            labels: field.labels.clone(),
            values: order.iter().map(|row| field.values[*row].clone()).collect(),
        })
        .collect();
    frame_with_fields(frame, fields)
}
