//! `concatenate`: merge all input frames' fields into one wide frame.
//!
//! Shorter columns are padded with `Null` to the longest frame's row count so
//! the output upholds the equal-length invariant. The first named input frame
//! contributes the output name.

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Frame, Value};

use super::TransformOperator;

/// Options for `concatenate` (currently none; kept for config compatibility).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConcatenateOptions {}

/// Build a `concatenate` operator.
pub fn operator(_options: ConcatenateOptions) -> TransformResult<TransformOperator> {
    Ok(Box::new(|frames: Vec<Frame>| {
        if frames.len() < 2 {
            return frames;
        }
        let max_len = frames.iter().map(Frame::len).max().unwrap_or(0);
        let name = frames.iter().find_map(|f| f.name.clone());
        let mut fields = Vec::new();
        for frame in frames {
            for mut field in frame.fields {
                field.values.resize(max_len, Value::Null);
                fields.push(field);
            }
        }
        let mut out = Frame::new(fields);
        out.name = name;
        vec![out]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Field, FieldType};

    #[test]
    fn merges_fields_and_pads_to_longest() {
        let a = Frame::new(vec![Field::new(
            "a",
            FieldType::Number,
            vec![Value::Number(1.0), Value::Number(2.0)],
        )])
        .with_name("first");
        let b = Frame::new(vec![Field::new(
            "b",
            FieldType::Number,
            vec![Value::Number(10.0)],
        )]);
        let op = operator(ConcatenateOptions::default()).unwrap();
        let out = op(vec![a, b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name.as_deref(), Some("first"));
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[0].fields[1].values, vec![Value::Number(10.0), Value::Null]);
    }

    #[test]
    fn single_frame_passes_through() {
        let frames = vec![Frame::new(vec![Field::new(
            "a",
            FieldType::Number,
            vec![Value::Number(1.0)],
        )])];
        let op = operator(ConcatenateOptions::default()).unwrap();
        assert_eq!(op(frames.clone()), frames);
    }
}
