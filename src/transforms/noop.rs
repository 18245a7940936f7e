//! `noop`: the identity transform.

use crate::error::TransformResult;

use super::TransformOperator;

/// Build the identity operator. Input frames are returned untouched.
pub fn operator() -> TransformResult<TransformOperator> {
    Ok(Box::new(|frames| frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Field, FieldType, Frame, Value};

    #[test]
    fn returns_input_unchanged() {
        let frames = vec![
            Frame::new(vec![Field::new(
                "Value",
                FieldType::Number,
                vec![Value::Number(1.0)],
            )])
            .with_name("a"),
        ];
        let op = operator().unwrap();
        assert_eq!(op(frames.clone()), frames);
        assert!(op(vec![]).is_empty());
    }
}
