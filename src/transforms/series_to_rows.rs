//! `seriesToRows`: flatten time series frames into one Time/Metric/Value table.
//!
//! Each input frame contributes one row per sample: the frame's first time
//! field supplies `Time`, the first number field supplies `Value`, and that
//! field's display name becomes `Metric`. Rows are ordered by time,
//! newest first. Frames without a time field or a number field are logged and
//! skipped; if no frame qualifies the input passes through untouched.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, FieldType, Frame, Value};

use super::TransformOperator;

/// Options for `seriesToRows` (currently none; kept for config compatibility).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesToRowsOptions {}

/// Build a `seriesToRows` operator.
pub fn operator(_options: SeriesToRowsOptions) -> TransformResult<TransformOperator> {
    Ok(Box::new(|frames: Vec<Frame>| {
        let mut rows: Vec<(Value, String, Value)> = Vec::new();
        let mut any_series = false;
        for frame in &frames {
            let time = frame.first_time_field();
            let value = frame
                .fields
                .iter()
                .find(|f| f.field_type == FieldType::Number);
            let (Some(time), Some(value)) = (time, value) else {
                warn!("seriesToRows: frame has no time + number field pair, skipping");
                continue;
            };
            any_series = true;
            let metric = value.display_name();
            for row in 0..frame.len() {
                rows.push((
                    time.values[row].clone(),
                    metric.clone(),
                    value.values[row].clone(),
                ));
            }
        }
        if !any_series {
            return frames;
        }
        // Newest first; ties keep input order.
        rows.sort_by(|a, b| b.0.cmp_values(&a.0));

        let (times, metrics, values) = rows.into_iter().fold(
            (Vec::new(), Vec::new(), Vec::new()),
            |(mut t, mut m, mut v), (time, metric, value)| {
                t.push(time);
                m.push(Value::String(metric));
                v.push(value);
                (t, m, v)
            },
        );
        vec![Frame::new(vec![
            Field::new("Time", FieldType::Time, times),
            Field::new("Metric", FieldType::String, metrics),
            Field::new("Value", FieldType::Number, values),
        ])]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(metric: &str, samples: Vec<(i64, f64)>) -> Frame {
        let (times, values): (Vec<Value>, Vec<Value>) = samples
            .into_iter()
            .map(|(t, v)| (Value::Time(t), Value::Number(v)))
            .unzip();
        Frame::new(vec![
            Field::new("Time", FieldType::Time, times),
            Field::new(metric, FieldType::Number, values),
        ])
    }

    #[test]
    fn combines_series_into_time_metric_value_rows() {
        let a = series("Temperature", vec![(300, 25.0), (200, 22.0), (100, 19.0)]);
        let b = series("Humidity", vec![(300, 24.0), (250, 29.0), (150, 33.0)]);
        let op = operator(SeriesToRowsOptions::default()).unwrap();
        let out = op(vec![a, b]);
        assert_eq!(out.len(), 1);
        let table = &out[0];
        let names: Vec<&str> = table.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Time", "Metric", "Value"]);
        assert_eq!(table.len(), 6);
        // Newest first across both series.
        assert_eq!(
            table.fields[0].values,
            vec![
                Value::Time(300),
                Value::Time(300),
                Value::Time(250),
                Value::Time(200),
                Value::Time(150),
                Value::Time(100),
            ]
        );
        assert_eq!(
            table.fields[1].values[0..2],
            [
                Value::String("Temperature".into()),
                Value::String("Humidity".into())
            ]
        );
        assert_eq!(table.fields[2].values[2], Value::Number(29.0));
    }

    #[test]
    fn metric_name_comes_from_display_name() {
        let mut frame = series("Value", vec![(1, 5.0)]);
        frame.fields[1].config.display_name = Some("CPU".into());
        let op = operator(SeriesToRowsOptions::default()).unwrap();
        let out = op(vec![frame]);
        assert_eq!(out[0].fields[1].values, vec![Value::String("CPU".into())]);
    }

    #[test]
    fn frames_without_time_or_value_pass_through_untouched() {
        let frames = vec![Frame::new(vec![Field::new(
            "s",
            FieldType::String,
            vec![Value::String("x".into())],
        )])];
        let op = operator(SeriesToRowsOptions::default()).unwrap();
        assert_eq!(op(frames.clone()), frames);
    }

    #[test]
    fn non_series_frames_are_skipped_when_others_qualify() {
        let strings = Frame::new(vec![Field::new(
            "s",
            FieldType::String,
            vec![Value::String("x".into())],
        )]);
        let a = series("Temperature", vec![(1, 5.0)]);
        let op = operator(SeriesToRowsOptions::default()).unwrap();
        let out = op(vec![strings, a]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 1);
    }
}
