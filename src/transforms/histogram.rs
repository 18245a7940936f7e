//! `histogram`: bucket numeric values and count occurrences per field.
//!
//! Every number field across the input frames becomes one count column. The
//! output frame has an `xMin`/`xMax` column pair describing contiguous buckets
//! spanning the data's range; a value `v` falls in the bucket where
//! `xMin <= v < xMax`. With `combine` set, all fields share a single `count`
//! column instead.

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, FieldType, Frame, Value};

use super::TransformOperator;

/// Options for `histogram`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistogramOptions {
    /// Bucket width. Derived from the value range when unset or non-positive.
    pub bucket_size: Option<f64>,
    /// Offset for non-zero-based buckets.
    pub bucket_offset: f64,
    /// Merge all fields into one `count` column.
    pub combine: bool,
}

/// Build a `histogram` operator.
pub fn operator(options: HistogramOptions) -> TransformResult<TransformOperator> {
    Ok(Box::new(move |frames: Vec<Frame>| {
        match histogram_frame(&frames, &options) {
            Some(frame) => vec![frame],
            None => frames,
        }
    }))
}

/// `None` (input passes through) when there are no numeric values to bucket.
fn histogram_frame(frames: &[Frame], options: &HistogramOptions) -> Option<Frame> {
    // One series per number field, in frame order.
    let series: Vec<(String, Vec<f64>)> = frames
        .iter()
        .flat_map(|frame| frame.fields.iter())
        .filter(|f| f.field_type == FieldType::Number)
        .map(|f| {
            let values = f.values.iter().filter_map(Value::as_number).collect();
            (f.display_name(), values)
        })
        .collect();

    let all: Vec<f64> = series.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let min = all.iter().copied().reduce(f64::min)?;
    let max = all.iter().copied().reduce(f64::max)?;

    let size = match options.bucket_size {
        Some(size) if size > 0.0 => size,
        _ => auto_bucket_size(max - min),
    };
    let offset = options.bucket_offset;
    let bucket_of = |v: f64| ((v - offset) / size).floor() as i64;
    let first = bucket_of(min);
    let last = bucket_of(max);
    let buckets = (last - first + 1) as usize;

    let mut x_min = Vec::with_capacity(buckets);
    let mut x_max = Vec::with_capacity(buckets);
    for i in first..=last {
        x_min.push(Value::Number(offset + i as f64 * size));
        x_max.push(Value::Number(offset + (i + 1) as f64 * size));
    }

    let mut fields = vec![
        Field::new("xMin", FieldType::Number, x_min),
        Field::new("xMax", FieldType::Number, x_max),
    ];
    if options.combine {
        let mut counts = vec![0u64; buckets];
        for v in &all {
            counts[(bucket_of(*v) - first) as usize] += 1;
        }
        fields.push(count_field("count", counts));
    } else {
        for (name, values) in &series {
            let mut counts = vec![0u64; buckets];
            for v in values {
                counts[(bucket_of(*v) - first) as usize] += 1;
            }
            fields.push(count_field(name, counts));
        }
    }
    Some(Frame::new(fields))
}

fn count_field(name: &str, counts: Vec<u64>) -> Field {
    Field::new(
        name,
        FieldType::Number,
        counts.into_iter().map(|c| Value::Number(c as f64)).collect(),
    )
}

/// A 1/2/5-series bucket width targeting roughly thirty buckets.
fn auto_bucket_size(range: f64) -> f64 {
    if !(range > 0.0) {
        return 1.0;
    }
    let target = range / 30.0;
    let magnitude = 10f64.powf(target.log10().floor());
    for multiple in [1.0, 2.0, 5.0, 10.0] {
        let size = multiple * magnitude;
        if size >= target {
            return size;
        }
    }
    magnitude * 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(name: &str, values: Vec<f64>) -> Field {
        Field::new(
            name,
            FieldType::Number,
            values.into_iter().map(Value::Number).collect(),
        )
    }

    #[test]
    fn buckets_count_values_per_field_over_the_full_range() {
        let series_1 = Frame::new(vec![
            numbers("A", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            numbers("B", vec![3.0, 4.0, 5.0, 6.0, 7.0]),
            numbers("C", vec![5.0, 6.0, 7.0, 8.0, 9.0]),
        ]);
        let series_2 = Frame::new(vec![numbers("C", vec![5.0, 6.0, 7.0, 8.0, 9.0])]);
        let op = operator(HistogramOptions {
            bucket_size: Some(1.0),
            ..Default::default()
        })
        .unwrap();
        let out = op(vec![series_1, series_2]);
        assert_eq!(out.len(), 1);
        let histogram = &out[0];
        let names: Vec<&str> = histogram.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["xMin", "xMax", "A", "B", "C", "C"]);
        // Contiguous buckets 1..10.
        assert_eq!(histogram.len(), 9);
        assert_eq!(histogram.fields[0].values[0], Value::Number(1.0));
        assert_eq!(histogram.fields[1].values[8], Value::Number(10.0));
        // A: one value in each of the first five buckets.
        assert_eq!(
            histogram.fields[2].values,
            (0..9)
                .map(|i| Value::Number(if i < 5 { 1.0 } else { 0.0 }))
                .collect::<Vec<_>>()
        );
        // C (both series): values 5..=9 land in buckets 5-6 through 9-10.
        assert_eq!(
            histogram.fields[4].values,
            (0..9)
                .map(|i| Value::Number(if i >= 4 { 1.0 } else { 0.0 }))
                .collect::<Vec<_>>()
        );
        assert_eq!(histogram.fields[4].values, histogram.fields[5].values);
    }

    #[test]
    fn combine_merges_all_fields_into_one_count_column() {
        let frame = Frame::new(vec![
            numbers("A", vec![1.0, 1.5]),
            numbers("B", vec![1.2]),
        ]);
        let op = operator(HistogramOptions {
            bucket_size: Some(1.0),
            combine: true,
            ..Default::default()
        })
        .unwrap();
        let out = op(vec![frame]);
        let names: Vec<&str> = out[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["xMin", "xMax", "count"]);
        assert_eq!(out[0].fields[2].values, vec![Value::Number(3.0)]);
    }

    #[test]
    fn bucket_offset_shifts_bucket_boundaries() {
        let frame = Frame::new(vec![numbers("A", vec![1.0])]);
        let op = operator(HistogramOptions {
            bucket_size: Some(1.0),
            bucket_offset: 0.5,
            ..Default::default()
        })
        .unwrap();
        let out = op(vec![frame]);
        assert_eq!(out[0].fields[0].values, vec![Value::Number(0.5)]);
        assert_eq!(out[0].fields[1].values, vec![Value::Number(1.5)]);
    }

    #[test]
    fn bucket_size_is_derived_when_unset() {
        let frame = Frame::new(vec![numbers("A", (0..=100).map(f64::from).collect())]);
        let op = operator(HistogramOptions::default()).unwrap();
        let out = op(vec![frame]);
        // range 100 / 30 buckets rounds up to a width of 5.
        assert_eq!(out[0].fields[1].values[0], Value::Number(5.0));
        assert_eq!(out[0].len(), 21);
    }

    #[test]
    fn frames_without_numeric_fields_pass_through() {
        let frames = vec![Frame::new(vec![Field::new(
            "s",
            FieldType::String,
            vec![Value::String("x".into())],
        )])];
        let op = operator(HistogramOptions::default()).unwrap();
        assert_eq!(op(frames.clone()), frames);
    }
}
