//! Scalar reducers: named functions folding a field's values to one value.
//!
//! Reducers are resolved by string id ([`reducer`]) so that saved configs can
//! reference them, and consumed by the `reduce` and `calculateField`
//! transforms. Null handling is controlled per call: `ignore_nulls` skips null
//! cells, `null_as_zero` folds them as `0`.

use crate::error::{TransformError, TransformResult};
use crate::frame::{Field, Value};

/// Built-in reducer catalogue. Closed set; resolve ids with [`reducer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducerId {
    /// Sum of numeric values.
    Sum,
    /// Arithmetic mean of numeric values.
    Mean,
    /// Minimum numeric value.
    Min,
    /// Maximum numeric value.
    Max,
    /// First value (may be null unless nulls are ignored).
    First,
    /// First non-null value.
    FirstNotNull,
    /// Last value (may be null unless nulls are ignored).
    Last,
    /// Last non-null value.
    LastNotNull,
    /// Count of non-null values (all values with `null_as_zero`).
    Count,
    /// Count of distinct non-null values.
    DistinctCount,
    /// `max - min` over numeric values.
    Range,
    /// `last - first` over numeric values.
    Diff,
    /// True when every value is null.
    AllIsNull,
}

impl ReducerId {
    /// Stable string id used in saved configs.
    pub fn id(&self) -> &'static str {
        match self {
            ReducerId::Sum => "sum",
            ReducerId::Mean => "mean",
            ReducerId::Min => "min",
            ReducerId::Max => "max",
            ReducerId::First => "first",
            ReducerId::FirstNotNull => "firstNotNull",
            ReducerId::Last => "last",
            ReducerId::LastNotNull => "lastNotNull",
            ReducerId::Count => "count",
            ReducerId::DistinctCount => "distinctCount",
            ReducerId::Range => "range",
            ReducerId::Diff => "diff",
            ReducerId::AllIsNull => "allIsNull",
        }
    }

    /// Fold `field`'s values to a single value.
    ///
    /// Numeric reducers skip values without a numeric view (strings, booleans)
    /// and yield [`Value::Null`] when no usable value remains.
    pub fn reduce(&self, field: &Field, ignore_nulls: bool, null_as_zero: bool) -> Value {
        let numbers = || numeric_view(field, null_as_zero);
        match self {
            ReducerId::Sum => fold_numeric(numbers(), 0.0, |acc, v| acc + v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ReducerId::Mean => {
                let vals: Vec<f64> = numbers().collect();
                if vals.is_empty() {
                    Value::Null
                } else {
                    Value::Number(vals.iter().sum::<f64>() / vals.len() as f64)
                }
            }
            ReducerId::Min => reduce_pairwise(numbers(), f64::min),
            ReducerId::Max => reduce_pairwise(numbers(), f64::max),
            ReducerId::First => pick_edge(field, ignore_nulls, false),
            ReducerId::FirstNotNull => pick_edge(field, true, false),
            ReducerId::Last => pick_edge(field, ignore_nulls, true),
            ReducerId::LastNotNull => pick_edge(field, true, true),
            ReducerId::Count => {
                let count = if null_as_zero {
                    field.values.len()
                } else {
                    field.values.iter().filter(|v| !v.is_null()).count()
                };
                Value::Number(count as f64)
            }
            ReducerId::DistinctCount => {
                let mut seen: Vec<String> = Vec::new();
                for v in field.values.iter().filter(|v| !v.is_null()) {
                    let key = v.render();
                    if !seen.contains(&key) {
                        seen.push(key);
                    }
                }
                Value::Number(seen.len() as f64)
            }
            ReducerId::Range => {
                let vals: Vec<f64> = numbers().collect();
                match (
                    vals.iter().copied().reduce(f64::min),
                    vals.iter().copied().reduce(f64::max),
                ) {
                    (Some(min), Some(max)) => Value::Number(max - min),
                    _ => Value::Null,
                }
            }
            ReducerId::Diff => {
                let vals: Vec<f64> = numbers().collect();
                match (vals.first(), vals.last()) {
                    (Some(first), Some(last)) => Value::Number(last - first),
                    _ => Value::Null,
                }
            }
            ReducerId::AllIsNull => Value::Bool(field.values.iter().all(Value::is_null)),
        }
    }
}

/// Resolve a reducer id from a saved config.
pub fn reducer(id: &str) -> TransformResult<ReducerId> {
    const ALL: [ReducerId; 13] = [
        ReducerId::Sum,
        ReducerId::Mean,
        ReducerId::Min,
        ReducerId::Max,
        ReducerId::First,
        ReducerId::FirstNotNull,
        ReducerId::Last,
        ReducerId::LastNotNull,
        ReducerId::Count,
        ReducerId::DistinctCount,
        ReducerId::Range,
        ReducerId::Diff,
        ReducerId::AllIsNull,
    ];
    ALL.iter()
        .find(|r| r.id() == id)
        .copied()
        .ok_or_else(|| TransformError::UnknownReducer { id: id.to_string() })
}

/// Numeric values of a field, with nulls either folded to zero or skipped.
fn numeric_view<'a>(field: &'a Field, null_as_zero: bool) -> impl Iterator<Item = f64> + 'a {
    field.values.iter().filter_map(move |v| {
        if v.is_null() && null_as_zero {
            Some(0.0)
        } else {
            v.as_number()
        }
    })
}

fn fold_numeric(iter: impl Iterator<Item = f64>, init: f64, f: impl Fn(f64, f64) -> f64) -> Option<f64> {
    let mut acc = None;
    for v in iter {
        acc = Some(f(acc.unwrap_or(init), v));
    }
    acc
}

fn reduce_pairwise(iter: impl Iterator<Item = f64>, f: impl Fn(f64, f64) -> f64) -> Value {
    iter.reduce(f).map(Value::Number).unwrap_or(Value::Null)
}

fn pick_edge(field: &Field, skip_nulls: bool, from_end: bool) -> Value {
    let mut iter = field.values.iter();
    let found = if from_end {
        iter.rfind(|v| !skip_nulls || !v.is_null())
    } else {
        iter.find(|v| !skip_nulls || !v.is_null())
    };
    found.cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FieldType;

    fn field(values: Vec<Value>) -> Field {
        Field::new("Value", FieldType::Number, values)
    }

    #[test]
    fn sum_skips_nulls() {
        let f = field(vec![Value::Number(1.0), Value::Null, Value::Number(2.0)]);
        assert_eq!(ReducerId::Sum.reduce(&f, true, false), Value::Number(3.0));
    }

    #[test]
    fn sum_of_all_nulls_is_null_unless_null_as_zero() {
        let f = field(vec![Value::Null, Value::Null]);
        assert_eq!(ReducerId::Sum.reduce(&f, true, false), Value::Null);
        assert_eq!(ReducerId::Sum.reduce(&f, false, true), Value::Number(0.0));
    }

    #[test]
    fn mean_min_max_over_numbers() {
        let f = field(vec![Value::Number(1.0), Value::Number(5.0), Value::Number(3.0)]);
        assert_eq!(ReducerId::Mean.reduce(&f, true, false), Value::Number(3.0));
        assert_eq!(ReducerId::Min.reduce(&f, true, false), Value::Number(1.0));
        assert_eq!(ReducerId::Max.reduce(&f, true, false), Value::Number(5.0));
        assert_eq!(ReducerId::Range.reduce(&f, true, false), Value::Number(4.0));
        assert_eq!(ReducerId::Diff.reduce(&f, true, false), Value::Number(2.0));
    }

    #[test]
    fn first_and_last_respect_null_handling() {
        let f = field(vec![Value::Null, Value::Number(2.0), Value::Null]);
        assert_eq!(ReducerId::First.reduce(&f, false, false), Value::Null);
        assert_eq!(ReducerId::First.reduce(&f, true, false), Value::Number(2.0));
        assert_eq!(ReducerId::Last.reduce(&f, false, false), Value::Null);
        assert_eq!(ReducerId::LastNotNull.reduce(&f, false, false), Value::Number(2.0));
        assert_eq!(ReducerId::FirstNotNull.reduce(&f, false, false), Value::Number(2.0));
    }

    #[test]
    fn counts_and_all_is_null() {
        let f = field(vec![Value::Number(1.0), Value::Null, Value::Number(1.0)]);
        assert_eq!(ReducerId::Count.reduce(&f, true, false), Value::Number(2.0));
        assert_eq!(ReducerId::Count.reduce(&f, false, true), Value::Number(3.0));
        assert_eq!(ReducerId::DistinctCount.reduce(&f, true, false), Value::Number(1.0));
        assert_eq!(ReducerId::AllIsNull.reduce(&f, true, false), Value::Bool(false));
        let nulls = field(vec![Value::Null]);
        assert_eq!(ReducerId::AllIsNull.reduce(&nulls, true, false), Value::Bool(true));
    }

    #[test]
    fn numeric_reducers_skip_non_numeric_values() {
        let f = Field::new(
            "mixed",
            FieldType::String,
            vec![Value::String("a".into()), Value::Number(4.0)],
        );
        assert_eq!(ReducerId::Sum.reduce(&f, true, false), Value::Number(4.0));
    }

    #[test]
    fn unknown_reducer_id_errors_with_id() {
        let err = reducer("not-a-real-reducer").unwrap_err();
        assert_eq!(err.to_string(), "Unknown reducer: not-a-real-reducer");
        assert_eq!(reducer("sum").unwrap(), ReducerId::Sum);
        assert_eq!(reducer("firstNotNull").unwrap(), ReducerId::FirstNotNull);
    }
}
