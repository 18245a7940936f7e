//! `calculateField`: synthesize one numeric field per frame.
//!
//! Two modes:
//!
//! - `reduceRow`: fold each row's values across a set of source fields (all
//!   numeric fields by default, or an explicit name list) with a reducer.
//! - `binary`: apply an arithmetic operator between two operands, each either a
//!   named field or a numeric constant (a "name" that parses as a finite
//!   number is a constant).
//!
//! With `replaceFields` set, the output frame keeps only the first time field
//! (unless `timeSeries` is `false`) plus the new field; otherwise the new
//! field is appended.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, FieldType, Frame, Value};
use crate::reducers::{ReducerId, reducer};

use super::{TransformOperator, frame_with_fields};

/// Calculation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculateFieldMode {
    /// Reduce each row across matching fields.
    #[default]
    #[serde(rename = "reduceRow")]
    ReduceRow,
    /// Binary arithmetic between two operands.
    #[serde(rename = "binary")]
    Binary,
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl BinaryOperator {
    fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }

    fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            BinaryOperator::Divide => left / right,
        }
    }
}

/// Row-reduction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReduceRowOptions {
    /// Reducer id from the reducer catalogue.
    pub reducer: String,
    /// Source field names. Empty means "all numeric fields".
    #[serde(default)]
    pub include: Vec<String>,
    /// Skip null cells while folding (default true).
    #[serde(default = "default_true")]
    pub ignore_nulls: bool,
    /// Fold null cells as zero (default false).
    #[serde(default)]
    pub null_as_zero: bool,
}

fn default_true() -> bool {
    true
}

/// Binary-mode configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryOptions {
    /// Left operand: field name or numeric constant.
    pub left: String,
    pub operator: BinaryOperator,
    /// Right operand: field name or numeric constant.
    pub right: String,
}

/// Options for `calculateField`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculateFieldOptions {
    pub mode: CalculateFieldMode,
    /// Name of the new field. Derived from the mode config when unset.
    pub alias: Option<String>,
    /// Keep only time + the new field.
    pub replace_fields: bool,
    /// When replacing fields, `Some(false)` drops the time field too.
    pub time_series: Option<bool>,
    pub reduce: Option<ReduceRowOptions>,
    pub binary: Option<BinaryOptions>,
}

/// Build a `calculateField` operator.
pub fn operator(options: CalculateFieldOptions) -> TransformResult<TransformOperator> {
    let keep_time = options.time_series != Some(false);
    let replace = options.replace_fields;
    match options.mode {
        CalculateFieldMode::ReduceRow => {
            let reduce_opts = options.reduce.unwrap_or(ReduceRowOptions {
                reducer: "sum".into(),
                include: vec![],
                ignore_nulls: true,
                null_as_zero: false,
            });
            let reducer_id = reducer(&reduce_opts.reducer)?;
            let name = options.alias.unwrap_or_else(|| reduce_opts.reducer.clone());
            Ok(Box::new(move |frames: Vec<Frame>| {
                frames
                    .into_iter()
                    .map(|frame| {
                        let field = reduce_row_field(&frame, &reduce_opts, reducer_id, &name);
                        attach(&frame, field, replace, keep_time)
                    })
                    .collect()
            }))
        }
        CalculateFieldMode::Binary => {
            let Some(binary) = options.binary else {
                // Nothing to compute; behave as identity rather than failing.
                warn!("calculateField: binary mode configured without binary options");
                return Ok(Box::new(|frames| frames));
            };
            let name = options
                .alias
                .clone()
                .unwrap_or_else(|| format!("{} {} {}", binary.left, binary.operator.symbol(), binary.right));
            Ok(Box::new(move |frames: Vec<Frame>| {
                frames
                    .into_iter()
                    .map(|frame| match binary_field(&frame, &binary, &name) {
                        Some(field) => attach(&frame, field, replace, keep_time),
                        None => frame,
                    })
                    .collect()
            }))
        }
    }
}

/// Fold each row across the selected source fields.
fn reduce_row_field(
    frame: &Frame,
    opts: &ReduceRowOptions,
    reducer_id: ReducerId,
    name: &str,
) -> Field {
    let sources: Vec<&Field> = if opts.include.is_empty() {
        frame
            .fields
            .iter()
            .filter(|f| f.field_type == FieldType::Number)
            .collect()
    } else {
        frame
            .fields
            .iter()
            .filter(|f| {
                let display = f.display_name();
                opts.include.iter().any(|n| *n == display || *n == f.name)
            })
            .collect()
    };

    let values = (0..frame.len())
        .map(|row| {
            let row_values: Vec<Value> = sources.iter().map(|f| f.values[row].clone()).collect();
            let row_field = Field::new("row", FieldType::Number, row_values);
            reducer_id.reduce(&row_field, opts.ignore_nulls, opts.null_as_zero)
        })
        .collect();
    Field::new(name, FieldType::Number, values)
}

/// Operand values for binary mode: a constant or a borrowed field column.
enum Operand<'a> {
    Constant(f64),
    Column(&'a Field),
}

impl Operand<'_> {
    fn at(&self, row: usize) -> Option<f64> {
        match self {
            Operand::Constant(c) => Some(*c),
            Operand::Column(field) => field.values[row].as_number(),
        }
    }
}

fn resolve_operand<'a>(frame: &'a Frame, name: &str) -> Option<Operand<'a>> {
    if let Ok(constant) = name.trim().parse::<f64>() {
        if constant.is_finite() {
            return Some(Operand::Constant(constant));
        }
    }
    frame
        .field_index_by_name(name)
        .map(|index| Operand::Column(&frame.fields[index]))
}

/// Compute the binary field, or `None` (frame passes through) when an operand
/// cannot be resolved.
fn binary_field(frame: &Frame, binary: &BinaryOptions, name: &str) -> Option<Field> {
    let left = resolve_operand(frame, &binary.left);
    let right = resolve_operand(frame, &binary.right);
    let (Some(left), Some(right)) = (left, right) else {
        warn!(
            "calculateField: could not resolve operands '{}' / '{}'",
            binary.left, binary.right
        );
        return None;
    };
    let values = (0..frame.len())
        .map(|row| match (left.at(row), right.at(row)) {
            (Some(l), Some(r)) => {
                let result = binary.operator.apply(l, r);
                if result.is_finite() {
                    Value::Number(result)
                } else {
                    Value::Null
                }
            }
            _ => Value::Null,
        })
        .collect();
    Some(Field::new(name, FieldType::Number, values))
}

fn attach(frame: &Frame, field: Field, replace: bool, keep_time: bool) -> Frame {
    let mut fields = if replace {
        let mut kept = Vec::new();
        if keep_time {
            if let Some(time) = frame.first_time_field() {
                kept.push(time.clone());
            }
        }
        kept
    } else {
        frame.fields.clone()
    };
    fields.push(field);
    frame_with_fields(frame, fields)
}
