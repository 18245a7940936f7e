//! Core data model: frames, fields, and cell values.
//!
//! A [`Frame`] is a table: an ordered list of [`Field`]s (typed columns) that all
//! share one row count. Frames are value objects: transform stages build new
//! frames instead of writing through shared references, so the input to a
//! pipeline is never mutated.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical type tag of a [`Field`].
///
/// Matchers that dispatch on type (`byType`, `numeric`, `time`) compare this tag
/// by strict equality; there is no coercion between tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Timestamps, stored as epoch milliseconds.
    Time,
    /// 64-bit floating point numbers.
    Number,
    /// UTF-8 strings.
    String,
    /// Booleans.
    Boolean,
    /// Anything that does not fit the other tags.
    Other,
}

/// A single cell value in a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit float.
    Number(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    String(String),
    /// Timestamp in epoch milliseconds.
    Time(i64),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value: numbers and timestamps only.
    ///
    /// Strings and booleans return `None`; numeric matchers and reducers never
    /// coerce them.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Time(t) => Some(*t as f64),
            _ => None,
        }
    }

    /// Build a [`Value`] from a JSON literal (used by value-matcher options).
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }

    /// Loose equality in the spirit of dynamically typed comparisons: values of
    /// different kinds are compared through a numeric or string view where one
    /// exists (`Number(1.0)` equals `String("1")`, `Bool(true)` equals
    /// `Number(1.0)`). `Null` equals only `Null`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (a, b) => match (a.coerce_number(), b.coerce_number()) {
                (Some(x), Some(y)) => x == y,
                _ => a.render() == b.render(),
            },
        }
    }

    /// Widest numeric coercion, used only by [`Value::loose_eq`] and type
    /// conversion: booleans become 0/1 and parseable strings become numbers.
    pub(crate) fn coerce_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Time(t) => Some(*t as f64),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Null => None,
        }
    }

    /// String rendering used by the `regex` value matcher and to-string
    /// conversion. `Null` renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.clone(),
            Value::Time(t) => t.to_string(),
        }
    }

    /// Total ordering used by `sortBy` and join-key unions: numbers and
    /// timestamps order numerically, strings lexically, booleans false-first,
    /// and `Null` sorts after every non-null value. Values of different kinds
    /// fall back to ordering their string renderings.
    pub fn cmp_values(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.render().cmp(&b.render()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render an `f64` without a trailing `.0` for integral values, so string
/// conversion of `1.0` yields `"1"`.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Unordered string→string tags attached to a field, typically encoding a
/// series dimension (e.g. a metric's source instance). Stored in a `BTreeMap`
/// so enumeration order is deterministic.
pub type Labels = BTreeMap<String, String>;

/// Display/formatting options attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfig {
    /// Overrides the computed display name when set.
    pub display_name: Option<String>,
    /// Display unit (passed through untouched by every transform).
    pub unit: Option<String>,
}

/// A named, typed column of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field/column name. Not required to be unique within a frame.
    pub name: String,
    /// Logical type of every value in the column.
    pub field_type: FieldType,
    /// Display/formatting options.
    pub config: FieldConfig,
    /// Series dimension tags.
    pub labels: Labels,
    /// Ordered row values; length equals the owning frame's row count.
    pub values: Vec<Value>,
}

impl Field {
    /// Create a field with empty config and labels.
    pub fn new(name: impl Into<String>, field_type: FieldType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            field_type,
            config: FieldConfig::default(),
            labels: Labels::new(),
            values,
        }
    }

    /// Attach labels (builder style).
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The name shown to users and used by name-based matchers and renames:
    /// the configured override if present, else the field name decorated with
    /// its labels (`name {key="value"}`), else the plain name.
    pub fn display_name(&self) -> String {
        if let Some(dn) = &self.config.display_name {
            return dn.clone();
        }
        if self.labels.is_empty() {
            return self.name.clone();
        }
        let tags: Vec<String> = self
            .labels
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect();
        format!("{} {{{}}}", self.name, tags.join(", "))
    }

    /// Two fields are the same series when type and display name match.
    pub fn same_series(&self, other: &Field) -> bool {
        self.field_type == other.field_type && self.display_name() == other.display_name()
    }
}

/// A table of typed columns sharing one row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Optional frame name.
    pub name: Option<String>,
    /// Identifier of the query that produced this frame, if any.
    pub ref_id: Option<String>,
    /// Ordered columns. Invariant: all have equal length.
    pub fields: Vec<Field>,
}

impl Frame {
    /// Create an anonymous frame from fields.
    ///
    /// # Panics
    ///
    /// Panics if the fields disagree on length.
    pub fn new(fields: Vec<Field>) -> Self {
        if let Some(first) = fields.first() {
            let len = first.len();
            assert!(
                fields.iter().all(|f| f.len() == len),
                "all fields in a frame must share one row count"
            );
        }
        Self {
            name: None,
            ref_id: None,
            fields,
        }
    }

    /// Set the frame name (builder style).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the originating query id (builder style).
    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    /// Number of rows (0 for a frame with no fields).
    pub fn len(&self) -> usize {
        self.fields.first().map(Field::len).unwrap_or(0)
    }

    /// Returns `true` if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first field whose display name (or raw name) equals `name`.
    pub fn field_index_by_name(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.display_name() == name || f.name == name)
    }

    /// First time-typed field, if any.
    pub fn first_time_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_type == FieldType::Time)
    }
}
