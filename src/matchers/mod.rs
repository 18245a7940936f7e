//! Declarative matchers: named, configurable predicates over fields, frames,
//! and row values.
//!
//! A matcher is described by a [`MatcherConfig`] (`{id, options}`, the shape
//! persisted in saved configs) and resolved through the
//! [`Registry`](crate::registry::Registry) into a callable predicate. The
//! catalogue is a closed set: resolution fails loudly (`Unknown field matcher:
//! <id>` and friends) when an id is not recognized, before any frame data is
//! touched.
//!
//! Three independent catalogues exist:
//!
//! - **Field matchers** (`(field, frame, all_frames) -> bool`): select columns.
//! - **Frame matchers** (`(frame, index) -> bool`): select whole tables.
//! - **Value matchers** (`(row, field) -> bool`): select rows, with a
//!   per-matcher applicability check (numeric comparators only apply to
//!   number fields).
//!
//! Field and frame catalogues both include the combinators `anyMatch` (OR),
//! `allMatch` (AND, vacuously true over an empty child list), `invertMatch`
//! (NOT), and the constants `alwaysMatch`/`neverMatch`.

mod field;
mod frame;
mod value;

pub use field::FieldMatcher;
pub use frame::FrameMatcher;
pub use value::{ValueMatcher, value_matcher_default_options};

pub(crate) use field::resolve_field_matcher;
pub(crate) use frame::resolve_frame_matcher;
pub(crate) use value::resolve_value_matcher;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};

/// A `{id, options}` pair naming a registered matcher and its configuration.
///
/// The `options` shape varies per id; each matcher deserializes it into its own
/// typed options on resolution and rejects payloads it cannot read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Registered matcher id, e.g. `"byType"` or `"isNull"`.
    pub id: String,
    /// Matcher-specific configuration. Defaults to JSON `null` (no options).
    #[serde(default)]
    pub options: serde_json::Value,
}

impl MatcherConfig {
    /// Create a config from an id and a JSON options payload.
    pub fn new(id: impl Into<String>, options: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            options,
        }
    }

    /// Create a config with no options.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self::new(id, serde_json::Value::Null)
    }
}

/// Deserialize a matcher/transformer options payload, attributing failures to
/// the owning id.
pub(crate) fn parse_options<T: DeserializeOwned>(
    id: &str,
    options: &serde_json::Value,
) -> TransformResult<T> {
    serde_json::from_value(options.clone()).map_err(|source| TransformError::InvalidOptions {
        id: id.to_string(),
        source,
    })
}

/// Compile a regex option, surfacing failures as configuration errors.
pub(crate) fn compile_regex(pattern: &str) -> TransformResult<regex::Regex> {
    regex::Regex::new(pattern).map_err(|source| TransformError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}
