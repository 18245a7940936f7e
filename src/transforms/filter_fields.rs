//! `filterFields` / `filterFieldsByName`: keep or drop columns per frame.
//!
//! Policy: a field matching `exclude` is dropped no matter what `include` says;
//! with only `include` configured, non-matching fields are dropped; with
//! neither configured the stage is a no-op. Frames left with zero fields are
//! dropped from the output.

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::Frame;
use crate::matchers::{MatcherConfig, resolve_field_matcher};

use super::{TransformOperator, frame_with_fields};

/// Options for `filterFields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterFieldsOptions {
    /// Fields to keep. `None` keeps everything not excluded.
    pub include: Option<MatcherConfig>,
    /// Fields to drop. Takes precedence over `include`.
    pub exclude: Option<MatcherConfig>,
}

/// Build a `filterFields` operator.
pub fn operator(options: FilterFieldsOptions) -> TransformResult<TransformOperator> {
    let include = options.include.as_ref().map(resolve_field_matcher).transpose()?;
    let exclude = options.exclude.as_ref().map(resolve_field_matcher).transpose()?;

    if include.is_none() && exclude.is_none() {
        return Ok(Box::new(|frames| frames));
    }

    Ok(Box::new(move |frames: Vec<Frame>| {
        let mut out = Vec::with_capacity(frames.len());
        for frame in &frames {
            let kept: Vec<_> = frame
                .fields
                .iter()
                .filter(|field| {
                    if exclude.as_ref().is_some_and(|m| m(field, frame, &frames)) {
                        return false;
                    }
                    include.as_ref().is_none_or(|m| m(field, frame, &frames))
                })
                .cloned()
                .collect();
            if !kept.is_empty() {
                out.push(frame_with_fields(frame, kept));
            }
        }
        out
    }))
}

/// Options for `filterFieldsByName`, a config-translation layer over
/// `filterFields` working from literal names and/or a regex pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterFieldsByNameOptions {
    pub include: Option<NameFilter>,
    pub exclude: Option<NameFilter>,
}

/// A set of field names and/or a display-name regex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NameFilter {
    pub names: Vec<String>,
    pub pattern: Option<String>,
}

impl NameFilter {
    /// Translate to the matcher config `filterFields` expects: `byNames`,
    /// `byRegexp`, or `byRegexpOrNames`. `None` (no filter) when empty.
    fn to_matcher_config(&self) -> Option<MatcherConfig> {
        match (self.names.is_empty(), &self.pattern) {
            (true, None) => None,
            (false, None) => Some(MatcherConfig::new(
                "byNames",
                serde_json::json!(self.names),
            )),
            (true, Some(pattern)) => Some(MatcherConfig::new(
                "byRegexp",
                serde_json::json!(pattern),
            )),
            (false, Some(pattern)) => Some(MatcherConfig::new(
                "byRegexpOrNames",
                serde_json::json!({ "pattern": pattern, "names": self.names }),
            )),
        }
    }
}

/// Build a `filterFieldsByName` operator.
pub fn by_name_operator(options: FilterFieldsByNameOptions) -> TransformResult<TransformOperator> {
    operator(FilterFieldsOptions {
        include: options.include.as_ref().and_then(NameFilter::to_matcher_config),
        exclude: options.exclude.as_ref().and_then(NameFilter::to_matcher_config),
    })
}
