//! The transform catalogue: an explicitly constructed registry resolving
//! `{id, options}` configs into callable matchers and operators.
//!
//! There is no global state here: hosts build a [`Registry`] (usually
//! [`Registry::standard`]) at startup and pass it to whatever runs pipelines.
//! Custom transformers can be added with [`Registry::register_transformer`];
//! the matcher catalogues are closed sets.
//!
//! Resolution is the error boundary of the whole engine: an unknown id or a
//! malformed options payload fails here, before any frame data is touched.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};
use crate::matchers::{
    FieldMatcher, FrameMatcher, MatcherConfig, ValueMatcher, parse_options,
    resolve_field_matcher, resolve_frame_matcher, resolve_value_matcher,
};
use crate::transforms::{self, TransformOperator};

/// A `{id, options}` pair naming a registered transformer and its
/// configuration. This is the JSON-serializable shape persisted in saved
/// pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerConfig {
    /// Registered transformer id, e.g. `"filterFields"`.
    pub id: String,
    /// Transformer-specific configuration. Defaults to JSON `null`, which
    /// resolves to the transformer's default options.
    #[serde(default)]
    pub options: serde_json::Value,
}

impl TransformerConfig {
    /// Create a config from an id and a JSON options payload.
    pub fn new(id: impl Into<String>, options: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            options,
        }
    }

    /// Create a config with default options.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self::new(id, serde_json::Value::Null)
    }
}

/// A function resolving a JSON options payload into a runnable operator.
pub type TransformerFactory =
    fn(&Registry, &serde_json::Value) -> TransformResult<TransformOperator>;

/// Id → factory catalogue for transformers, plus entry points into the closed
/// matcher catalogues.
pub struct Registry {
    transformers: HashMap<String, TransformerFactory>,
}

impl Registry {
    /// Registry with every built-in transformer.
    pub fn standard() -> Self {
        let mut registry = Self {
            transformers: HashMap::new(),
        };
        let builtins: [(&str, TransformerFactory); 21] = [
            ("noop", noop),
            ("filterFields", filter_fields),
            ("filterFieldsByName", filter_fields_by_name),
            ("filterFrames", filter_frames),
            ("filterFramesByRefId", filter_frames_by_ref_id),
            ("filterByValue", filter_by_value),
            ("calculateField", calculate_field),
            ("reduce", reduce),
            ("convertFieldType", convert_field_type),
            ("ensureColumns", ensure_columns),
            ("seriesToColumns", series_to_columns),
            ("merge", merge),
            ("seriesToRows", series_to_rows),
            ("histogram", histogram),
            ("order", order),
            ("organize", organize),
            ("rename", rename),
            ("renameByRegex", rename_by_regex),
            ("labelsToFields", labels_to_fields),
            ("sortBy", sort_by),
            ("concatenate", concatenate),
        ];
        for (id, factory) in builtins {
            registry.register_transformer(id, factory);
        }
        registry
    }

    /// Add (or replace) a transformer factory under `id`.
    pub fn register_transformer(&mut self, id: impl Into<String>, factory: TransformerFactory) {
        self.transformers.insert(id.into(), factory);
    }

    /// Registered transformer ids, sorted.
    pub fn transformer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve a transformer config into a runnable operator.
    pub fn transformer(&self, config: &TransformerConfig) -> TransformResult<TransformOperator> {
        let factory = self.transformers.get(&config.id).ok_or_else(|| {
            TransformError::UnknownTransformer {
                id: config.id.clone(),
            }
        })?;
        factory(self, &config.options)
    }

    /// Resolve a field matcher config into a predicate.
    pub fn field_matcher(&self, config: &MatcherConfig) -> TransformResult<FieldMatcher> {
        resolve_field_matcher(config)
    }

    /// Resolve a frame matcher config into a predicate.
    pub fn frame_matcher(&self, config: &MatcherConfig) -> TransformResult<FrameMatcher> {
        resolve_frame_matcher(config)
    }

    /// Resolve a value matcher config into a per-row predicate.
    pub fn value_matcher(&self, config: &MatcherConfig) -> TransformResult<ValueMatcher> {
        resolve_value_matcher(config)
    }
}

/// Parse transformer options, treating JSON `null` (no options configured) as
/// the transformer's defaults.
fn options_or_default<T: DeserializeOwned + Default>(
    id: &str,
    options: &serde_json::Value,
) -> TransformResult<T> {
    if options.is_null() {
        Ok(T::default())
    } else {
        parse_options(id, options)
    }
}

fn noop(_: &Registry, _: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::noop::operator()
}

fn filter_fields(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::filter_fields::operator(options_or_default("filterFields", options)?)
}

fn filter_fields_by_name(
    _: &Registry,
    options: &serde_json::Value,
) -> TransformResult<TransformOperator> {
    transforms::filter_fields::by_name_operator(options_or_default("filterFieldsByName", options)?)
}

fn filter_frames(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::filter_frames::operator(options_or_default("filterFrames", options)?)
}

fn filter_frames_by_ref_id(
    _: &Registry,
    options: &serde_json::Value,
) -> TransformResult<TransformOperator> {
    transforms::filter_frames::by_ref_id_operator(options_or_default(
        "filterFramesByRefId",
        options,
    )?)
}

fn filter_by_value(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::filter_by_value::operator(options_or_default("filterByValue", options)?)
}

fn calculate_field(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::calculate_field::operator(options_or_default("calculateField", options)?)
}

fn reduce(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::reduce::operator(options_or_default("reduce", options)?)
}

fn convert_field_type(
    _: &Registry,
    options: &serde_json::Value,
) -> TransformResult<TransformOperator> {
    transforms::convert_field_type::operator(options_or_default("convertFieldType", options)?)
}

fn ensure_columns(_: &Registry, _: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::join::ensure_columns_operator()
}

fn series_to_columns(
    _: &Registry,
    options: &serde_json::Value,
) -> TransformResult<TransformOperator> {
    transforms::join::operator(options_or_default("seriesToColumns", options)?)
}

fn merge(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::merge::operator(options_or_default("merge", options)?)
}

fn series_to_rows(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::series_to_rows::operator(options_or_default("seriesToRows", options)?)
}

fn histogram(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::histogram::operator(options_or_default("histogram", options)?)
}

fn order(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::organize::operator(options_or_default("order", options)?)
}

fn organize(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::organize::organize_operator(options_or_default("organize", options)?)
}

fn rename(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::organize::rename_operator(options_or_default("rename", options)?)
}

fn rename_by_regex(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::organize::rename_by_regex_operator(options_or_default("renameByRegex", options)?)
}

fn labels_to_fields(
    _: &Registry,
    options: &serde_json::Value,
) -> TransformResult<TransformOperator> {
    transforms::labels_to_fields::operator(options_or_default("labelsToFields", options)?)
}

fn sort_by(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::sort_by::operator(options_or_default("sortBy", options)?)
}

fn concatenate(_: &Registry, options: &serde_json::Value) -> TransformResult<TransformOperator> {
    transforms::concatenate::operator(options_or_default("concatenate", options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Field, FieldType, Frame, Value};
    use serde_json::json;

    #[test]
    fn standard_registry_knows_all_builtins() {
        let registry = Registry::standard();
        let ids = registry.transformer_ids();
        assert_eq!(ids.len(), 21);
        assert!(ids.contains(&"filterFields"));
        assert!(ids.contains(&"labelsToFields"));
        assert!(ids.contains(&"merge"));
        assert!(ids.contains(&"seriesToRows"));
        assert!(ids.contains(&"histogram"));
    }

    #[test]
    fn unknown_transformer_errors_with_id() {
        let registry = Registry::standard();
        let err = registry
            .transformer(&TransformerConfig::id_only("not-a-real-id"))
            .err().unwrap();
        assert_eq!(err.to_string(), "Unknown transformer: not-a-real-id");
    }

    #[test]
    fn malformed_options_fail_at_resolution() {
        let registry = Registry::standard();
        let err = registry
            .transformer(&TransformerConfig::new("sortBy", json!({"sort": "nope"})))
            .err().unwrap();
        assert!(matches!(err, TransformError::InvalidOptions { .. }));
        assert!(err.to_string().contains("sortBy"));
    }

    #[test]
    fn resolved_transformer_runs_from_json_config() {
        let registry = Registry::standard();
        let config = TransformerConfig::new(
            "filterFields",
            json!({ "include": { "id": "byType", "options": "number" } }),
        );
        let op = registry.transformer(&config).unwrap();
        let frame = Frame::new(vec![
            Field::new("Time", FieldType::Time, vec![Value::Time(1)]),
            Field::new("Value", FieldType::Number, vec![Value::Number(1.0)]),
        ]);
        let out = op(vec![frame]);
        assert_eq!(out[0].fields.len(), 1);
        assert_eq!(out[0].fields[0].name, "Value");
    }

    #[test]
    fn hosts_can_register_custom_transformers() {
        fn drop_everything(
            _: &Registry,
            _: &serde_json::Value,
        ) -> TransformResult<TransformOperator> {
            Ok(Box::new(|_| Vec::new()))
        }
        let mut registry = Registry::standard();
        registry.register_transformer("dropEverything", drop_everything);
        let op = registry
            .transformer(&TransformerConfig::id_only("dropEverything"))
            .unwrap();
        assert!(op(vec![Frame::new(vec![])]).is_empty());
    }

    #[test]
    fn matcher_entry_points_resolve_and_fail_loudly() {
        let registry = Registry::standard();
        assert!(registry.field_matcher(&MatcherConfig::id_only("numeric")).is_ok());
        assert!(registry.frame_matcher(&MatcherConfig::new("byIndex", json!(0))).is_ok());
        assert!(registry.value_matcher(&MatcherConfig::id_only("isNull")).is_ok());
        let err = registry
            .field_matcher(&MatcherConfig::id_only("not-a-real-id"))
            .err().unwrap();
        assert!(err.to_string().contains("not-a-real-id"));
    }
}
