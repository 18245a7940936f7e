//! Field housekeeping: `order`, `rename`, `organize`, `renameByRegex`.
//!
//! All four key off a field's current display name. `organize` composes three
//! steps in sequence: drop fields flagged in `excludeByName`, reorder per
//! `indexByName`, then apply `renameByName`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::{Field, Frame};
use crate::matchers::compile_regex;

use super::{TransformOperator, frame_with_fields};

/// Options for `order`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderFieldsOptions {
    /// Display name → target position. Unlisted fields sort to the end,
    /// keeping their relative order.
    pub index_by_name: BTreeMap<String, usize>,
}

/// Build an `order` operator.
pub fn operator(options: OrderFieldsOptions) -> TransformResult<TransformOperator> {
    let index_by_name = options.index_by_name;
    if index_by_name.is_empty() {
        return Ok(Box::new(|frames| frames));
    }
    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .map(|frame| {
                let mut fields = frame.fields.clone();
                fields.sort_by_key(|field| {
                    index_by_name
                        .get(&field.display_name())
                        .copied()
                        .unwrap_or(usize::MAX)
                });
                frame_with_fields(&frame, fields)
            })
            .collect()
    }))
}

/// Options for `rename`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenameFieldsOptions {
    /// Current display name → replacement. Empty replacements are ignored.
    pub rename_by_name: BTreeMap<String, String>,
}

/// Build a `rename` operator.
pub fn rename_operator(options: RenameFieldsOptions) -> TransformResult<TransformOperator> {
    let rename_by_name = options.rename_by_name;
    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .map(|frame| {
                let fields = frame
                    .fields
                    .iter()
                    .map(|field| rename_field(field, &rename_by_name))
                    .collect();
                frame_with_fields(&frame, fields)
            })
            .collect()
    }))
}

fn rename_field(field: &Field, rename_by_name: &BTreeMap<String, String>) -> Field {
    match rename_by_name.get(&field.display_name()) {
        Some(rename) if !rename.is_empty() => {
            let mut out = field.clone();
            out.config.display_name = Some(rename.clone());
            out
        }
        _ => field.clone(),
    }
}

/// Options for `organize`: exclude, then order, then rename.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizeFieldsOptions {
    /// Display name → `true` drops the field.
    pub exclude_by_name: BTreeMap<String, bool>,
    pub index_by_name: BTreeMap<String, usize>,
    pub rename_by_name: BTreeMap<String, String>,
}

/// Build an `organize` operator.
pub fn organize_operator(options: OrganizeFieldsOptions) -> TransformResult<TransformOperator> {
    let order = operator(OrderFieldsOptions {
        index_by_name: options.index_by_name,
    })?;
    let rename = rename_operator(RenameFieldsOptions {
        rename_by_name: options.rename_by_name,
    })?;
    let exclude_by_name = options.exclude_by_name;
    Ok(Box::new(move |frames: Vec<Frame>| {
        let filtered: Vec<Frame> = frames
            .into_iter()
            .filter_map(|frame| {
                let fields: Vec<Field> = frame
                    .fields
                    .iter()
                    .filter(|f| exclude_by_name.get(&f.display_name()) != Some(&true))
                    .cloned()
                    .collect();
                if fields.is_empty() {
                    None
                } else {
                    Some(frame_with_fields(&frame, fields))
                }
            })
            .collect();
        rename(order(filtered))
    }))
}

/// Options for `renameByRegex`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenameByRegexOptions {
    /// Pattern matched against each field's display name.
    pub regex: String,
    /// Replacement, with `$1`-style capture references.
    pub rename_pattern: String,
}

/// Build a `renameByRegex` operator.
pub fn rename_by_regex_operator(options: RenameByRegexOptions) -> TransformResult<TransformOperator> {
    let re = compile_regex(&options.regex)?;
    let pattern = options.rename_pattern;
    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .map(|frame| {
                let fields = frame
                    .fields
                    .iter()
                    .map(|field| {
                        let display = field.display_name();
                        let renamed = re.replace(&display, pattern.as_str());
                        if renamed != display {
                            let mut out = field.clone();
                            out.config.display_name = Some(renamed.into_owned());
                            out
                        } else {
                            field.clone()
                        }
                    })
                    .collect();
                frame_with_fields(&frame, fields)
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FieldType, Value};

    fn sample_frame() -> Frame {
        Frame::new(vec![
            Field::new("b", FieldType::Number, vec![Value::Number(1.0)]),
            Field::new("c", FieldType::Number, vec![Value::Number(2.0)]),
            Field::new("a", FieldType::Number, vec![Value::Number(3.0)]),
        ])
    }

    fn names(frame: &Frame) -> Vec<String> {
        frame.fields.iter().map(|f| f.display_name()).collect()
    }

    #[test]
    fn order_sorts_listed_fields_and_appends_the_rest() {
        let op = operator(OrderFieldsOptions {
            index_by_name: BTreeMap::from([("a".to_string(), 0), ("b".to_string(), 1)]),
        })
        .unwrap();
        let out = op(vec![sample_frame()]);
        assert_eq!(names(&out[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn order_is_idempotent() {
        let options = OrderFieldsOptions {
            index_by_name: BTreeMap::from([("a".to_string(), 0)]),
        };
        let once = operator(options.clone()).unwrap()(vec![sample_frame()]);
        let twice = operator(options).unwrap()(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn order_with_empty_map_is_a_noop() {
        let frames = vec![sample_frame()];
        let op = operator(OrderFieldsOptions::default()).unwrap();
        assert_eq!(op(frames.clone()), frames);
    }

    #[test]
    fn rename_sets_display_name_and_skips_empty() {
        let op = rename_operator(RenameFieldsOptions {
            rename_by_name: BTreeMap::from([
                ("a".to_string(), "alpha".to_string()),
                ("b".to_string(), "".to_string()),
            ]),
        })
        .unwrap();
        let out = op(vec![sample_frame()]);
        assert_eq!(names(&out[0]), vec!["b", "c", "alpha"]);
        // Raw name is untouched; only the display override changes.
        assert_eq!(out[0].fields[2].name, "a");
    }

    #[test]
    fn organize_excludes_orders_then_renames() {
        let op = organize_operator(OrganizeFieldsOptions {
            exclude_by_name: BTreeMap::from([("c".to_string(), true)]),
            index_by_name: BTreeMap::from([("a".to_string(), 0), ("b".to_string(), 1)]),
            rename_by_name: BTreeMap::from([("a".to_string(), "alpha".to_string())]),
        })
        .unwrap();
        let out = op(vec![sample_frame()]);
        assert_eq!(names(&out[0]), vec!["alpha", "b"]);
    }

    #[test]
    fn organize_drops_fully_excluded_frames() {
        let op = organize_operator(OrganizeFieldsOptions {
            exclude_by_name: BTreeMap::from([
                ("a".to_string(), true),
                ("b".to_string(), true),
                ("c".to_string(), true),
            ]),
            ..Default::default()
        })
        .unwrap();
        assert!(op(vec![sample_frame()]).is_empty());
    }

    #[test]
    fn rename_by_regex_rewrites_with_captures() {
        let frame = Frame::new(vec![
            Field::new("server.cpu", FieldType::Number, vec![]),
            Field::new("other", FieldType::Number, vec![]),
        ]);
        let op = rename_by_regex_operator(RenameByRegexOptions {
            regex: r"^server\.(.*)$".into(),
            rename_pattern: "$1".into(),
        })
        .unwrap();
        let out = op(vec![frame]);
        assert_eq!(names(&out[0]), vec!["cpu", "other"]);
        assert_eq!(out[0].fields[0].name, "server.cpu");
    }

    #[test]
    fn rename_by_regex_rejects_invalid_patterns() {
        let err = rename_by_regex_operator(RenameByRegexOptions {
            regex: "(".into(),
            rename_pattern: "$1".into(),
        })
        .err().unwrap();
        assert!(err.to_string().contains("invalid regex"));
    }
}
