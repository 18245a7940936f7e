//! Field matchers: predicates selecting columns within a frame.

use serde::Deserialize;

use crate::error::{TransformError, TransformResult};
use crate::frame::{Field, FieldType, Frame};

use super::{MatcherConfig, compile_regex, parse_options};

/// A resolved field predicate.
///
/// The `field` reference is always a borrow out of `frame.fields`; the
/// positional matchers (`first`, `firstTimeField`) rely on that to compare by
/// address.
pub type FieldMatcher = Box<dyn Fn(&Field, &Frame, &[Frame]) -> bool + Send + Sync>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RegexpOrNamesOptions {
    pattern: Option<String>,
    names: Vec<String>,
}

pub(crate) fn resolve_field_matcher(config: &MatcherConfig) -> TransformResult<FieldMatcher> {
    let id = config.id.as_str();
    match id {
        "byType" => {
            let wanted: FieldType = parse_options(id, &config.options)?;
            Ok(Box::new(move |field, _, _| field.field_type == wanted))
        }
        "numeric" => Ok(Box::new(|field, _, _| field.field_type == FieldType::Number)),
        "time" => Ok(Box::new(|field, _, _| field.field_type == FieldType::Time)),
        "byName" => {
            let name: String = parse_options(id, &config.options)?;
            Ok(Box::new(move |field, _, _| {
                field.display_name() == name || field.name == name
            }))
        }
        "byNames" => {
            let names: Vec<String> = parse_options(id, &config.options)?;
            Ok(Box::new(move |field, _, _| {
                let display = field.display_name();
                names.iter().any(|n| *n == display || *n == field.name)
            }))
        }
        "byRegexp" => {
            let pattern: String = parse_options(id, &config.options)?;
            let re = compile_regex(&pattern)?;
            Ok(Box::new(move |field, _, _| re.is_match(&field.display_name())))
        }
        "byRegexpOrNames" => {
            let opts: RegexpOrNamesOptions = parse_options(id, &config.options)?;
            let re = opts.pattern.as_deref().map(compile_regex).transpose()?;
            let names = opts.names;
            Ok(Box::new(move |field, _, _| {
                let display = field.display_name();
                names.iter().any(|n| *n == display || *n == field.name)
                    || re.as_ref().is_some_and(|re| re.is_match(&display))
            }))
        }
        "byFrameRefID" => {
            let ref_id: String = parse_options(id, &config.options)?;
            Ok(Box::new(move |_, frame, _| {
                frame.ref_id.as_deref() == Some(ref_id.as_str())
            }))
        }
        "first" => Ok(Box::new(|field, frame, _| {
            frame.fields.first().is_some_and(|f| std::ptr::eq(f, field))
        })),
        "firstTimeField" => Ok(Box::new(|field, frame, _| {
            frame.first_time_field().is_some_and(|f| std::ptr::eq(f, field))
        })),
        "anyMatch" => {
            let children = resolve_children(id, &config.options)?;
            Ok(Box::new(move |field, frame, all| {
                children.iter().any(|m| m(field, frame, all))
            }))
        }
        "allMatch" => {
            let children = resolve_children(id, &config.options)?;
            Ok(Box::new(move |field, frame, all| {
                children.iter().all(|m| m(field, frame, all))
            }))
        }
        "invertMatch" => {
            let child: MatcherConfig = parse_options(id, &config.options)?;
            let inner = resolve_field_matcher(&child)?;
            Ok(Box::new(move |field, frame, all| !inner(field, frame, all)))
        }
        "alwaysMatch" => Ok(Box::new(|_, _, _| true)),
        "neverMatch" => Ok(Box::new(|_, _, _| false)),
        _ => Err(TransformError::UnknownFieldMatcher { id: id.to_string() }),
    }
}

fn resolve_children(id: &str, options: &serde_json::Value) -> TransformResult<Vec<FieldMatcher>> {
    let configs: Vec<MatcherConfig> = parse_options(id, options)?;
    configs.iter().map(resolve_field_matcher).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Labels, Value};
    use serde_json::json;

    fn sample_frame() -> Frame {
        Frame::new(vec![
            Field::new("Time", FieldType::Time, vec![Value::Time(0)]),
            Field::new("Value", FieldType::Number, vec![Value::Number(1.0)]),
            Field::new("host", FieldType::String, vec![Value::String("a".into())]),
        ])
        .with_ref_id("A")
    }

    fn matches_of(config: &MatcherConfig, frame: &Frame) -> Vec<String> {
        let matcher = resolve_field_matcher(config).unwrap();
        let all = std::slice::from_ref(frame);
        frame
            .fields
            .iter()
            .filter(|f| matcher(f, frame, all))
            .map(|f| f.name.clone())
            .collect()
    }

    #[test]
    fn by_type_compares_tag_strictly() {
        let frame = sample_frame();
        let config = MatcherConfig::new("byType", json!("number"));
        assert_eq!(matches_of(&config, &frame), vec!["Value"]);
        let config = MatcherConfig::id_only("time");
        assert_eq!(matches_of(&config, &frame), vec!["Time"]);
        let config = MatcherConfig::id_only("numeric");
        assert_eq!(matches_of(&config, &frame), vec!["Value"]);
    }

    #[test]
    fn by_name_uses_display_name() {
        let mut frame = sample_frame();
        frame.fields[1].labels = Labels::from([("instance".to_string(), "a".to_string())]);
        let config = MatcherConfig::new("byName", json!("Value {instance=\"a\"}"));
        assert_eq!(matches_of(&config, &frame), vec!["Value"]);
        // Raw name still matches as a fallback.
        let config = MatcherConfig::new("byName", json!("Value"));
        assert_eq!(matches_of(&config, &frame), vec!["Value"]);
    }

    #[test]
    fn by_names_and_regexp() {
        let frame = sample_frame();
        let config = MatcherConfig::new("byNames", json!(["Time", "host"]));
        assert_eq!(matches_of(&config, &frame), vec!["Time", "host"]);
        let config = MatcherConfig::new("byRegexp", json!("^h"));
        assert_eq!(matches_of(&config, &frame), vec!["host"]);
        let config = MatcherConfig::new(
            "byRegexpOrNames",
            json!({"pattern": "^T", "names": ["host"]}),
        );
        assert_eq!(matches_of(&config, &frame), vec!["Time", "host"]);
    }

    #[test]
    fn positional_matchers() {
        let frame = sample_frame();
        let config = MatcherConfig::id_only("first");
        assert_eq!(matches_of(&config, &frame), vec!["Time"]);
        let config = MatcherConfig::id_only("firstTimeField");
        assert_eq!(matches_of(&config, &frame), vec!["Time"]);
    }

    #[test]
    fn by_frame_ref_id_inspects_the_frame() {
        let frame = sample_frame();
        let config = MatcherConfig::new("byFrameRefID", json!("A"));
        assert_eq!(matches_of(&config, &frame).len(), 3);
        let config = MatcherConfig::new("byFrameRefID", json!("B"));
        assert!(matches_of(&config, &frame).is_empty());
    }

    #[test]
    fn combinator_truth_table() {
        let frame = sample_frame();
        // allMatch over [] is vacuously true, anyMatch over [] is false.
        assert_eq!(matches_of(&MatcherConfig::new("allMatch", json!([])), &frame).len(), 3);
        assert!(matches_of(&MatcherConfig::new("anyMatch", json!([])), &frame).is_empty());
        assert_eq!(matches_of(&MatcherConfig::id_only("alwaysMatch"), &frame).len(), 3);
        assert!(matches_of(&MatcherConfig::id_only("neverMatch"), &frame).is_empty());

        let invert = MatcherConfig::new("invertMatch", json!({"id": "byType", "options": "number"}));
        assert_eq!(matches_of(&invert, &frame), vec!["Time", "host"]);

        let any = MatcherConfig::new(
            "anyMatch",
            json!([{"id": "time"}, {"id": "byName", "options": "host"}]),
        );
        assert_eq!(matches_of(&any, &frame), vec!["Time", "host"]);
    }

    #[test]
    fn unknown_id_errors_with_id() {
        let err = resolve_field_matcher(&MatcherConfig::id_only("not-a-real-id")).err().unwrap();
        assert_eq!(err.to_string(), "Unknown field matcher: not-a-real-id");
    }

    #[test]
    fn invalid_regex_is_a_config_error() {
        let err = resolve_field_matcher(&MatcherConfig::new("byRegexp", json!("("))).err().unwrap();
        assert!(matches!(err, TransformError::InvalidRegex { .. }));
    }
}
