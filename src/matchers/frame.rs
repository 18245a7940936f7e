//! Frame matchers: predicates selecting whole tables out of a collection.
//!
//! Predicates receive the frame plus its index within the full input
//! collection, which is what `byIndex` dispatches on.

use crate::error::{TransformError, TransformResult};
use crate::frame::Frame;

use super::{MatcherConfig, compile_regex, parse_options};

/// A resolved frame predicate. `index` is the frame's position in the full
/// input collection passed to the top-level transform call.
pub type FrameMatcher = Box<dyn Fn(&Frame, usize) -> bool + Send + Sync>;

pub(crate) fn resolve_frame_matcher(config: &MatcherConfig) -> TransformResult<FrameMatcher> {
    let id = config.id.as_str();
    match id {
        "byName" => {
            let pattern: String = parse_options(id, &config.options)?;
            let re = compile_regex(&pattern)?;
            Ok(Box::new(move |frame, _| {
                frame.name.as_deref().is_some_and(|n| re.is_match(n))
            }))
        }
        "byRefId" => {
            let pattern: String = parse_options(id, &config.options)?;
            let re = compile_regex(&pattern)?;
            Ok(Box::new(move |frame, _| {
                frame.ref_id.as_deref().is_some_and(|r| re.is_match(r))
            }))
        }
        "byIndex" => {
            let wanted: usize = parse_options(id, &config.options)?;
            Ok(Box::new(move |_, index| index == wanted))
        }
        "byLabel" => {
            // Options are "key=value" (exact pair) or just "key" (presence).
            let spec: String = parse_options(id, &config.options)?;
            Ok(Box::new(move |frame, _| {
                let (key, value) = match spec.split_once('=') {
                    Some((k, v)) => (k, Some(v)),
                    None => (spec.as_str(), None),
                };
                frame.fields.iter().any(|f| match f.labels.get(key) {
                    Some(found) => value.is_none_or(|v| v == found),
                    None => false,
                })
            }))
        }
        "anyMatch" => {
            let children = resolve_children(id, &config.options)?;
            Ok(Box::new(move |frame, index| {
                children.iter().any(|m| m(frame, index))
            }))
        }
        "allMatch" => {
            let children = resolve_children(id, &config.options)?;
            Ok(Box::new(move |frame, index| {
                children.iter().all(|m| m(frame, index))
            }))
        }
        "invertMatch" => {
            let child: MatcherConfig = parse_options(id, &config.options)?;
            let inner = resolve_frame_matcher(&child)?;
            Ok(Box::new(move |frame, index| !inner(frame, index)))
        }
        "alwaysMatch" => Ok(Box::new(|_, _| true)),
        "neverMatch" => Ok(Box::new(|_, _| false)),
        _ => Err(TransformError::UnknownFrameMatcher { id: id.to_string() }),
    }
}

fn resolve_children(id: &str, options: &serde_json::Value) -> TransformResult<Vec<FrameMatcher>> {
    let configs: Vec<MatcherConfig> = parse_options(id, options)?;
    configs.iter().map(resolve_frame_matcher).collect()
}
