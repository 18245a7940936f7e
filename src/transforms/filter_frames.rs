//! `filterFrames` / `filterFramesByRefId`: keep or drop whole frames.
//!
//! Same include/exclude precedence as `filterFields`, at frame granularity.

use serde::{Deserialize, Serialize};

use crate::error::TransformResult;
use crate::frame::Frame;
use crate::matchers::{MatcherConfig, resolve_frame_matcher};

use super::TransformOperator;

/// Options for `filterFrames`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterFramesOptions {
    /// Frames to keep. `None` keeps everything not excluded.
    pub include: Option<MatcherConfig>,
    /// Frames to drop. Takes precedence over `include`.
    pub exclude: Option<MatcherConfig>,
}

/// Build a `filterFrames` operator.
pub fn operator(options: FilterFramesOptions) -> TransformResult<TransformOperator> {
    let include = options.include.as_ref().map(resolve_frame_matcher).transpose()?;
    let exclude = options.exclude.as_ref().map(resolve_frame_matcher).transpose()?;

    if include.is_none() && exclude.is_none() {
        return Ok(Box::new(|frames| frames));
    }

    Ok(Box::new(move |frames: Vec<Frame>| {
        frames
            .into_iter()
            .enumerate()
            .filter(|(index, frame)| {
                if exclude.as_ref().is_some_and(|m| m(frame, *index)) {
                    return false;
                }
                include.as_ref().is_none_or(|m| m(frame, *index))
            })
            .map(|(_, frame)| frame)
            .collect()
    }))
}

/// Options for `filterFramesByRefId`: sugar over `filterFrames` mapping refId
/// lists to `byRefId` matchers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterFramesByRefIdOptions {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

fn ref_ids_to_matcher(ref_ids: &[String]) -> Option<MatcherConfig> {
    if ref_ids.is_empty() {
        return None;
    }
    let escaped: Vec<String> = ref_ids.iter().map(|id| regex::escape(id)).collect();
    let pattern = format!("^(?:{})$", escaped.join("|"));
    Some(MatcherConfig::new("byRefId", serde_json::json!(pattern)))
}

/// Build a `filterFramesByRefId` operator.
pub fn by_ref_id_operator(options: FilterFramesByRefIdOptions) -> TransformResult<TransformOperator> {
    operator(FilterFramesOptions {
        include: ref_ids_to_matcher(&options.include),
        exclude: ref_ids_to_matcher(&options.exclude),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frames() -> Vec<Frame> {
        vec![
            Frame::new(vec![]).with_name("one").with_ref_id("A"),
            Frame::new(vec![]).with_name("two").with_ref_id("B"),
            Frame::new(vec![]).with_name("three").with_ref_id("C"),
        ]
    }

    fn names(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(|f| f.name.as_deref().unwrap()).collect()
    }

    #[test]
    fn include_keeps_matching_frames() {
        let op = operator(FilterFramesOptions {
            include: Some(MatcherConfig::new("byRefId", json!("A|C"))),
            exclude: None,
        })
        .unwrap();
        assert_eq!(names(&op(frames())), vec!["one", "three"]);
    }

    #[test]
    fn exclude_wins_over_include() {
        let op = operator(FilterFramesOptions {
            include: Some(MatcherConfig::id_only("alwaysMatch")),
            exclude: Some(MatcherConfig::new("byName", json!("two"))),
        })
        .unwrap();
        assert_eq!(names(&op(frames())), vec!["one", "three"]);
    }

    #[test]
    fn by_ref_id_sugar_matches_exact_ids() {
        let op = by_ref_id_operator(FilterFramesByRefIdOptions {
            include: vec!["A".into(), "B".into()],
            exclude: vec![],
        })
        .unwrap();
        assert_eq!(names(&op(frames())), vec!["one", "two"]);
    }

    #[test]
    fn empty_options_pass_everything_through() {
        let op = by_ref_id_operator(FilterFramesByRefIdOptions::default()).unwrap();
        assert_eq!(op(frames()).len(), 3);
    }
}
