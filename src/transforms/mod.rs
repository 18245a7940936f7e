//! Transform operators: named, configurable pure functions from a frame
//! collection to a frame collection.
//!
//! Every operator family lives in its own module and exposes a typed options
//! struct plus an `operator(..)` constructor returning a [`TransformOperator`],
//! a boxed `Fn(Vec<Frame>) -> Vec<Frame>`. All configuration work (matcher
//! resolution, regex compilation, reducer lookup) happens inside
//! `operator(..)`, so a misconfigured stage fails before any data flows;
//! running a resolved operator never fails. Data-shape problems found while
//! running (a filter naming a field the frame does not have, an unparseable
//! cell) are logged via [`log::warn!`] and degrade to pass-through or `Null`
//! for the affected field/row.
//!
//! Operators are pure: same input and options produce the same output, no
//! global state, and input frames are never mutated: stages build new frames
//! out of cloned fields. Every operator tolerates an empty input collection.

pub mod calculate_field;
pub mod concatenate;
pub mod convert_field_type;
pub mod filter_by_value;
pub mod filter_fields;
pub mod filter_frames;
pub mod histogram;
pub mod join;
pub mod labels_to_fields;
pub mod merge;
pub mod noop;
pub mod organize;
pub mod reduce;
pub mod series_to_rows;
pub mod sort_by;

use crate::frame::{Field, Frame};

/// A resolved transform stage: a pure function over a frame collection.
pub type TransformOperator = Box<dyn Fn(Vec<Frame>) -> Vec<Frame> + Send + Sync>;

/// Rebuild a frame around a new field list, keeping its identity (name, refId).
pub(crate) fn frame_with_fields(frame: &Frame, fields: Vec<Field>) -> Frame {
    Frame {
        name: frame.name.clone(),
        ref_id: frame.ref_id.clone(),
        fields,
    }
}
