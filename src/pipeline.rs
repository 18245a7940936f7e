//! Pipeline runner: thread a frame collection through configured stages.
//!
//! A [`Pipeline`] resolves its whole stage list up front, so every
//! configuration error (unknown id, malformed options, bad regex) surfaces
//! before any data flows. Running a resolved pipeline never fails: each stage
//! is a pure function from frames to frames, applied in order.
//!
//! ```rust
//! use frame_transforms::{Field, FieldType, Frame, Registry, TransformerConfig, Value};
//! use frame_transforms::pipeline::Pipeline;
//! use serde_json::json;
//!
//! let registry = Registry::standard();
//! let configs = vec![
//!     TransformerConfig::new("filterFields", json!({
//!         "include": { "id": "byType", "options": "number" }
//!     })),
//!     TransformerConfig::new("reduce", json!({ "reducers": ["sum"] })),
//! ];
//! let pipeline = Pipeline::new(&registry, &configs).unwrap();
//!
//! let frame = Frame::new(vec![
//!     Field::new("Time", FieldType::Time, vec![Value::Time(1), Value::Time(2)]),
//!     Field::new("Value", FieldType::Number, vec![Value::Number(1.0), Value::Number(2.0)]),
//! ]);
//! let out = pipeline.run(vec![frame]);
//! assert_eq!(out[0].fields[0].values, vec![Value::Number(3.0)]);
//! ```

use std::sync::Arc;
use std::time::Instant;

use crate::frame::Frame;
use crate::error::TransformResult;
use crate::observability::{PipelineObserver, StageEvent};
use crate::registry::{Registry, TransformerConfig};
use crate::transforms::TransformOperator;

struct Stage {
    id: String,
    operator: TransformOperator,
}

/// An ordered list of resolved transform stages.
pub struct Pipeline {
    stages: Vec<Stage>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl Pipeline {
    /// Resolve `configs` against `registry` into a runnable pipeline.
    ///
    /// Fails on the first configuration error; no data has been touched at
    /// that point.
    pub fn new(registry: &Registry, configs: &[TransformerConfig]) -> TransformResult<Self> {
        let stages = configs
            .iter()
            .map(|config| {
                Ok(Stage {
                    id: config.id.clone(),
                    operator: registry.transformer(config)?,
                })
            })
            .collect::<TransformResult<Vec<_>>>()?;
        Ok(Self {
            stages,
            observer: None,
        })
    }

    /// Attach an observer receiving per-stage events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` for a pipeline with no stages (which is the identity).
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply every stage in order, feeding each stage's output to the next.
    pub fn run(&self, mut frames: Vec<Frame>) -> Vec<Frame> {
        let started = Instant::now();
        for (index, stage) in self.stages.iter().enumerate() {
            let stage_started = Instant::now();
            let frames_in = frames.len();
            frames = (stage.operator)(frames);
            if let Some(observer) = &self.observer {
                observer.on_stage(&StageEvent {
                    index,
                    id: &stage.id,
                    frames_in,
                    frames_out: frames.len(),
                    elapsed: stage_started.elapsed(),
                });
            }
        }
        if let Some(observer) = &self.observer {
            observer.on_complete(self.stages.len(), started.elapsed());
        }
        frames
    }
}

/// Resolve and run a pipeline in one call.
pub fn transform_frames(
    registry: &Registry,
    configs: &[TransformerConfig],
    frames: Vec<Frame>,
) -> TransformResult<Vec<Frame>> {
    Ok(Pipeline::new(registry, configs)?.run(frames))
}
