//! Observer hooks for pipeline execution.
//!
//! Hosts that want per-stage visibility (metrics, slow-stage logging) attach a
//! [`PipelineObserver`] to a [`crate::pipeline::Pipeline`]. Observers see
//! stage boundaries only; they cannot alter data.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Context reported after each pipeline stage runs.
#[derive(Debug, Clone)]
pub struct StageEvent<'a> {
    /// Zero-based stage position in the pipeline.
    pub index: usize,
    /// Transformer id of the stage.
    pub id: &'a str,
    /// Frame count flowing into the stage.
    pub frames_in: usize,
    /// Frame count produced by the stage.
    pub frames_out: usize,
    /// Wall time the stage took.
    pub elapsed: Duration,
}

/// Observer interface for pipeline stage outcomes.
///
/// Implementors can record metrics or logs; all callbacks default to no-ops.
pub trait PipelineObserver: Send + Sync {
    /// Called after each stage completes.
    fn on_stage(&self, _event: &StageEvent<'_>) {}

    /// Called once after the final stage, with the stage count and total time.
    fn on_complete(&self, _stages: usize, _elapsed: Duration) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a composite from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_stage(&self, event: &StageEvent<'_>) {
        for o in &self.observers {
            o.on_stage(event);
        }
    }

    fn on_complete(&self, stages: usize, elapsed: Duration) {
        for o in &self.observers {
            o.on_complete(stages, elapsed);
        }
    }
}

/// Logs stage events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_stage(&self, event: &StageEvent<'_>) {
        eprintln!(
            "[transform][stage {}] id={} frames_in={} frames_out={} elapsed={:?}",
            event.index, event.id, event.frames_in, event.frames_out, event.elapsed
        );
    }

    fn on_complete(&self, stages: usize, elapsed: Duration) {
        eprintln!("[transform][done] stages={stages} elapsed={elapsed:?}");
    }
}
