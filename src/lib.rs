//! `frame-transforms` is a small engine for reshaping tabular query results:
//! an in-memory [`frame::Frame`] (typed columns sharing one row count) flows
//! through an ordered pipeline of named, configurable transform operators.
//!
//! The engine has four layers, wired together by a dependency-injected
//! [`registry::Registry`]:
//!
//! - **Matchers** ([`matchers`]): declarative `{id, options}` predicates over
//!   fields, frames, and row values, including the combinators
//!   `anyMatch`/`allMatch`/`invertMatch`.
//! - **Reducers** ([`reducers`]): named functions folding a column to one
//!   scalar (`sum`, `mean`, `last`, ...).
//! - **Transform operators** ([`transforms`]): pure functions from a frame
//!   collection to a frame collection (`filterFields`, `filterByValue`,
//!   `reduce`, `convertFieldType`, `organize`, `seriesToColumns`, ...).
//! - **Pipeline runner** ([`pipeline`]): resolves a saved list of
//!   [`TransformerConfig`]s up front and folds frames through the stages.
//!
//! Configs are plain JSON (the shape persisted by dashboards), so a whole
//! pipeline can be deserialized and run in a few lines:
//!
//! ```rust
//! use frame_transforms::{Field, FieldType, Frame, Registry, TransformerConfig, Value};
//! use frame_transforms::pipeline::transform_frames;
//!
//! let registry = Registry::standard();
//! let configs: Vec<TransformerConfig> = serde_json::from_str(
//!     r#"[
//!         { "id": "filterFields", "options": { "include": { "id": "byType", "options": "number" } } },
//!         { "id": "reduce", "options": { "reducers": ["sum"] } }
//!     ]"#,
//! )
//! .unwrap();
//!
//! let frame = Frame::new(vec![
//!     Field::new("Time", FieldType::Time, vec![Value::Time(1), Value::Time(2), Value::Time(3)]),
//!     Field::new("Value", FieldType::Number, vec![
//!         Value::Number(1.0), Value::Number(2.0), Value::Number(3.0),
//!     ]),
//! ]);
//!
//! let out = transform_frames(&registry, &configs, vec![frame]).unwrap();
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].fields[0].values, vec![Value::Number(6.0)]);
//! ```
//!
//! ## Error model
//!
//! Resolution is the error boundary: unknown ids and malformed options fail
//! synchronously (`Unknown field matcher: <id>`, `Unknown reducer: <id>`, ...)
//! before any data is touched, so callers can surface a saved-config problem
//! to the user and skip the stage. Once resolved, stages never fail: a filter
//! naming a missing field is logged and skipped, and a cell that cannot be
//! coerced becomes [`Value::Null`] rather than poisoning its column.
//!
//! ## Purity
//!
//! Every operator is a deterministic, single-threaded, pure function: no I/O,
//! no shared mutable state, and input frames are never written through;
//! stages build new frames out of cloned fields. Hosts are free to wrap
//! operators in whatever streaming or async machinery they use; the engine is
//! just `Vec<Frame>` in, `Vec<Frame>` out.
//!
//! ## Modules
//!
//! - [`frame`]: the data model (frames, fields, values, labels)
//! - [`matchers`]: field/frame/value matcher catalogues
//! - [`reducers`]: scalar reducer catalogue
//! - [`transforms`]: the transform operator families
//! - [`registry`]: id → factory resolution
//! - [`pipeline`]: the stage runner
//! - [`observability`]: per-stage observer hooks
//! - [`error`]: the shared error type

pub mod error;
pub mod frame;
pub mod matchers;
pub mod observability;
pub mod pipeline;
pub mod reducers;
pub mod registry;
pub mod transforms;

pub use error::{TransformError, TransformResult};
pub use frame::{Field, FieldConfig, FieldType, Frame, Labels, Value};
pub use matchers::MatcherConfig;
pub use pipeline::{Pipeline, transform_frames};
pub use registry::{Registry, TransformerConfig};
