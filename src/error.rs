use thiserror::Error;

/// Convenience result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Error type returned when resolving matcher, reducer, or transformer configs.
///
/// Every variant is a configuration error: it is raised while a saved config is
/// being resolved into callable stages, before any frame data is touched. Data
/// problems encountered while a resolved stage runs (a filter naming a missing
/// field, an unparseable cell) are downgraded to warnings or `Null` cells and
/// never surface here.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A field matcher config referenced an id that is not registered.
    #[error("Unknown field matcher: {id}")]
    UnknownFieldMatcher { id: String },

    /// A frame matcher config referenced an id that is not registered.
    #[error("Unknown frame matcher: {id}")]
    UnknownFrameMatcher { id: String },

    /// A value matcher config referenced an id that is not registered.
    #[error("Unknown value matcher: {id}")]
    UnknownValueMatcher { id: String },

    /// A reducer id is not part of the reducer catalogue.
    #[error("Unknown reducer: {id}")]
    UnknownReducer { id: String },

    /// A transformer config referenced an id that is not registered.
    #[error("Unknown transformer: {id}")]
    UnknownTransformer { id: String },

    /// The `options` payload of a matcher/transformer config did not
    /// deserialize into the shape that id expects.
    #[error("invalid options for '{id}': {source}")]
    InvalidOptions {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A matcher or transformer was configured with an invalid regular expression.
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
