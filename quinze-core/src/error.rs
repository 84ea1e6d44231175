//! Error types raised by the analysis engine.

use std::time::Duration;

use thiserror::Error;

/// Reasons a search request is rejected before any work is done.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    /// The request did not include a reference location.
    #[error("request must include a location")]
    MissingCenter,
    /// The reference location had a NaN or infinite component.
    #[error("location coordinates must be finite")]
    NonFiniteCenter,
    /// No POI requirements were supplied.
    #[error("request must include at least one POI requirement")]
    NoRequirements,
    /// A requirement named an empty POI type.
    #[error("POI requirement {index} has an empty type")]
    EmptyPoiType {
        /// Position of the requirement in the request.
        index: usize,
    },
    /// A requirement's importance was outside `1..=4`.
    #[error("importance for POI type '{poi_type}' must be between 1 and 4, got {importance}")]
    ImportanceOutOfRange {
        /// Category whose importance was rejected.
        poi_type: String,
        /// Importance as supplied by the caller.
        importance: i64,
    },
    /// The time budget was zero or negative.
    #[error("max_time must be positive, got {value}")]
    NonPositiveMaxTime {
        /// Value supplied by the caller.
        value: i64,
    },
    /// The grid resolution was zero or negative.
    #[error("grid_resolution must be positive, got {value}")]
    NonPositiveGridResolution {
        /// Value supplied by the caller.
        value: i64,
    },
    /// The number of requested locations was zero or negative.
    #[error("top_locations must be positive, got {value}")]
    NonPositiveTopK {
        /// Value supplied by the caller.
        value: i64,
    },
    /// A numeric parameter exceeded its supported range.
    #[error("{field} is too large: {value}")]
    TooLarge {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied by the caller.
        value: i64,
    },
}

/// Errors returned by [`GridScorer::analyze`](crate::GridScorer::analyze).
///
/// An unreachable POI backend is not an error: the affected category simply
/// contributes nothing to any cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The request was structurally invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestValidationError),
    /// An internal invariant failed, e.g. a degenerate analysis box.
    #[error("analysis failed: {reason}")]
    Computation {
        /// Description of the failure.
        reason: String,
    },
    /// The caller cancelled the analysis.
    #[error("analysis was cancelled")]
    Cancelled,
    /// The analysis ran past its configured deadline.
    #[error("analysis exceeded its deadline of {limit:?}")]
    DeadlineExceeded {
        /// Configured wall-clock limit.
        limit: Duration,
    },
}
