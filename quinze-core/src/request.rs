//! Search requests and their validation.

use std::collections::HashSet;

use crate::{GeoPoint, RequestValidationError, TransportMode};

/// Lowest accepted importance.
pub const MIN_IMPORTANCE: u8 = 1;
/// Highest accepted importance.
pub const MAX_IMPORTANCE: u8 = 4;
/// Score ceiling contributed by each importance step.
pub const SCORE_PER_IMPORTANCE: f64 = 25.0;

/// Default time budget in minutes.
pub const DEFAULT_MAX_TIME_MINUTES: u32 = 15;
/// Default number of samples per grid axis.
pub const DEFAULT_GRID_RESOLUTION: u32 = 75;
/// Default number of ranked locations returned.
pub const DEFAULT_TOP_K: u32 = 5;

/// A weighted POI category the caller wants nearby.
///
/// Importance scales the category's maximum contribution linearly:
/// `max_score = importance × 25`.
///
/// # Examples
/// ```
/// use quinze_core::PoiRequirement;
///
/// let requirement = PoiRequirement::new("supermarkets", 4);
/// assert_eq!(requirement.max_score(), 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoiRequirement {
    /// Category key understood by the POI source.
    pub poi_type: String,
    /// Weight in `1..=4`.
    pub importance: u8,
}

impl PoiRequirement {
    /// Construct a requirement. Call [`AnalysisRequest::validate`] to check
    /// the importance range.
    #[must_use]
    pub fn new(poi_type: impl Into<String>, importance: u8) -> Self {
        Self {
            poi_type: poi_type.into(),
            importance,
        }
    }

    /// Highest contribution this requirement can make to a cell.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "score ceiling is importance times a constant"
    )]
    pub fn max_score(&self) -> f64 {
        f64::from(self.importance) * SCORE_PER_IMPORTANCE
    }
}

/// Parameters for one grid search.
///
/// # Examples
/// ```rust
/// use quinze_core::{AnalysisRequest, GeoPoint, PoiRequirement};
///
/// let request = AnalysisRequest::new(
///     GeoPoint::new(40.640, -8.654),
///     vec![PoiRequirement::new("pharmacies", 2)],
/// );
/// assert_eq!(request.max_time_minutes, 15);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisRequest {
    /// Reference location the analysis box is centred on.
    pub center: GeoPoint,
    /// Weighted categories to score against. Duplicates count independently.
    pub requirements: Vec<PoiRequirement>,
    /// Travel mode used to derive the reachable distance.
    pub transport_mode: TransportMode,
    /// Time budget in minutes.
    pub max_time_minutes: u32,
    /// Samples per grid axis.
    pub grid_resolution: u32,
    /// Maximum number of ranked locations returned.
    pub top_k: u32,
}

impl AnalysisRequest {
    /// Build a walking request with default budget, resolution and top-K.
    #[must_use]
    pub const fn new(center: GeoPoint, requirements: Vec<PoiRequirement>) -> Self {
        Self {
            center,
            requirements,
            transport_mode: TransportMode::Walking,
            max_time_minutes: DEFAULT_MAX_TIME_MINUTES,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the transport mode.
    #[must_use]
    pub const fn with_transport_mode(mut self, mode: TransportMode) -> Self {
        self.transport_mode = mode;
        self
    }

    /// Set the time budget.
    #[must_use]
    pub const fn with_max_time_minutes(mut self, minutes: u32) -> Self {
        self.max_time_minutes = minutes;
        self
    }

    /// Set the grid resolution.
    #[must_use]
    pub const fn with_grid_resolution(mut self, resolution: u32) -> Self {
        self.grid_resolution = resolution;
        self
    }

    /// Set the number of ranked locations.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Check the request before any lookups run.
    ///
    /// # Errors
    /// Returns the first [`RequestValidationError`] found.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if !self.center.is_finite() {
            return Err(RequestValidationError::NonFiniteCenter);
        }
        if self.requirements.is_empty() {
            return Err(RequestValidationError::NoRequirements);
        }
        for (index, requirement) in self.requirements.iter().enumerate() {
            if requirement.poi_type.trim().is_empty() {
                return Err(RequestValidationError::EmptyPoiType { index });
            }
            if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&requirement.importance) {
                return Err(RequestValidationError::ImportanceOutOfRange {
                    poi_type: requirement.poi_type.clone(),
                    importance: i64::from(requirement.importance),
                });
            }
        }
        if self.max_time_minutes == 0 {
            return Err(RequestValidationError::NonPositiveMaxTime { value: 0 });
        }
        if self.grid_resolution == 0 {
            return Err(RequestValidationError::NonPositiveGridResolution { value: 0 });
        }
        if self.top_k == 0 {
            return Err(RequestValidationError::NonPositiveTopK { value: 0 });
        }
        Ok(())
    }

    /// Distinct POI types in first-seen order.
    #[must_use]
    pub fn distinct_poi_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.requirements
            .iter()
            .map(|r| r.poi_type.as_str())
            .filter(|poi_type| seen.insert(*poi_type))
            .collect()
    }

    /// Sum of every requirement's [`PoiRequirement::max_score`].
    #[must_use]
    pub fn max_total_score(&self) -> f64 {
        self.requirements.iter().map(PoiRequirement::max_score).sum()
    }
}
