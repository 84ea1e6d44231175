//! Explicit configuration passed to the grid scorer.

use std::time::Duration;

use crate::SpeedTable;

/// Half-width of the analysis box in degrees, roughly 20 km at Portuguese
/// latitudes.
pub const DEFAULT_ANALYSIS_RADIUS_DEGREES: f64 = 0.18;

/// Settings shared by every search a [`GridScorer`](crate::GridScorer) runs.
///
/// The radius is a single scalar applied to both axes and does not depend on
/// the time budget or transport mode of a request.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use quinze_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default().with_deadline(Duration::from_secs(30));
/// assert_eq!(config.analysis_radius_degrees, 0.18);
/// assert_eq!(config.deadline, Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// Distance from the request centre to each edge of the analysis box.
    pub analysis_radius_degrees: f64,
    /// Travel speeds used to derive the reachable distance.
    pub speeds: SpeedTable,
    /// Wall-clock limit for one analysis; `None` runs to completion.
    pub deadline: Option<Duration>,
}

impl AnalysisConfig {
    /// Override the analysis box radius.
    #[must_use]
    pub const fn with_radius_degrees(mut self, radius: f64) -> Self {
        self.analysis_radius_degrees = radius;
        self
    }

    /// Abort analyses that run longer than `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_radius_degrees: DEFAULT_ANALYSIS_RADIUS_DEGREES,
            speeds: SpeedTable::default(),
            deadline: None,
        }
    }
}
