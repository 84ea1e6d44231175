//! Grid search for locations that best satisfy weighted POI requirements.
//!
//! [`GridScorer`] samples a uniform grid over a box around the request centre,
//! scores each sample against every requirement with a linear distance decay,
//! and ranks the results. Scoring is independent per sample and runs across
//! grid rows in parallel once candidates have been prefetched.

use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use crate::{
    AnalysisConfig, AnalysisError, AnalysisRequest, BoundingBox, CancelToken, CandidateSet,
    GeoPoint, PoiRequirement, PoiSource, ProximityIndex, ReachModel, SampleGrid, SpeedTable,
    nearest_distance_meters,
};

/// Upper bound of a normalised cell score.
pub const MAX_CELL_SCORE: f64 = 100.0;

/// One requirement's contribution to a cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerCategoryScore {
    /// Requested POI type.
    pub poi_type: String,
    /// Contribution after distance decay, in `0..=max_score`.
    pub score: f64,
    /// Contribution when a POI sits exactly on the cell.
    pub max_score: f64,
    /// Distance to the nearest POI of this type; `None` when there were no
    /// candidates at all.
    pub nearest_distance_meters: Option<f64>,
}

/// A scored sample point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    /// Sample latitude.
    pub latitude: f64,
    /// Sample longitude.
    pub longitude: f64,
    /// Normalised score in `0..=100`.
    pub score: f64,
    /// Per-requirement breakdown in request order.
    pub poi_scores: Vec<PerCategoryScore>,
}

impl GridCell {
    /// Sample coordinates as a point.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A heatmap sample with weight in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeatmapPoint {
    /// Sample latitude.
    pub latitude: f64,
    /// Sample longitude.
    pub longitude: f64,
    /// Cell score divided by 100.
    pub weight: f64,
}

/// Summary of how an analysis was run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisInfo {
    /// Samples per grid axis.
    pub grid_resolution: u32,
    /// Reachable distance derived from mode and time budget.
    pub max_distance_meters: f64,
    /// Number of requirements scored, duplicates included.
    pub poi_count: usize,
    /// Number of sampled cells.
    pub total_grid_points: usize,
    /// Candidate POIs fetched across all requested types.
    pub candidate_count: usize,
}

/// Outcome of a search: heatmap, ranked locations and run summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisResult {
    /// Every cell with a positive score, in row-major order.
    pub heatmap_points: Vec<HeatmapPoint>,
    /// Highest-scoring cells, best first.
    pub top_locations: Vec<GridCell>,
    /// Run summary.
    pub info: AnalysisInfo,
}

/// Every scored cell of one search, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredGrid {
    cells: Vec<GridCell>,
    info: AnalysisInfo,
}

impl ScoredGrid {
    /// All cells in row-major order, south-west first.
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Run summary.
    #[must_use]
    pub const fn info(&self) -> &AnalysisInfo {
        &self.info
    }

    /// Cells with a positive score, weighted by `score / 100`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "weights rescale scores to 0..=1")]
    pub fn heatmap(&self) -> Vec<HeatmapPoint> {
        self.cells
            .iter()
            .filter(|cell| cell.score > 0.0)
            .map(|cell| HeatmapPoint {
                latitude: cell.latitude,
                longitude: cell.longitude,
                weight: cell.score / MAX_CELL_SCORE,
            })
            .collect()
    }

    /// The `k` best cells with a positive score, best first.
    ///
    /// Equal scores keep their row-major order.
    #[must_use]
    pub fn top_locations(&self, k: u32) -> Vec<GridCell> {
        let limit = usize::try_from(k).unwrap_or(usize::MAX);
        let mut ranked: Vec<&GridCell> = self.cells.iter().filter(|c| c.score > 0.0).collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.into_iter().take(limit).cloned().collect()
    }

    /// Rank the grid and build the final result.
    #[must_use]
    pub fn into_result(self, top_k: u32) -> AnalysisResult {
        AnalysisResult {
            heatmap_points: self.heatmap(),
            top_locations: self.top_locations(top_k),
            info: self.info,
        }
    }
}

/// Fraction of a requirement's maximum score earned at `distance`.
///
/// Decays linearly from `1.0` at zero distance to `0.0` at `max_distance`.
/// Missing candidates, distances beyond the limit and a non-positive limit
/// all yield `0.0`.
///
/// # Examples
/// ```
/// use quinze_core::distance_decay;
///
/// assert_eq!(distance_decay(Some(0.0), 1200.0), 1.0);
/// assert_eq!(distance_decay(Some(600.0), 1200.0), 0.5);
/// assert_eq!(distance_decay(Some(1500.0), 1200.0), 0.0);
/// assert_eq!(distance_decay(None, 1200.0), 0.0);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "linear decay is a ratio of distances")]
pub fn distance_decay(distance: Option<f64>, max_distance: f64) -> f64 {
    match distance {
        Some(d) if max_distance > 0.0 && d <= max_distance => {
            ((max_distance - d) / max_distance).max(0.0)
        }
        _ => 0.0,
    }
}

#[expect(clippy::float_arithmetic, reason = "scores are normalised to 0..=100")]
fn normalise(total: f64, max_total: f64) -> f64 {
    if max_total > 0.0 {
        (total / max_total * MAX_CELL_SCORE).clamp(0.0, MAX_CELL_SCORE)
    } else {
        0.0
    }
}

#[expect(clippy::float_arithmetic, reason = "contribution is decay times ceiling")]
fn score_requirement(
    point: GeoPoint,
    requirement: &PoiRequirement,
    candidates: &CandidateSet,
    max_distance: f64,
) -> PerCategoryScore {
    let nearest = nearest_distance_meters(point, candidates.get(&requirement.poi_type));
    let max_score = requirement.max_score();
    PerCategoryScore {
        poi_type: requirement.poi_type.clone(),
        score: distance_decay(nearest, max_distance) * max_score,
        max_score,
        nearest_distance_meters: nearest,
    }
}

fn score_cell(
    point: GeoPoint,
    requirements: &[PoiRequirement],
    candidates: &CandidateSet,
    max_distance: f64,
) -> GridCell {
    let poi_scores: Vec<PerCategoryScore> = requirements
        .iter()
        .map(|r| score_requirement(point, r, candidates, max_distance))
        .collect();
    let total: f64 = poi_scores.iter().map(|s| s.score).sum();
    let max_total: f64 = poi_scores.iter().map(|s| s.max_score).sum();
    GridCell {
        latitude: point.latitude,
        longitude: point.longitude,
        score: normalise(total, max_total),
        poi_scores,
    }
}

/// Scores a sampling grid against weighted POI requirements.
///
/// The scorer holds no per-search state, so one instance can serve many
/// concurrent analyses.
///
/// # Examples
/// ```
/// use quinze_core::{
///     AnalysisConfig, AnalysisRequest, BoundingBox, GeoPoint, GridScorer, PoiLocation,
///     PoiLookup, PoiRequirement, PoiSource,
/// };
///
/// struct OnePharmacy;
///
/// impl PoiSource for OnePharmacy {
///     fn lookup(&self, category: &str, _bbox: &BoundingBox) -> PoiLookup {
///         match category {
///             "pharmacies" => PoiLookup::Found(vec![PoiLocation::new(GeoPoint::new(40.65, -8.65))]),
///             _ => PoiLookup::UnknownCategory,
///         }
///     }
/// }
///
/// # fn main() -> Result<(), quinze_core::AnalysisError> {
/// let scorer = GridScorer::new(OnePharmacy, AnalysisConfig::default());
/// let request = AnalysisRequest::new(
///     GeoPoint::new(40.640, -8.654),
///     vec![PoiRequirement::new("pharmacies", 3)],
/// )
/// .with_grid_resolution(20);
/// let result = scorer.analyze(&request)?;
/// assert!(result.top_locations.len() <= 5);
/// assert_eq!(result.info.total_grid_points, 400);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GridScorer<S, R = SpeedTable> {
    index: ProximityIndex<S>,
    reach: R,
    config: AnalysisConfig,
}

impl<S: PoiSource> GridScorer<S> {
    /// Build a scorer using the speed table from `config`.
    #[must_use]
    pub const fn new(source: S, config: AnalysisConfig) -> Self {
        Self {
            index: ProximityIndex::new(source),
            reach: config.speeds,
            config,
        }
    }
}

impl<S: PoiSource, R: ReachModel> GridScorer<S, R> {
    /// Replace the reachability model.
    #[must_use]
    pub fn with_reach_model<M: ReachModel>(self, reach: M) -> GridScorer<S, M> {
        GridScorer {
            index: self.index,
            reach,
            config: self.config,
        }
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The proximity index wrapping the POI source.
    #[must_use]
    pub const fn index(&self) -> &ProximityIndex<S> {
        &self.index
    }

    /// Run a complete search.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidRequest`] before any lookup when the
    /// request fails validation, [`AnalysisError::Computation`] when the
    /// analysis box cannot be derived and
    /// [`AnalysisError::DeadlineExceeded`] when a configured deadline passes.
    /// Source failures never surface here; they zero the affected category.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_with_cancel(request, &CancelToken::new())
    }

    /// Run a complete search that stops early when `cancel` fires.
    ///
    /// # Errors
    /// As [`GridScorer::analyze`], plus [`AnalysisError::Cancelled`].
    pub fn analyze_with_cancel(
        &self,
        request: &AnalysisRequest,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let grid = self.score_grid(request, cancel)?;
        Ok(grid.into_result(request.top_k))
    }

    /// Score every cell without ranking.
    ///
    /// # Errors
    /// As [`GridScorer::analyze_with_cancel`].
    pub fn score_grid(
        &self,
        request: &AnalysisRequest,
        cancel: &CancelToken,
    ) -> Result<ScoredGrid, AnalysisError> {
        request.validate()?;
        let started = Instant::now();

        let bbox = BoundingBox::around(request.center, self.config.analysis_radius_degrees)
            .map_err(|err| AnalysisError::Computation {
                reason: format!("cannot derive analysis box: {err}"),
            })?;
        let max_distance = self
            .reach
            .max_distance_meters(request.transport_mode, request.max_time_minutes);
        let candidates = self.index.prefetch(&request.distinct_poi_types(), &bbox);
        self.check_interrupt(cancel, started)?;

        let grid = SampleGrid::new(bbox, request.grid_resolution);
        let rows: Vec<Vec<GridCell>> = (0..grid.resolution())
            .into_par_iter()
            .map(|row| {
                self.check_interrupt(cancel, started)?;
                Ok(grid
                    .row(row)
                    .map(|point| score_cell(point, &request.requirements, &candidates, max_distance))
                    .collect::<Vec<GridCell>>())
            })
            .collect::<Result<_, AnalysisError>>()?;
        let cells: Vec<GridCell> = rows.into_iter().flatten().collect();

        debug!(
            "scored {} cells for {} requirements ({} candidates, max distance {max_distance} m) in {:?}",
            cells.len(),
            request.requirements.len(),
            candidates.total(),
            started.elapsed()
        );

        let info = AnalysisInfo {
            grid_resolution: request.grid_resolution,
            max_distance_meters: max_distance,
            poi_count: request.requirements.len(),
            total_grid_points: cells.len(),
            candidate_count: candidates.total(),
        };
        Ok(ScoredGrid { cells, info })
    }

    fn check_interrupt(&self, cancel: &CancelToken, started: Instant) -> Result<(), AnalysisError> {
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        if let Some(limit) = self.config.deadline
            && started.elapsed() > limit
        {
            return Err(AnalysisError::DeadlineExceeded { limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingPoiSource, MemoryPoiSource, UnavailablePoiSource};
    use crate::{PoiLocation, RequestValidationError, TransportMode};
    use rstest::{fixture, rstest};
    use std::time::Duration;

    const CENTER: GeoPoint = GeoPoint::new(40.640, -8.654);

    #[fixture]
    fn request() -> AnalysisRequest {
        AnalysisRequest::new(CENTER, vec![PoiRequirement::new("supermarkets", 4)])
            .with_grid_resolution(2)
            .with_top_k(1)
    }

    fn south_west_corner() -> GeoPoint {
        BoundingBox::around(CENTER, 0.18)
            .map(|bbox| GeoPoint::new(bbox.min_lat(), bbox.min_lng()))
            .expect("valid box")
    }

    #[rstest]
    #[case(Some(0.0), 1.0)]
    #[case(Some(300.0), 0.75)]
    #[case(Some(1_200.0), 0.0)]
    #[case(Some(1_200.1), 0.0)]
    #[case(None, 0.0)]
    fn decay_is_linear_up_to_the_limit(#[case] distance: Option<f64>, #[case] expected: f64) {
        assert!((distance_decay(distance, 1_200.0) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    fn decay_is_zero_without_reach(#[case] max_distance: f64) {
        assert_eq!(distance_decay(Some(0.0), max_distance), 0.0);
    }

    #[rstest]
    fn poi_on_a_sample_scores_full_marks(request: AnalysisRequest) {
        let corner = south_west_corner();
        let source = MemoryPoiSource::new()
            .with_locations("supermarkets", [PoiLocation::named(corner, "Pingo Doce")]);
        let result = GridScorer::new(source, AnalysisConfig::default())
            .analyze(&request)
            .expect("analysis succeeds");

        assert_eq!(result.top_locations.len(), 1);
        let best = result.top_locations.first().expect("one location");
        assert_eq!(best.location(), corner);
        assert_eq!(best.score, 100.0);
        assert_eq!(
            result.heatmap_points,
            vec![HeatmapPoint {
                latitude: corner.latitude,
                longitude: corner.longitude,
                weight: 1.0,
            }]
        );
        assert_eq!(result.info.max_distance_meters, 1_200.0);
        assert_eq!(result.info.total_grid_points, 4);
    }

    #[rstest]
    fn unavailable_source_yields_empty_result(request: AnalysisRequest) {
        let scorer = GridScorer::new(UnavailablePoiSource::new("timeout"), AnalysisConfig::default());
        let result = scorer.analyze(&request).expect("degrades gracefully");
        assert!(result.heatmap_points.is_empty());
        assert!(result.top_locations.is_empty());
        assert_eq!(result.info.total_grid_points, 4);
    }

    #[rstest]
    fn unavailable_category_only_zeroes_its_own_share() {
        let corner = south_west_corner();
        let source = MemoryPoiSource::new()
            .with_locations("parks", [PoiLocation::new(corner)])
            .with_unavailable("schools", "gateway timeout");
        let request = AnalysisRequest::new(
            CENTER,
            vec![
                PoiRequirement::new("parks", 2),
                PoiRequirement::new("schools", 2),
            ],
        )
        .with_grid_resolution(2);

        let result = GridScorer::new(source, AnalysisConfig::default())
            .analyze(&request)
            .expect("partial outage still succeeds");

        assert_eq!(result.top_locations.len(), 1);
        let best = result.top_locations.first().expect("one location");
        assert_eq!(best.location(), corner);
        assert_eq!(best.score, 50.0);
        let schools = best
            .poi_scores
            .iter()
            .find(|s| s.poi_type == "schools")
            .expect("schools breakdown");
        assert_eq!(schools.nearest_distance_meters, None);
        assert_eq!(schools.score, 0.0);
        assert_eq!(schools.max_score, 50.0);
    }

    #[rstest]
    fn invalid_request_performs_no_lookups(mut request: AnalysisRequest) {
        request.requirements.clear();
        let scorer = GridScorer::new(
            CountingPoiSource::new(MemoryPoiSource::new()),
            AnalysisConfig::default(),
        );
        let err = scorer.analyze(&request).expect_err("empty requirements");
        assert_eq!(
            err,
            AnalysisError::InvalidRequest(RequestValidationError::NoRequirements)
        );
        assert_eq!(scorer.index().source().total_lookups(), 0);
    }

    #[rstest]
    fn duplicate_types_are_fetched_once_and_scored_twice(mut request: AnalysisRequest) {
        request.requirements = vec![
            PoiRequirement::new("parks", 1),
            PoiRequirement::new("parks", 2),
        ];
        let scorer = GridScorer::new(
            CountingPoiSource::new(MemoryPoiSource::new().with_locations("parks", [])),
            AnalysisConfig::default(),
        );
        let grid = scorer
            .score_grid(&request, &CancelToken::new())
            .expect("analysis succeeds");
        assert_eq!(scorer.index().source().lookups_for("parks"), 1);
        assert!(grid.cells().iter().all(|cell| cell.poi_scores.len() == 2));
        assert_eq!(grid.info().poi_count, 2);
    }

    #[rstest]
    fn cancelled_token_stops_the_search(request: AnalysisRequest) {
        let token = CancelToken::new();
        token.cancel();
        let scorer = GridScorer::new(MemoryPoiSource::new(), AnalysisConfig::default());
        assert_eq!(
            scorer.analyze_with_cancel(&request, &token),
            Err(AnalysisError::Cancelled)
        );
    }

    #[rstest]
    fn slow_lookups_exceed_the_deadline(request: AnalysisRequest) {
        struct SlowSource;
        impl PoiSource for SlowSource {
            fn lookup(&self, _: &str, _: &BoundingBox) -> crate::PoiLookup {
                std::thread::sleep(Duration::from_millis(20));
                crate::PoiLookup::Found(Vec::new())
            }
        }

        let config = AnalysisConfig::default().with_deadline(Duration::from_millis(1));
        let scorer = GridScorer::new(SlowSource, config);
        assert_eq!(
            scorer.analyze(&request),
            Err(AnalysisError::DeadlineExceeded {
                limit: Duration::from_millis(1)
            })
        );
    }

    #[rstest]
    fn invalid_radius_is_a_computation_failure(request: AnalysisRequest) {
        let config = AnalysisConfig::default().with_radius_degrees(0.0);
        let scorer = GridScorer::new(MemoryPoiSource::new(), config);
        assert!(matches!(
            scorer.analyze(&request),
            Err(AnalysisError::Computation { .. })
        ));
    }

    #[rstest]
    fn custom_reach_model_replaces_speeds(request: AnalysisRequest) {
        struct NoReach;
        impl ReachModel for NoReach {
            fn max_distance_meters(&self, _: TransportMode, _: u32) -> f64 {
                0.0
            }
        }

        let corner = south_west_corner();
        let source = MemoryPoiSource::new()
            .with_locations("supermarkets", [PoiLocation::new(corner)]);
        let scorer = GridScorer::new(source, AnalysisConfig::default()).with_reach_model(NoReach);
        let result = scorer.analyze(&request).expect("analysis succeeds");
        assert!(result.top_locations.is_empty());
        assert_eq!(result.info.max_distance_meters, 0.0);
    }

    #[rstest]
    fn ties_keep_row_major_order() {
        let cell = |latitude: f64, score: f64| GridCell {
            latitude,
            longitude: 0.0,
            score,
            poi_scores: Vec::new(),
        };
        let grid = ScoredGrid {
            cells: vec![cell(0.0, 50.0), cell(1.0, 80.0), cell(2.0, 50.0), cell(3.0, 0.0)],
            info: AnalysisInfo {
                grid_resolution: 2,
                max_distance_meters: 1.0,
                poi_count: 1,
                total_grid_points: 4,
                candidate_count: 0,
            },
        };
        let latitudes: Vec<f64> = grid.top_locations(10).iter().map(|c| c.latitude).collect();
        assert_eq!(latitudes, vec![1.0, 0.0, 2.0]);
        assert_eq!(grid.top_locations(1).len(), 1);
    }
}
