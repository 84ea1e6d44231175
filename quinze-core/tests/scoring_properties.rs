#![expect(
    clippy::expect_used,
    reason = "property tests use expect for readable failures"
)]
#![expect(
    clippy::float_arithmetic,
    reason = "invariants compare derived floating-point scores"
)]

//! Property-based tests for the grid scorer.
//!
//! # Invariants tested
//!
//! - **Bounded scores:** every cell scores within `0..=100`.
//! - **Breakdown:** a cell's score reconstructs from its per-category scores.
//! - **Absent categories:** types without candidates contribute nothing and
//!   report no nearest distance.
//! - **Ranking:** top locations are the best positive cells, best first.
//! - **Heatmap:** exactly the positive cells, weighted by `score / 100`.
//! - **Idempotence:** identical inputs give identical results.

use proptest::prelude::*;
use quinze_core::test_support::MemoryPoiSource;
use quinze_core::{
    AnalysisConfig, AnalysisRequest, CancelToken, GeoPoint, GridCell, GridScorer, PoiLocation,
    PoiRequirement, TransportMode,
};

const AVEIRO: GeoPoint = GeoPoint::new(40.640, -8.654);

fn point_strategy() -> impl Strategy<Value = GeoPoint> {
    (40.46_f64..40.82, -8.834_f64..-8.474).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
}

/// Parks and schools are populated; cafes are unknown to the source.
fn source_strategy() -> impl Strategy<Value = MemoryPoiSource> {
    (
        prop::collection::vec(point_strategy(), 0..12),
        prop::collection::vec(point_strategy(), 0..12),
    )
        .prop_map(|(parks, schools)| {
            MemoryPoiSource::new()
                .with_locations("parks", parks.into_iter().map(PoiLocation::new))
                .with_locations("schools", schools.into_iter().map(PoiLocation::new))
        })
}

fn request_strategy() -> impl Strategy<Value = AnalysisRequest> {
    let requirements = prop::collection::vec(
        (prop::sample::select(vec!["parks", "schools", "cafes"]), 1_u8..=4),
        1..5,
    );
    let mode = prop_oneof![
        Just(TransportMode::Walking),
        Just(TransportMode::Cycling),
        Just(TransportMode::Driving),
    ];
    (requirements, mode, 1_u32..=60, 1_u32..=8, 1_u32..=10).prop_map(
        |(requirements, mode, minutes, resolution, top_k)| {
            AnalysisRequest::new(
                AVEIRO,
                requirements
                    .into_iter()
                    .map(|(poi_type, importance)| PoiRequirement::new(poi_type, importance))
                    .collect(),
            )
            .with_transport_mode(mode)
            .with_max_time_minutes(minutes)
            .with_grid_resolution(resolution)
            .with_top_k(top_k)
        },
    )
}

fn positive_scores_descending(cells: &[GridCell]) -> Vec<f64> {
    let mut scores: Vec<f64> = cells
        .iter()
        .map(|cell| cell.score)
        .filter(|score| *score > 0.0)
        .collect();
    scores.sort_by(|a, b| b.total_cmp(a));
    scores
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every cell score lies in `0..=100` and reconstructs from its
    /// breakdown.
    #[test]
    fn cell_scores_are_bounded_and_reconstructible(
        source in source_strategy(),
        request in request_strategy(),
    ) {
        let scorer = GridScorer::new(source, AnalysisConfig::default());
        let grid = scorer
            .score_grid(&request, &CancelToken::new())
            .expect("analysis succeeds");
        let max_total = request.max_total_score();

        for cell in grid.cells() {
            prop_assert!((0.0..=100.0).contains(&cell.score), "score {}", cell.score);
            let breakdown: f64 = cell.poi_scores.iter().map(|s| s.score).sum();
            prop_assert!((breakdown - cell.score * max_total / 100.0).abs() < 1e-6);
            prop_assert_eq!(cell.poi_scores.len(), request.requirements.len());
        }
    }

    /// Property: categories without candidates never contribute.
    #[test]
    fn absent_categories_score_zero(
        source in source_strategy(),
        request in request_strategy(),
    ) {
        let scorer = GridScorer::new(source, AnalysisConfig::default());
        let grid = scorer
            .score_grid(&request, &CancelToken::new())
            .expect("analysis succeeds");

        for score in grid.cells().iter().flat_map(|c| &c.poi_scores) {
            if score.poi_type == "cafes" {
                prop_assert_eq!(score.nearest_distance_meters, None);
                prop_assert!(score.score.abs() < f64::EPSILON);
            }
            if score.nearest_distance_meters.is_none() {
                prop_assert!(score.score.abs() < f64::EPSILON);
            }
        }
    }

    /// Property: top locations are the highest positive scores, best first,
    /// and the heatmap holds exactly the positive cells.
    #[test]
    fn ranking_and_heatmap_follow_the_grid(
        source in source_strategy(),
        request in request_strategy(),
    ) {
        let scorer = GridScorer::new(source, AnalysisConfig::default());
        let grid = scorer
            .score_grid(&request, &CancelToken::new())
            .expect("analysis succeeds");
        let expected: Vec<f64> = positive_scores_descending(grid.cells())
            .into_iter()
            .take(usize::try_from(request.top_k).expect("top_k fits usize"))
            .collect();
        let positive: Vec<&GridCell> = grid.cells().iter().filter(|c| c.score > 0.0).collect();
        let result = grid.clone().into_result(request.top_k);

        let ranked: Vec<f64> = result.top_locations.iter().map(|c| c.score).collect();
        prop_assert_eq!(ranked, expected);

        prop_assert_eq!(result.heatmap_points.len(), positive.len());
        for (point, cell) in result.heatmap_points.iter().zip(positive) {
            prop_assert_eq!(point.latitude, cell.latitude);
            prop_assert_eq!(point.longitude, cell.longitude);
            prop_assert!((point.weight - cell.score / 100.0).abs() < 1e-12);
        }
    }

    /// Property: analysing the same request twice gives the same result.
    #[test]
    fn analysis_is_idempotent(
        source in source_strategy(),
        request in request_strategy(),
    ) {
        let scorer = GridScorer::new(source, AnalysisConfig::default());
        let first = scorer.analyze(&request).expect("analysis succeeds");
        let second = scorer.analyze(&request).expect("analysis succeeds");
        prop_assert_eq!(first, second);
    }
}
