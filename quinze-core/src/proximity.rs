//! Nearest-POI distance queries over prefetched candidates.
//!
//! [`ProximityIndex`] fetches the candidate points of each category once per
//! search and [`nearest_distance_meters`] answers "how far is the closest
//! one" by a linear haversine scan. Candidate sets are bounded by the
//! analysis box, so the scan stays cheap; a spatial index could replace it
//! without changing the contract.

use std::collections::HashMap;

use log::{debug, warn};
use rayon::prelude::*;

use crate::{BoundingBox, GeoPoint, PoiLookup, PoiSource};

/// Candidate points grouped by POI type for one search.
///
/// # Examples
/// ```
/// use quinze_core::{CandidateSet, GeoPoint};
///
/// let mut candidates = CandidateSet::default();
/// candidates.insert("parks", vec![GeoPoint::new(0.0, 0.0)]);
/// assert_eq!(candidates.get("parks").len(), 1);
/// assert!(candidates.get("schools").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    by_type: HashMap<String, Vec<GeoPoint>>,
}

impl CandidateSet {
    /// Store the candidates for `poi_type`, replacing earlier ones.
    pub fn insert(&mut self, poi_type: impl Into<String>, points: Vec<GeoPoint>) {
        self.by_type.insert(poi_type.into(), points);
    }

    /// Candidates for `poi_type`; empty when none were fetched.
    #[must_use]
    pub fn get(&self, poi_type: &str) -> &[GeoPoint] {
        self.by_type.get(poi_type).map_or(&[], Vec::as_slice)
    }

    /// Total number of candidate points across all types.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    /// Number of POI types held.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.by_type.len()
    }
}

/// Minimum great-circle distance from `point` to any candidate.
///
/// Returns `None` when `candidates` is empty. This is distinct from
/// `Some(0.0)`, which means a candidate sits exactly on `point`.
///
/// # Examples
/// ```
/// use quinze_core::{GeoPoint, nearest_distance_meters};
///
/// let here = GeoPoint::new(40.64, -8.654);
/// assert_eq!(nearest_distance_meters(here, &[]), None);
/// assert_eq!(nearest_distance_meters(here, &[here]), Some(0.0));
/// ```
#[must_use]
pub fn nearest_distance_meters(point: GeoPoint, candidates: &[GeoPoint]) -> Option<f64> {
    candidates
        .iter()
        .map(|candidate| point.distance_to(candidate))
        .min_by(f64::total_cmp)
}

/// Resolves candidate points for POI categories from a [`PoiSource`].
///
/// The index holds no state between searches. Upstream failures and unknown
/// categories degrade to an empty candidate list and are logged.
#[derive(Debug, Clone)]
pub struct ProximityIndex<S> {
    source: S,
}

impl<S: PoiSource> ProximityIndex<S> {
    /// Wrap a POI source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Borrow the underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every candidate of `poi_type` inside `bbox`.
    ///
    /// Issues exactly one lookup against the source. Unknown categories and
    /// unavailable backends yield an empty list rather than an error.
    pub fn fetch_candidates(&self, poi_type: &str, bbox: &BoundingBox) -> Vec<GeoPoint> {
        match self.source.lookup(poi_type, bbox) {
            PoiLookup::Found(locations) => {
                debug!(
                    "fetched {} candidates for POI type '{poi_type}'",
                    locations.len()
                );
                locations.into_iter().map(|poi| poi.location).collect()
            }
            PoiLookup::UnknownCategory => {
                debug!("POI type '{poi_type}' is unknown to the source; using no candidates");
                Vec::new()
            }
            PoiLookup::Unavailable { reason } => {
                warn!("POI lookup for '{poi_type}' failed: {reason}; scoring it as absent");
                Vec::new()
            }
        }
    }

    /// Fetch candidates for each POI type, one lookup per type.
    ///
    /// Lookups for different types run concurrently. Callers should pass
    /// distinct types; a repeated type is looked up again.
    pub fn prefetch(&self, poi_types: &[&str], bbox: &BoundingBox) -> CandidateSet {
        let fetched: Vec<(String, Vec<GeoPoint>)> = poi_types
            .par_iter()
            .map(|poi_type| ((*poi_type).to_owned(), self.fetch_candidates(poi_type, bbox)))
            .collect();
        let mut candidates = CandidateSet::default();
        for (poi_type, points) in fetched {
            candidates.insert(poi_type, points);
        }
        candidates
    }
}
