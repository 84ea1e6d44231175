//! Core domain types and the grid search engine for Quinze.
//!
//! A search takes a reference location and a weighted list of POI categories,
//! samples a grid over a fixed box around the location and scores each sample
//! by how close the nearest POI of each category is. The [`GridScorer`]
//! returns a heatmap of positive scores and the best-ranked locations.
//!
//! POIs come from an injected [`PoiSource`]. Backends live in `quinze-data`;
//! this crate only defines the contract and a category catalogue
//! ([`CategoryTable`]) for backends to translate category keys.
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cancel;
mod category;
mod config;
mod error;
mod geometry;
mod grid;
mod poi;
mod proximity;
mod reach;
mod request;
mod scorer;
mod source;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod wire;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use cancel::CancelToken;
pub use category::{CategoryDescriptor, CategoryError, CategoryTable, TagPredicate};
pub use config::{AnalysisConfig, DEFAULT_ANALYSIS_RADIUS_DEGREES};
pub use error::{AnalysisError, RequestValidationError};
pub use geometry::{
    BoundingBox, BoundingBoxError, EARTH_RADIUS_METERS, GeoPoint, haversine_distance_meters,
};
pub use grid::SampleGrid;
pub use poi::PoiLocation;
pub use proximity::{CandidateSet, ProximityIndex, nearest_distance_meters};
pub use reach::{ReachModel, SpeedTable, TransportMode, UnknownTransportMode};
pub use request::{
    AnalysisRequest, DEFAULT_GRID_RESOLUTION, DEFAULT_MAX_TIME_MINUTES, DEFAULT_TOP_K,
    MAX_IMPORTANCE, MIN_IMPORTANCE, PoiRequirement, SCORE_PER_IMPORTANCE,
};
pub use scorer::{
    AnalysisInfo, AnalysisResult, GridCell, GridScorer, HeatmapPoint, MAX_CELL_SCORE,
    PerCategoryScore, ScoredGrid, distance_decay,
};
pub use source::{PoiLookup, PoiSource};
