//! Facade crate for the Quinze location search engine.
//!
//! This crate re-exports the core domain types and exposes the optional POI
//! backends behind feature flags.

#![forbid(unsafe_code)]

pub use quinze_core::{
    AnalysisConfig, AnalysisError, AnalysisInfo, AnalysisRequest, AnalysisResult, BoundingBox,
    CancelToken, CategoryDescriptor, CategoryTable, GeoPoint, GridScorer, HeatmapPoint,
    PerCategoryScore, PoiLocation, PoiLookup, PoiRequirement, PoiSource, ProximityIndex,
    RequestValidationError, ScoredGrid, TagPredicate, TransportMode,
};

#[cfg(feature = "serde")]
pub use quinze_core::wire;

#[cfg(feature = "source-sqlite")]
pub use quinze_data::{PoiFeature, SqlitePoiSource, SqlitePoiSourceError, persist_pois_to_sqlite};

#[cfg(feature = "source-overpass")]
pub use quinze_data::{OverpassPoiSource, OverpassPoiSourceConfig};
