//! POI backends for the Quinze search engine.
//!
//! Responsibilities:
//! - Implement [`quinze_core::PoiSource`] over concrete stores: a local SQLite
//!   database and a remote Overpass API endpoint.
//! - Translate category keys into backend filters through a
//!   [`quinze_core::CategoryTable`].
//! - Build SQLite POI databases from point and area features.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `quinze-core`).
//! - Lookup failures never escape as errors; sources report
//!   [`quinze_core::PoiLookup::Unavailable`] and log the cause.
//!
//! Invariants:
//! - Sources are `Send + Sync` so the scorer can prefetch categories in
//!   parallel.
//! - No global mutable state.
#![forbid(unsafe_code)]

#[cfg(feature = "overpass")]
pub mod overpass;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "overpass")]
pub use overpass::{OverpassPoiSource, OverpassPoiSourceConfig, SourceBuildError};
#[cfg(feature = "sqlite")]
pub use sqlite::{
    FeatureGeometry, PersistPoisError, PoiFeature, SqlitePoiSource, SqlitePoiSourceError,
    persist_pois_to_sqlite,
};
