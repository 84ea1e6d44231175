//! SQLite storage for categorised POIs.
//!
//! The database holds two tables. `poi_points` stores point features with
//! their coordinates. `poi_areas` stores polygon features as an exterior ring
//! encoded as JSON `[[lon, lat], ...]` alongside the ring's bounding
//! coordinates, so lookups can discard distant areas before decoding rings.
//! Both tables keep OSM-style tags as a JSON object.

mod persist;
mod schema;
mod source;

pub use persist::{FeatureGeometry, PersistPoisError, PoiFeature, persist_pois_to_sqlite};
pub use source::{SqlitePoiSource, SqlitePoiSourceError};
