//! Table definitions shared by the writer and the read-only source.

pub(crate) const POINTS_TABLE: &str = "poi_points";
pub(crate) const AREAS_TABLE: &str = "poi_areas";

pub(crate) const CREATE_POINTS: &str = "CREATE TABLE IF NOT EXISTS poi_points (
    id INTEGER PRIMARY KEY,
    lon REAL NOT NULL,
    lat REAL NOT NULL,
    name TEXT,
    tags TEXT NOT NULL
)";

pub(crate) const CREATE_POINTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS poi_points_lon_lat ON poi_points (lon, lat)";

pub(crate) const CREATE_AREAS: &str = "CREATE TABLE IF NOT EXISTS poi_areas (
    id INTEGER PRIMARY KEY,
    name TEXT,
    tags TEXT NOT NULL,
    min_lon REAL NOT NULL,
    min_lat REAL NOT NULL,
    max_lon REAL NOT NULL,
    max_lat REAL NOT NULL,
    ring TEXT NOT NULL
)";

pub(crate) const CREATE_AREAS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS poi_areas_envelope ON poi_areas (min_lon, max_lon, min_lat, max_lat)";
