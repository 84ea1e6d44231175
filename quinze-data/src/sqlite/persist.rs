//! SQLite persistence for point and area POI features.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use geo::{BoundingRect, Polygon};
use quinze_core::GeoPoint;
use rusqlite::{Connection, Error as SqliteError, Statement, Transaction};
use serde_json::to_string;
use thiserror::Error;

use super::schema::{CREATE_AREAS, CREATE_AREAS_INDEX, CREATE_POINTS, CREATE_POINTS_INDEX};

/// Shape of a stored feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// A single location, typically an OSM node.
    Point(GeoPoint),
    /// A closed area with `x = longitude` and `y = latitude`. Only the
    /// exterior ring is stored.
    Area(Polygon<f64>),
}

/// A tagged feature ready to be written to a POI database.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiFeature {
    /// Identifier, unique within its geometry kind.
    pub id: u64,
    /// OSM-style tags. A `name` tag becomes the POI's display name.
    pub tags: BTreeMap<String, String>,
    /// Feature geometry.
    pub geometry: FeatureGeometry,
}

impl PoiFeature {
    /// Build a point feature.
    pub fn point(id: u64, location: GeoPoint, tags: BTreeMap<String, String>) -> Self {
        Self {
            id,
            tags,
            geometry: FeatureGeometry::Point(location),
        }
    }

    /// Build an area feature.
    pub fn area(id: u64, polygon: Polygon<f64>, tags: BTreeMap<String, String>) -> Self {
        Self {
            id,
            tags,
            geometry: FeatureGeometry::Area(polygon),
        }
    }

    fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }
}

/// Errors raised when persisting POI features to SQLite.
#[derive(Debug, Error)]
pub enum PersistPoisError {
    /// Failed to create the parent directory for the SQLite artefact.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin POI persistence transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the POI tables failed.
    #[error("failed to create POI tables")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A feature identifier could not be represented as an SQLite integer.
    #[error("POI id {poi_id} exceeds SQLite i64 range")]
    PoiIdOutOfRange {
        /// Identifier that failed the conversion.
        poi_id: u64,
    },
    /// An area feature had no coordinates.
    #[error("area POI {poi_id} has an empty exterior ring")]
    EmptyArea {
        /// Identifier of the offending area.
        poi_id: u64,
    },
    /// Serializing tags or a ring to JSON failed.
    #[error("failed to serialize POI {poi_id}")]
    Serialize {
        /// Identifier of the POI that failed to serialize.
        poi_id: u64,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Writing a POI row failed.
    #[error("failed to persist POI {poi_id}")]
    PersistRow {
        /// Identifier of the POI being persisted.
        poi_id: u64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing an insert statement failed.
    #[error("failed to prepare POI insert statement")]
    PrepareInsert {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit POI persistence transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Persist POI features to a SQLite database on disk.
///
/// The function is idempotent: rows are replaced when identifiers already
/// exist. Parent directories are created automatically and the POI tables are
/// initialised if missing. The whole batch is written in one transaction, so a
/// failing feature leaves the database unchanged.
///
/// # Errors
/// Returns [`PersistPoisError`] when the file cannot be created, a feature
/// cannot be encoded, or SQLite rejects a statement.
pub fn persist_pois_to_sqlite(
    path: &Utf8Path,
    features: &[PoiFeature],
) -> Result<(), PersistPoisError> {
    ensure_parent_dir(path)?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| PersistPoisError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| PersistPoisError::BeginTransaction { source })?;

    create_schema(&transaction)?;
    persist_rows(&transaction, features)?;

    transaction
        .commit()
        .map_err(|source| PersistPoisError::Commit { source })?;
    log::debug!("persisted {} POI features to {path}", features.len());
    Ok(())
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), PersistPoisError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    base_dir
        .create_dir_all(&relative)
        .map_err(|source| PersistPoisError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })
}

fn base_dir_and_relative(
    parent: &Utf8Path,
) -> Result<(fs_utf8::Dir, Utf8PathBuf), PersistPoisError> {
    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };

    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(|source| {
        PersistPoisError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        }
    })?;

    Ok((dir, relative.to_path_buf()))
}

fn create_schema(transaction: &Transaction<'_>) -> Result<(), PersistPoisError> {
    [
        CREATE_POINTS,
        CREATE_POINTS_INDEX,
        CREATE_AREAS,
        CREATE_AREAS_INDEX,
    ]
    .into_iter()
    .try_for_each(|sql| transaction.execute(sql, []).map(|_| ()))
    .map_err(|source| PersistPoisError::CreateSchema { source })
}

fn persist_rows(
    transaction: &Transaction<'_>,
    features: &[PoiFeature],
) -> Result<(), PersistPoisError> {
    if features.is_empty() {
        return Ok(());
    }

    let mut points = transaction
        .prepare(
            "INSERT OR REPLACE INTO poi_points (id, lon, lat, name, tags)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|source| PersistPoisError::PrepareInsert { source })?;
    let mut areas = transaction
        .prepare(
            "INSERT OR REPLACE INTO poi_areas
                 (id, name, tags, min_lon, min_lat, max_lon, max_lat, ring)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(|source| PersistPoisError::PrepareInsert { source })?;

    for feature in features {
        match &feature.geometry {
            FeatureGeometry::Point(location) => persist_point(&mut points, feature, *location)?,
            FeatureGeometry::Area(polygon) => persist_area(&mut areas, feature, polygon)?,
        }
    }

    Ok(())
}

fn row_id(feature: &PoiFeature) -> Result<i64, PersistPoisError> {
    i64::try_from(feature.id).map_err(|_| PersistPoisError::PoiIdOutOfRange {
        poi_id: feature.id,
    })
}

fn encode_tags(feature: &PoiFeature) -> Result<String, PersistPoisError> {
    to_string(&feature.tags).map_err(|source| PersistPoisError::Serialize {
        poi_id: feature.id,
        source,
    })
}

fn persist_point(
    statement: &mut Statement<'_>,
    feature: &PoiFeature,
    location: GeoPoint,
) -> Result<(), PersistPoisError> {
    let id = row_id(feature)?;
    let tags = encode_tags(feature)?;
    statement
        .execute((
            id,
            location.longitude,
            location.latitude,
            feature.name(),
            tags,
        ))
        .map(|_| ())
        .map_err(|source| PersistPoisError::PersistRow {
            poi_id: feature.id,
            source,
        })
}

fn persist_area(
    statement: &mut Statement<'_>,
    feature: &PoiFeature,
    polygon: &Polygon<f64>,
) -> Result<(), PersistPoisError> {
    let id = row_id(feature)?;
    let envelope = polygon
        .exterior()
        .bounding_rect()
        .ok_or(PersistPoisError::EmptyArea { poi_id: feature.id })?;
    let ring: Vec<[f64; 2]> = polygon
        .exterior()
        .coords()
        .map(|coord| [coord.x, coord.y])
        .collect();
    let ring_json = to_string(&ring).map_err(|source| PersistPoisError::Serialize {
        poi_id: feature.id,
        source,
    })?;
    let tags = encode_tags(feature)?;
    statement
        .execute((
            id,
            feature.name(),
            tags,
            envelope.min().x,
            envelope.min().y,
            envelope.max().x,
            envelope.max().y,
            ring_json,
        ))
        .map(|_| ())
        .map_err(|source| PersistPoisError::PersistRow {
            poi_id: feature.id,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, polygon};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn db_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 path")
    }

    fn named(name: &str, amenity: &str) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_owned(), name.to_owned()),
            ("amenity".to_owned(), amenity.to_owned()),
        ])
    }

    #[fixture]
    fn pharmacy() -> PoiFeature {
        PoiFeature::point(
            7,
            GeoPoint::new(40.641, -8.653),
            named("Farmácia Moderna", "pharmacy"),
        )
    }

    #[fixture]
    fn school_grounds() -> PoiFeature {
        PoiFeature::area(
            11,
            polygon![
                (x: -8.66, y: 40.63),
                (x: -8.64, y: 40.63),
                (x: -8.64, y: 40.65),
                (x: -8.66, y: 40.65),
            ],
            named("Escola José Estêvão", "school"),
        )
    }

    #[rstest]
    fn persists_points(temp_dir: TempDir, pharmacy: PoiFeature) {
        let path = db_path(&temp_dir, "pois.db");

        persist_pois_to_sqlite(&path, std::slice::from_ref(&pharmacy)).expect("persist POIs");

        let conn = Connection::open(path.as_std_path()).expect("open database");
        let stored: (i64, f64, f64, Option<String>, String) = conn
            .query_row("SELECT id, lon, lat, name, tags FROM poi_points", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .expect("read row");
        assert_eq!(stored.0, 7);
        assert_eq!(stored.1, -8.653);
        assert_eq!(stored.2, 40.641);
        assert_eq!(stored.3.as_deref(), Some("Farmácia Moderna"));
        assert!(stored.4.contains("pharmacy"));
    }

    #[rstest]
    fn persists_area_envelope_and_ring(temp_dir: TempDir, school_grounds: PoiFeature) {
        let path = db_path(&temp_dir, "pois.db");

        persist_pois_to_sqlite(&path, &[school_grounds]).expect("persist POIs");

        let conn = Connection::open(path.as_std_path()).expect("open database");
        let (min_lon, max_lat, ring): (f64, f64, String) = conn
            .query_row("SELECT min_lon, max_lat, ring FROM poi_areas", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .expect("read row");
        assert_eq!(min_lon, -8.66);
        assert_eq!(max_lat, 40.65);
        let decoded: Vec<[f64; 2]> = serde_json::from_str(&ring).expect("ring is JSON");
        assert_eq!(decoded.first(), decoded.last(), "ring is closed");
        assert_eq!(decoded.len(), 5);
    }

    #[rstest]
    fn rewriting_replaces_rows(temp_dir: TempDir, pharmacy: PoiFeature) {
        let path = db_path(&temp_dir, "pois.db");
        persist_pois_to_sqlite(&path, std::slice::from_ref(&pharmacy)).expect("first write");
        let mut renamed = pharmacy;
        renamed
            .tags
            .insert("name".to_owned(), "Farmácia Nova".to_owned());

        persist_pois_to_sqlite(&path, &[renamed]).expect("second write");

        let conn = Connection::open(path.as_std_path()).expect("open database");
        let (count, name): (i64, String) = conn
            .query_row("SELECT COUNT(*), MAX(name) FROM poi_points", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .expect("read rows");
        assert_eq!(count, 1);
        assert_eq!(name, "Farmácia Nova");
    }

    #[rstest]
    fn creates_parent_directory(temp_dir: TempDir, pharmacy: PoiFeature) {
        let nested = db_path(&temp_dir, "nested/deeper/pois.db");

        persist_pois_to_sqlite(&nested, &[pharmacy]).expect("persist into nested path");

        assert!(nested.exists(), "database should be created at nested path");
    }

    #[rstest]
    fn rejects_out_of_range_id(temp_dir: TempDir) {
        let path = db_path(&temp_dir, "pois.db");
        let feature = PoiFeature::point(u64::MAX, GeoPoint::new(0.0, 0.0), BTreeMap::new());

        let err = persist_pois_to_sqlite(&path, &[feature]).expect_err("id out of range");
        assert!(matches!(err, PersistPoisError::PoiIdOutOfRange { poi_id } if poi_id == u64::MAX));
    }

    #[rstest]
    fn rejects_empty_area_and_keeps_database_unchanged(temp_dir: TempDir, pharmacy: PoiFeature) {
        let path = db_path(&temp_dir, "pois.db");
        let empty = PoiFeature::area(
            3,
            Polygon::new(LineString::new(Vec::new()), Vec::new()),
            BTreeMap::new(),
        );

        let err = persist_pois_to_sqlite(&path, &[pharmacy, empty]).expect_err("empty ring");
        assert!(matches!(err, PersistPoisError::EmptyArea { poi_id: 3 }));

        let conn = Connection::open(path.as_std_path()).expect("open database");
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .expect("count tables");
        assert_eq!(tables, 0, "transaction should roll back");
    }
}
