//! Read-only `PoiSource` backed by a SQLite POI database.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use geo::{Centroid, LineString, Polygon};
use quinze_core::{
    BoundingBox, CategoryDescriptor, CategoryTable, GeoPoint, PoiLocation, PoiLookup, PoiSource,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params_from_iter};
use thiserror::Error;

use super::schema::{AREAS_TABLE, POINTS_TABLE};

/// Error raised when opening or querying a SQLite POI database.
#[derive(Debug, Error)]
pub enum SqlitePoiSourceError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database lacks one of the POI tables.
    #[error("SQLite database is missing the {table} table")]
    MissingTable {
        /// Name of the absent table.
        table: &'static str,
    },
    /// A stored area ring was not a JSON coordinate list.
    #[error("failed to parse ring for area {id}: {source}")]
    InvalidRing {
        /// Identifier of the area whose ring failed to parse.
        id: i64,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Generic SQLite error when reading POI rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-only POI source over the `poi_points` and `poi_areas` tables.
///
/// A category lookup applies the category's tag predicates to both tables.
/// Points are kept when their coordinates fall inside the box, boundary
/// included. Areas are represented by the centroid of their exterior ring and
/// kept when that centroid falls inside the box.
///
/// Query failures degrade to [`PoiLookup::Unavailable`] and are logged.
pub struct SqlitePoiSource {
    connection: Mutex<Connection>,
    categories: CategoryTable,
    path: Utf8PathBuf,
}

impl fmt::Debug for SqlitePoiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlitePoiSource")
            .field("path", &self.path)
            .field("categories", &self.categories.len())
            .finish_non_exhaustive()
    }
}

impl SqlitePoiSource {
    /// Open the database at `path` read-only, translating category keys with
    /// `categories`.
    ///
    /// # Errors
    /// Returns [`SqlitePoiSourceError::OpenDatabase`] when the file cannot be
    /// opened and [`SqlitePoiSourceError::MissingTable`] when it does not hold
    /// the POI tables.
    pub fn open(
        path: &Utf8Path,
        categories: CategoryTable,
    ) -> Result<Self, SqlitePoiSourceError> {
        let connection =
            Connection::open_with_flags(path.as_std_path(), OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(|source| SqlitePoiSourceError::OpenDatabase {
                    path: path.to_path_buf(),
                    source,
                })?;

        for table in [POINTS_TABLE, AREAS_TABLE] {
            ensure_table(&connection, table)?;
        }

        Ok(Self {
            connection: Mutex::new(connection),
            categories,
            path: path.to_path_buf(),
        })
    }

    /// Category table used to translate lookups.
    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Query every POI matching `descriptor` inside `bbox`.
    ///
    /// Points come first, then areas, each ordered by identifier.
    ///
    /// # Errors
    /// Returns [`SqlitePoiSourceError`] when a query fails or a stored ring is
    /// malformed.
    pub fn query(
        &self,
        descriptor: &CategoryDescriptor,
        bbox: &BoundingBox,
    ) -> Result<Vec<PoiLocation>, SqlitePoiSourceError> {
        let connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut locations = query_points(&connection, descriptor, bbox)?;
        locations.extend(query_areas(&connection, descriptor, bbox)?);
        Ok(locations)
    }
}

impl PoiSource for SqlitePoiSource {
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
        let Some(descriptor) = self.categories.get(category) else {
            return PoiLookup::UnknownCategory;
        };
        match self.query(descriptor, bbox) {
            Ok(locations) => PoiLookup::Found(locations),
            Err(err) => {
                log::warn!(
                    "SQLite lookup for '{category}' in {} failed: {err}",
                    self.path
                );
                PoiLookup::unavailable(err)
            }
        }
    }
}

fn ensure_table(connection: &Connection, table: &'static str) -> Result<(), SqlitePoiSourceError> {
    connection
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .map(|_| ())
        .ok_or(SqlitePoiSourceError::MissingTable { table })
}

/// Build an `OR` of tag predicates over `table.tags` and its bound values.
fn tag_filter(table: &str, descriptor: &CategoryDescriptor) -> (String, Vec<Value>) {
    let mut values = Vec::new();
    let clauses: Vec<String> = descriptor
        .predicates()
        .iter()
        .map(|predicate| {
            values.push(Value::Text(predicate.key().to_owned()));
            values.extend(predicate.values().iter().cloned().map(Value::Text));
            let placeholders = vec!["?"; predicate.values().len()].join(", ");
            format!(
                "EXISTS (SELECT 1 FROM json_each({table}.tags) AS tag \
                 WHERE tag.key = ? AND tag.value IN ({placeholders}))"
            )
        })
        .collect();
    (clauses.join(" OR "), values)
}

fn bounds(bbox: &BoundingBox) -> [Value; 4] {
    let rect = bbox.to_rect();
    [
        Value::Real(rect.min().x),
        Value::Real(rect.max().x),
        Value::Real(rect.min().y),
        Value::Real(rect.max().y),
    ]
}

fn query_points(
    connection: &Connection,
    descriptor: &CategoryDescriptor,
    bbox: &BoundingBox,
) -> Result<Vec<PoiLocation>, SqlitePoiSourceError> {
    let (filter, tag_values) = tag_filter(POINTS_TABLE, descriptor);
    let sql = format!(
        "SELECT lon, lat, name FROM {POINTS_TABLE} \
         WHERE lon BETWEEN ? AND ? AND lat BETWEEN ? AND ? AND ({filter}) \
         ORDER BY id"
    );
    let mut statement = connection.prepare(&sql)?;
    let params = bounds(bbox).into_iter().chain(tag_values);
    let rows = statement.query_map(params_from_iter(params), |row| {
        let lon: f64 = row.get(0)?;
        let lat: f64 = row.get(1)?;
        let name: Option<String> = row.get(2)?;
        Ok(PoiLocation {
            location: GeoPoint::new(lat, lon),
            name,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn query_areas(
    connection: &Connection,
    descriptor: &CategoryDescriptor,
    bbox: &BoundingBox,
) -> Result<Vec<PoiLocation>, SqlitePoiSourceError> {
    let (filter, tag_values) = tag_filter(AREAS_TABLE, descriptor);
    let sql = format!(
        "SELECT id, name, ring FROM {AREAS_TABLE} \
         WHERE max_lon >= ? AND min_lon <= ? AND max_lat >= ? AND min_lat <= ? AND ({filter}) \
         ORDER BY id"
    );
    let mut statement = connection.prepare(&sql)?;
    let params = bounds(bbox).into_iter().chain(tag_values);
    let mut rows = statement.query(params_from_iter(params))?;

    let mut locations = Vec::new();
    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let name: Option<String> = row.get(1)?;
        let ring_json: String = row.get(2)?;
        let ring: Vec<[f64; 2]> = serde_json::from_str(&ring_json)
            .map_err(|source| SqlitePoiSourceError::InvalidRing { id, source })?;
        let Some(centroid) = Polygon::new(LineString::from(ring), Vec::new()).centroid() else {
            log::debug!("skipping area {id} with an empty ring");
            continue;
        };
        let location = GeoPoint::from(centroid.0);
        if bbox.contains(&location) {
            locations.push(PoiLocation { location, name });
        }
    }
    Ok(locations)
}
