//! JSON request and response bodies for the grid search.
//!
//! Field names follow the HTTP contract the engine is served behind:
//! `location`, `pois`, `transport_mode`, `max_time`, `grid_resolution` and
//! `top_locations` on the way in; `heatmap`, `top_locations` and
//! `analysis_info` on the way out. Numeric inputs are accepted as signed
//! integers so that negative values are reported as validation errors rather
//! than decoding failures.

use serde::{Deserialize, Serialize};

use crate::{
    AnalysisInfo, AnalysisRequest, AnalysisResult, DEFAULT_GRID_RESOLUTION,
    DEFAULT_MAX_TIME_MINUTES, DEFAULT_TOP_K, GeoPoint, GridCell, PerCategoryScore,
    PoiRequirement, RequestValidationError, TransportMode,
};

/// A `{lat, lng}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl From<LatLng> for GeoPoint {
    fn from(value: LatLng) -> Self {
        Self::new(value.lat, value.lng)
    }
}

/// A requirement as it appears in the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiRequirementBody {
    /// Category key.
    #[serde(rename = "type")]
    pub poi_type: String,
    /// Weight, expected in `1..=4`.
    pub importance: i64,
}

/// Decoded search request.
///
/// # Examples
/// ```
/// use quinze_core::{AnalysisRequest, wire::AnalysisRequestBody};
///
/// let body: AnalysisRequestBody = serde_json::from_str(
///     r#"{"location": {"lat": 40.64, "lng": -8.654},
///         "pois": [{"type": "pharmacies", "importance": 3}]}"#,
/// )?;
/// let request = AnalysisRequest::try_from(body)?;
/// assert_eq!(request.grid_resolution, 75);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequestBody {
    /// Reference location.
    #[serde(default)]
    pub location: Option<LatLng>,
    /// Weighted requirements.
    #[serde(default)]
    pub pois: Vec<PoiRequirementBody>,
    /// Routing profile name; unknown names fall back to walking.
    #[serde(default = "default_transport_mode")]
    pub transport_mode: String,
    /// Time budget in minutes.
    #[serde(default = "default_max_time")]
    pub max_time: i64,
    /// Samples per grid axis.
    #[serde(default = "default_grid_resolution")]
    pub grid_resolution: i64,
    /// Number of ranked locations to return.
    #[serde(default = "default_top_locations")]
    pub top_locations: i64,
}

fn default_transport_mode() -> String {
    TransportMode::Walking.as_profile().to_owned()
}

fn default_max_time() -> i64 {
    i64::from(DEFAULT_MAX_TIME_MINUTES)
}

fn default_grid_resolution() -> i64 {
    i64::from(DEFAULT_GRID_RESOLUTION)
}

fn default_top_locations() -> i64 {
    i64::from(DEFAULT_TOP_K)
}

fn positive_u32(
    value: i64,
    field: &'static str,
    non_positive: fn(i64) -> RequestValidationError,
) -> Result<u32, RequestValidationError> {
    if value <= 0 {
        return Err(non_positive(value));
    }
    u32::try_from(value).map_err(|_| RequestValidationError::TooLarge { field, value })
}

impl TryFrom<AnalysisRequestBody> for AnalysisRequest {
    type Error = RequestValidationError;

    fn try_from(body: AnalysisRequestBody) -> Result<Self, Self::Error> {
        let center = body
            .location
            .ok_or(RequestValidationError::MissingCenter)?
            .into();
        let requirements = body
            .pois
            .into_iter()
            .map(|poi| match u8::try_from(poi.importance) {
                Ok(importance) => Ok(PoiRequirement::new(poi.poi_type, importance)),
                Err(_) => Err(RequestValidationError::ImportanceOutOfRange {
                    poi_type: poi.poi_type,
                    importance: poi.importance,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let max_time = positive_u32(body.max_time, "max_time", |value| {
            RequestValidationError::NonPositiveMaxTime { value }
        })?;
        let grid_resolution = positive_u32(body.grid_resolution, "grid_resolution", |value| {
            RequestValidationError::NonPositiveGridResolution { value }
        })?;
        let top_k = positive_u32(body.top_locations, "top_locations", |value| {
            RequestValidationError::NonPositiveTopK { value }
        })?;

        let request = Self::new(center, requirements)
            .with_transport_mode(TransportMode::from_profile_or_walking(&body.transport_mode))
            .with_max_time_minutes(max_time)
            .with_grid_resolution(grid_resolution)
            .with_top_k(top_k);
        request.validate()?;
        Ok(request)
    }
}

/// One requirement's breakdown in a ranked location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiScoreBody {
    /// Category key.
    #[serde(rename = "type")]
    pub poi_type: String,
    /// Contribution after distance decay.
    pub score: f64,
    /// Maximum possible contribution.
    pub max_score: f64,
    /// Metres to the nearest POI, `null` when none was found.
    pub nearest_distance: Option<f64>,
}

impl From<&PerCategoryScore> for PoiScoreBody {
    fn from(score: &PerCategoryScore) -> Self {
        Self {
            poi_type: score.poi_type.clone(),
            score: score.score,
            max_score: score.max_score,
            nearest_distance: score.nearest_distance_meters,
        }
    }
}

/// A ranked location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLocationBody {
    /// Latitude of the sample.
    pub lat: f64,
    /// Longitude of the sample.
    pub lng: f64,
    /// Normalised score in `0..=100`.
    pub total_score: f64,
    /// Per-requirement breakdown.
    pub poi_scores: Vec<PoiScoreBody>,
}

impl From<&GridCell> for TopLocationBody {
    fn from(cell: &GridCell) -> Self {
        Self {
            lat: cell.latitude,
            lng: cell.longitude,
            total_score: cell.score,
            poi_scores: cell.poi_scores.iter().map(PoiScoreBody::from).collect(),
        }
    }
}

/// Run summary as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInfoBody {
    /// Samples per grid axis.
    pub grid_resolution: u32,
    /// Reachable distance in metres.
    pub max_distance_meters: f64,
    /// Number of requirements.
    pub poi_count: usize,
    /// Number of sampled cells.
    pub total_grid_points: usize,
}

impl From<&AnalysisInfo> for AnalysisInfoBody {
    fn from(info: &AnalysisInfo) -> Self {
        Self {
            grid_resolution: info.grid_resolution,
            max_distance_meters: info.max_distance_meters,
            poi_count: info.poi_count,
            total_grid_points: info.total_grid_points,
        }
    }
}

/// Encoded search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponseBody {
    /// `[lat, lng, weight]` triples.
    pub heatmap: Vec<[f64; 3]>,
    /// Ranked locations, best first.
    pub top_locations: Vec<TopLocationBody>,
    /// Run summary.
    pub analysis_info: AnalysisInfoBody,
}

impl From<&AnalysisResult> for AnalysisResponseBody {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            heatmap: result
                .heatmap_points
                .iter()
                .map(|p| [p.latitude, p.longitude, p.weight])
                .collect(),
            top_locations: result
                .top_locations
                .iter()
                .map(TopLocationBody::from)
                .collect(),
            analysis_info: AnalysisInfoBody::from(&result.info),
        }
    }
}
