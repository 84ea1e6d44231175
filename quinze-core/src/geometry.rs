//! Geographic value types and great-circle distance.
//!
//! [`GeoPoint`] is a plain latitude/longitude pair in WGS84 degrees. Conversions
//! to and from [`geo::Coord`] follow the `geo` axis order (`x = longitude`,
//! `y = latitude`).

use geo::{Coord, Intersects, Rect};
use thiserror::Error;

/// Mean Earth radius used by [`haversine_distance_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// An immutable WGS84 coordinate.
///
/// # Examples
/// ```
/// use quinze_core::GeoPoint;
///
/// let aveiro = GeoPoint::new(40.640, -8.654);
/// assert_eq!(aveiro.latitude, 40.640);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Construct a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Report whether both components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance to `other` in metres.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_distance_meters(*self, *other)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// Great-circle distance between two points using the haversine formula.
///
/// The result is in metres on a sphere of radius [`EARTH_RADIUS_METERS`].
/// Identical points yield exactly `0.0`.
///
/// # Examples
/// ```
/// use quinze_core::{GeoPoint, haversine_distance_meters};
///
/// let p = GeoPoint::new(40.640, -8.654);
/// assert_eq!(haversine_distance_meters(p, p), 0.0);
///
/// // One degree of latitude is roughly 111 km.
/// let north = GeoPoint::new(41.640, -8.654);
/// let d = haversine_distance_meters(p, north);
/// assert!((d - 111_195.0).abs() < 1.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn haversine_distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let half_dlat = (to.latitude - from.latitude).to_radians() / 2.0;
    let half_dlng = (to.longitude - from.longitude).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat_from.cos() * lat_to.cos() * half_dlng.sin().powi(2);
    // Rounding can push `h` marginally past 1 for antipodal points.
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Errors returned when constructing a [`BoundingBox`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundingBoxError {
    /// A bound was NaN or infinite.
    #[error("bounding box coordinates must be finite")]
    NonFinite,
    /// The minimum latitude was not strictly below the maximum.
    #[error("bounding box latitude range is empty: {min_lat} >= {max_lat}")]
    EmptyLatitudeRange {
        /// Lower latitude bound.
        min_lat: f64,
        /// Upper latitude bound.
        max_lat: f64,
    },
    /// The minimum longitude was not strictly below the maximum.
    #[error("bounding box longitude range is empty: {min_lng} >= {max_lng}")]
    EmptyLongitudeRange {
        /// Lower longitude bound.
        min_lng: f64,
        /// Upper longitude bound.
        max_lng: f64,
    },
}

/// An axis-aligned latitude/longitude rectangle with non-empty extent.
///
/// Containment checks include the boundary. Regions crossing the antimeridian
/// are not modelled.
///
/// # Examples
/// ```
/// use quinze_core::{BoundingBox, GeoPoint};
///
/// # fn main() -> Result<(), quinze_core::BoundingBoxError> {
/// let bbox = BoundingBox::around(GeoPoint::new(40.640, -8.654), 0.18)?;
/// assert!(bbox.contains(&GeoPoint::new(40.7, -8.6)));
/// assert!(!bbox.contains(&GeoPoint::new(41.0, -8.6)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    rect: Rect<f64>,
}

impl BoundingBox {
    /// Validate and construct a bounding box.
    ///
    /// # Errors
    /// Returns [`BoundingBoxError`] when a bound is not finite or when either
    /// range is empty.
    pub fn new(
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> Result<Self, BoundingBoxError> {
        if ![min_lat, max_lat, min_lng, max_lng]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(BoundingBoxError::NonFinite);
        }
        if min_lat >= max_lat {
            return Err(BoundingBoxError::EmptyLatitudeRange { min_lat, max_lat });
        }
        if min_lng >= max_lng {
            return Err(BoundingBoxError::EmptyLongitudeRange { min_lng, max_lng });
        }
        Ok(Self {
            rect: Rect::new(
                Coord {
                    x: min_lng,
                    y: min_lat,
                },
                Coord {
                    x: max_lng,
                    y: max_lat,
                },
            ),
        })
    }

    /// Build a square box extending `radius_degrees` from `center` on both axes.
    ///
    /// # Errors
    /// Returns [`BoundingBoxError`] when the centre or radius is not finite, or
    /// the radius is not positive.
    #[expect(
        clippy::float_arithmetic,
        reason = "box corners are offsets from the centre"
    )]
    pub fn around(center: GeoPoint, radius_degrees: f64) -> Result<Self, BoundingBoxError> {
        Self::new(
            center.latitude - radius_degrees,
            center.latitude + radius_degrees,
            center.longitude - radius_degrees,
            center.longitude + radius_degrees,
        )
    }

    /// Southern bound.
    #[must_use]
    pub fn min_lat(&self) -> f64 {
        self.rect.min().y
    }

    /// Northern bound.
    #[must_use]
    pub fn max_lat(&self) -> f64 {
        self.rect.max().y
    }

    /// Western bound.
    #[must_use]
    pub fn min_lng(&self) -> f64 {
        self.rect.min().x
    }

    /// Eastern bound.
    #[must_use]
    pub fn max_lng(&self) -> f64 {
        self.rect.max().x
    }

    /// Latitude extent in degrees.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.rect.height()
    }

    /// Longitude extent in degrees.
    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.rect.width()
    }

    /// Report whether `point` lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.rect.intersects(&Coord::from(*point))
    }

    /// The box as a `geo` rectangle (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn to_rect(&self) -> Rect<f64> {
        self.rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn distance_is_zero_for_identical_points() {
        let p = GeoPoint::new(38.7223, -9.1393);
        assert_eq!(haversine_distance_meters(p, p), 0.0);
    }

    #[rstest]
    fn distance_is_symmetric() {
        let lisbon = GeoPoint::new(38.7223, -9.1393);
        let porto = GeoPoint::new(41.1579, -8.6291);
        let there = haversine_distance_meters(lisbon, porto);
        let back = haversine_distance_meters(porto, lisbon);
        assert!((there - back).abs() < 1e-6);
        // Lisbon to Porto is about 274 km in a straight line.
        assert!((there - 274_000.0).abs() < 2_000.0, "got {there}");
    }

    #[rstest]
    fn distance_to_agrees_with_haversine() {
        let aveiro = GeoPoint::new(40.640, -8.654);
        let ilhavo = GeoPoint::new(40.600, -8.667);
        assert_eq!(aveiro.distance_to(&ilhavo), haversine_distance_meters(aveiro, ilhavo));
    }

    #[rstest]
    #[case(GeoPoint::new(1.5, 0.5))]
    #[case(GeoPoint::new(0.5, -0.1))]
    fn contains_rejects_outside_points(#[case] point: GeoPoint) {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).expect("valid box");
        assert!(!bbox.contains(&point));
    }

    #[rstest]
    fn coord_conversion_swaps_axes() {
        let coord: Coord<f64> = GeoPoint::new(1.0, 2.0).into();
        assert_eq!(coord, Coord { x: 2.0, y: 1.0 });
        assert_eq!(GeoPoint::from(coord), GeoPoint::new(1.0, 2.0));
    }

    #[rstest]
    fn around_builds_symmetric_box() {
        let bbox = BoundingBox::around(GeoPoint::new(40.0, -8.0), 0.5).expect("valid box");
        assert_eq!(bbox.min_lat(), 39.5);
        assert_eq!(bbox.max_lat(), 40.5);
        assert_eq!(bbox.min_lng(), -8.5);
        assert_eq!(bbox.max_lng(), -7.5);
        assert_eq!(bbox.lat_span(), bbox.lng_span());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    fn around_rejects_non_positive_radius(#[case] radius: f64) {
        let err = BoundingBox::around(GeoPoint::new(40.0, -8.0), radius).expect_err("empty box");
        assert!(matches!(err, BoundingBoxError::EmptyLatitudeRange { .. }));
    }

    #[rstest]
    fn new_rejects_non_finite_bounds() {
        let err = BoundingBox::new(f64::NAN, 1.0, 0.0, 1.0).expect_err("nan bound");
        assert_eq!(err, BoundingBoxError::NonFinite);
    }

    #[rstest]
    fn new_rejects_inverted_longitude() {
        let err = BoundingBox::new(0.0, 1.0, 2.0, 1.0).expect_err("inverted longitude");
        assert!(matches!(err, BoundingBoxError::EmptyLongitudeRange { .. }));
    }

    #[rstest]
    #[case(GeoPoint::new(0.0, 0.0))]
    #[case(GeoPoint::new(1.0, 1.0))]
    #[case(GeoPoint::new(0.0, 1.0))]
    #[case(GeoPoint::new(0.5, 0.5))]
    fn contains_includes_boundary(#[case] point: GeoPoint) {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).expect("valid box");
        assert!(bbox.contains(&point));
    }

    #[rstest]
    fn to_rect_uses_lon_lat_axis_order() {
        let bbox = BoundingBox::new(10.0, 11.0, -9.0, -8.0).expect("valid box");
        let rect = bbox.to_rect();
        assert_eq!(rect.min(), Coord { x: -9.0, y: 10.0 });
        assert_eq!(rect.max(), Coord { x: -8.0, y: 11.0 });
    }
}
