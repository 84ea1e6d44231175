use crate::GeoPoint;

/// A categorised location returned by a [`PoiSource`](crate::PoiSource).
///
/// Polygon features are represented by their centroid.
///
/// # Examples
/// ```
/// use quinze_core::{GeoPoint, PoiLocation};
///
/// let poi = PoiLocation::named(GeoPoint::new(40.64, -8.65), "Pingo Doce");
/// assert_eq!(poi.name.as_deref(), Some("Pingo Doce"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoiLocation {
    /// Representative point.
    pub location: GeoPoint,
    /// Display name, when the feature carries one.
    pub name: Option<String>,
}

impl PoiLocation {
    /// Construct an unnamed location.
    #[must_use]
    pub const fn new(location: GeoPoint) -> Self {
        Self {
            location,
            name: None,
        }
    }

    /// Construct a named location.
    #[must_use]
    pub fn named(location: GeoPoint, name: impl Into<String>) -> Self {
        Self {
            location,
            name: Some(name.into()),
        }
    }
}
