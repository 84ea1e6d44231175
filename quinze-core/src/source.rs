//! Lookup traits for points of interest.
//!
//! The [`PoiSource`] trait is the boundary between the scoring engine and
//! whatever stores POIs: a database, an HTTP API, or an in-memory fixture.
//! Consumers ask for every location of one category inside a
//! [`BoundingBox`].
//!
//! Lookups never fail with an error. An unreachable backend is reported as
//! [`PoiLookup::Unavailable`] so callers can degrade to "no candidates"
//! without special-casing errors.

use std::sync::Arc;

use crate::{BoundingBox, PoiLocation};

/// Outcome of a category lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PoiLookup {
    /// The category is known; zero or more locations were found.
    Found(Vec<PoiLocation>),
    /// The backend has no definition for the requested category.
    UnknownCategory,
    /// The backend could not answer.
    Unavailable {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl PoiLookup {
    /// Build an [`PoiLookup::Unavailable`] from any displayable failure.
    #[must_use]
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            reason: reason.to_string(),
        }
    }

    /// Return the locations, treating unknown and unavailable as empty.
    #[must_use]
    pub fn into_locations(self) -> Vec<PoiLocation> {
        match self {
            Self::Found(locations) => locations,
            Self::UnknownCategory | Self::Unavailable { .. } => Vec::new(),
        }
    }
}

/// Read-only access to categorised points of interest.
///
/// Implementations must be thread-safe: the scorer queries several
/// categories concurrently. Containment includes boundary points.
///
/// # Examples
///
/// ```rust
/// use quinze_core::{BoundingBox, GeoPoint, PoiLocation, PoiLookup, PoiSource};
///
/// struct Pharmacies(Vec<PoiLocation>);
///
/// impl PoiSource for Pharmacies {
///     fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
///         if category != "pharmacies" {
///             return PoiLookup::UnknownCategory;
///         }
///         PoiLookup::Found(
///             self.0
///                 .iter()
///                 .filter(|p| bbox.contains(&p.location))
///                 .cloned()
///                 .collect(),
///         )
///     }
/// }
///
/// # fn main() -> Result<(), quinze_core::BoundingBoxError> {
/// let source = Pharmacies(vec![PoiLocation::new(GeoPoint::new(0.0, 0.0))]);
/// let bbox = BoundingBox::new(-1.0, 1.0, -1.0, 1.0)?;
/// assert_eq!(source.lookup("pharmacies", &bbox).into_locations().len(), 1);
/// assert_eq!(source.lookup("zoos", &bbox), PoiLookup::UnknownCategory);
/// # Ok(())
/// # }
/// ```
pub trait PoiSource: Send + Sync {
    /// Return every location of `category` that falls within `bbox`.
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup;
}

impl<T: PoiSource + ?Sized> PoiSource for &T {
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
        (**self).lookup(category, bbox)
    }
}

impl<T: PoiSource + ?Sized> PoiSource for Box<T> {
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
        (**self).lookup(category, bbox)
    }
}

impl<T: PoiSource + ?Sized> PoiSource for Arc<T> {
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
        (**self).lookup(category, bbox)
    }
}
