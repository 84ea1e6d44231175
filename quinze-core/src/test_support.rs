//! In-memory `PoiSource` implementations used by unit and behaviour tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{BoundingBox, PoiLocation, PoiLookup, PoiSource};

/// In-memory `PoiSource` keyed by category.
///
/// Categories that were never registered report
/// [`PoiLookup::UnknownCategory`]. Lookups perform a linear scan and are
/// intended only for small datasets.
#[derive(Debug, Default, Clone)]
pub struct MemoryPoiSource {
    categories: HashMap<String, Vec<PoiLocation>>,
    unavailable: HashMap<String, String>,
}

impl MemoryPoiSource {
    /// Create a source with no categories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `category` with the given locations, appending to any already
    /// present.
    #[must_use]
    pub fn with_locations<I>(mut self, category: impl Into<String>, locations: I) -> Self
    where
        I: IntoIterator<Item = PoiLocation>,
    {
        self.categories
            .entry(category.into())
            .or_default()
            .extend(locations);
        self
    }

    /// Make lookups for `category` fail with `reason`.
    #[must_use]
    pub fn with_unavailable(mut self, category: impl Into<String>, reason: impl Into<String>) -> Self {
        self.unavailable.insert(category.into(), reason.into());
        self
    }
}

impl PoiSource for MemoryPoiSource {
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
        if let Some(reason) = self.unavailable.get(category) {
            return PoiLookup::unavailable(reason);
        }
        self.categories
            .get(category)
            .map_or(PoiLookup::UnknownCategory, |locations| {
                PoiLookup::Found(
                    locations
                        .iter()
                        .filter(|poi| bbox.contains(&poi.location))
                        .cloned()
                        .collect(),
                )
            })
    }
}

/// `PoiSource` whose backend is always down.
#[derive(Debug, Clone)]
pub struct UnavailablePoiSource {
    reason: String,
}

impl UnavailablePoiSource {
    /// Fail every lookup with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PoiSource for UnavailablePoiSource {
    fn lookup(&self, _category: &str, _bbox: &BoundingBox) -> PoiLookup {
        PoiLookup::unavailable(&self.reason)
    }
}

/// Wraps a source and records how often each category is looked up.
#[derive(Debug, Default)]
pub struct CountingPoiSource<S> {
    inner: S,
    lookups: Mutex<HashMap<String, usize>>,
}

impl<S> CountingPoiSource<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lookups: Mutex::new(HashMap::new()),
        }
    }

    /// Number of lookups issued for `category`.
    #[must_use]
    pub fn lookups_for(&self, category: &str) -> usize {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(category)
            .copied()
            .unwrap_or_default()
    }

    /// Number of lookups issued across all categories.
    #[must_use]
    pub fn total_lookups(&self) -> usize {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl<S: PoiSource> PoiSource for CountingPoiSource<S> {
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
        *self
            .lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(category.to_owned())
            .or_default() += 1;
        self.inner.lookup(category, bbox)
    }
}
