//! Category catalogue mapping POI type keys to tag predicates.
//!
//! Search requests name POI categories with plain string keys such as
//! `"supermarkets"`. Backends translate a key into backend-specific filters by
//! looking it up in a [`CategoryTable`]: each entry lists OpenStreetMap-style
//! tag predicates, any of which admits a feature into the category.
//!
//! The grid scorer never reads this table. It is injected into
//! [`PoiSource`](crate::PoiSource) implementations.

use std::collections::BTreeMap;

use thiserror::Error;

/// Match features whose tag `key` equals one of `values`.
///
/// # Examples
/// ```
/// use quinze_core::TagPredicate;
///
/// # fn main() -> Result<(), quinze_core::CategoryError> {
/// let predicate = TagPredicate::new("amenity", ["hospital", "clinic"])?;
/// assert_eq!(predicate.values(), ["hospital", "clinic"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPredicate {
    key: String,
    values: Vec<String>,
}

impl TagPredicate {
    /// Build a predicate from a tag key and accepted values.
    ///
    /// # Errors
    /// Returns [`CategoryError::InvalidPredicate`] when the key is blank, no
    /// values are supplied, or a value is blank.
    pub fn new<I, V>(key: impl Into<String>, values: I) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let tag_key = key.into();
        let accepted: Vec<String> = values.into_iter().map(Into::into).collect();
        if tag_key.trim().is_empty()
            || accepted.is_empty()
            || accepted.iter().any(|v| v.trim().is_empty())
        {
            return Err(CategoryError::InvalidPredicate { key: tag_key });
        }
        Ok(Self {
            key: tag_key,
            values: accepted,
        })
    }

    /// Tag key inspected by the predicate.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Accepted tag values.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Errors raised while building a [`CategoryTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    /// A predicate was missing its key or values.
    #[error("tag predicate for key '{key}' must have a key and at least one non-empty value")]
    InvalidPredicate {
        /// Offending tag key.
        key: String,
    },
    /// A category key was blank.
    #[error("category key must not be empty")]
    EmptyKey,
    /// A category declared no predicates.
    #[error("category '{key}' must declare at least one tag predicate")]
    NoPredicates {
        /// Offending category key.
        key: String,
    },
}

/// A category key together with the predicates that define it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDescriptor {
    key: String,
    predicates: Vec<TagPredicate>,
}

impl CategoryDescriptor {
    /// Build a descriptor.
    ///
    /// # Errors
    /// Returns [`CategoryError`] when the key is blank or `predicates` is
    /// empty.
    pub fn new(
        key: impl Into<String>,
        predicates: Vec<TagPredicate>,
    ) -> Result<Self, CategoryError> {
        let category_key = key.into();
        if category_key.trim().is_empty() {
            return Err(CategoryError::EmptyKey);
        }
        if predicates.is_empty() {
            return Err(CategoryError::NoPredicates { key: category_key });
        }
        Ok(Self {
            key: category_key,
            predicates,
        })
    }

    /// Category key used in search requests.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Predicates admitting a feature into the category.
    #[must_use]
    pub fn predicates(&self) -> &[TagPredicate] {
        &self.predicates
    }
}

/// Explicit lookup table from category key to [`CategoryDescriptor`].
///
/// [`CategoryTable::default`] carries the amenity catalogue used for
/// Portuguese municipalities. Custom tables can be assembled with
/// [`CategoryTable::with_category`].
///
/// # Examples
/// ```
/// use quinze_core::CategoryTable;
///
/// let table = CategoryTable::default();
/// let hospitals = table.get("hospitals").expect("default category");
/// assert_eq!(hospitals.predicates()[0].key(), "amenity");
/// assert!(table.get("dragons").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    entries: BTreeMap<String, CategoryDescriptor>,
}

/// Default catalogue as `(category, [(tag key, [values])])`.
const DEFAULT_CATEGORIES: &[(&str, &[(&str, &[&str])])] = &[
    ("hospitals", &[("amenity", &["hospital"])]),
    (
        "health_centers",
        &[("amenity", &["clinic", "doctors"]), ("healthcare", &["centre"])],
    ),
    ("pharmacies", &[("amenity", &["pharmacy"])]),
    (
        "supermarkets",
        &[("shop", &["supermarket", "convenience", "greengrocer"])],
    ),
    ("schools", &[("amenity", &["school"])]),
    ("kindergartens", &[("amenity", &["kindergarten", "childcare"])]),
    ("universities", &[("amenity", &["university", "college"])]),
    ("parks", &[("leisure", &["park", "garden"])]),
    ("playgrounds", &[("leisure", &["playground"])]),
    (
        "sports",
        &[("leisure", &["sports_centre", "pitch", "fitness_centre", "swimming_pool"])],
    ),
    ("restaurants", &[("amenity", &["restaurant", "fast_food"])]),
    ("cafes", &[("amenity", &["cafe", "bar"])]),
    ("banks", &[("amenity", &["bank", "atm"])]),
    ("post_offices", &[("amenity", &["post_office"])]),
    ("libraries", &[("amenity", &["library"])]),
    (
        "bus_stops",
        &[("highway", &["bus_stop"]), ("amenity", &["bus_station"])],
    ),
    (
        "train_stations",
        &[("railway", &["station", "halt"]), ("public_transport", &["station"])],
    ),
    ("police", &[("amenity", &["police"])]),
    ("fire_stations", &[("amenity", &["fire_station"])]),
    ("cinemas", &[("amenity", &["cinema", "theatre"])]),
];

impl CategoryTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace a category.
    pub fn insert(&mut self, descriptor: CategoryDescriptor) {
        self.entries.insert(descriptor.key.clone(), descriptor);
    }

    /// Add a category while consuming `self`, enabling chaining.
    #[must_use]
    pub fn with_category(mut self, descriptor: CategoryDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Look up a category by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CategoryDescriptor> {
        self.entries.get(key)
    }

    /// Iterate over category keys in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over all descriptors in key order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryDescriptor> {
        self.entries.values()
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let entries = DEFAULT_CATEGORIES
            .iter()
            .map(|(key, predicates)| {
                let descriptor = CategoryDescriptor {
                    key: (*key).to_owned(),
                    predicates: predicates
                        .iter()
                        .map(|(tag, values)| TagPredicate {
                            key: (*tag).to_owned(),
                            values: values.iter().map(|v| (*v).to_owned()).collect(),
                        })
                        .collect(),
                };
                ((*key).to_owned(), descriptor)
            })
            .collect();
        Self { entries }
    }
}
