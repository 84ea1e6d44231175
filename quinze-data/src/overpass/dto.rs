//! DTOs for decoding Overpass JSON responses.
//!
//! Responses decode into these transport types first, then map into
//! [`PoiLocation`]s in one pass.

use std::collections::BTreeMap;

use quinze_core::{BoundingBox, GeoPoint, PoiLocation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
    /// Set by the server when the query failed after the header was sent,
    /// for example on a server-side timeout.
    #[serde(default)]
    pub(super) remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: String,
    pub(super) id: i64,
    pub(super) lon: Option<f64>,
    pub(super) lat: Option<f64>,
    pub(super) center: Option<OverpassElementCenterDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementCenterDto {
    pub(super) lon: f64,
    pub(super) lat: f64,
}

impl OverpassResponseDto {
    /// Server-side failure reported in the response body.
    pub(super) fn runtime_error(&self) -> Option<&str> {
        self.remark
            .as_deref()
            .filter(|remark| remark.contains("runtime error"))
    }

    /// Keep elements with finite coordinates inside `bbox`.
    ///
    /// Elements without usable coordinates are skipped rather than failing the
    /// whole lookup.
    pub(super) fn into_locations(self, bbox: &BoundingBox) -> Vec<PoiLocation> {
        self.elements
            .into_iter()
            .filter_map(OverpassElementDto::into_location)
            .filter(|poi| bbox.contains(&poi.location))
            .collect()
    }
}

impl OverpassElementDto {
    fn into_location(mut self) -> Option<PoiLocation> {
        let Some((longitude, latitude)) = self.coordinates() else {
            log::debug!(
                "skipping Overpass {} {} without coordinates",
                self.element_type,
                self.id
            );
            return None;
        };
        let location = GeoPoint::new(latitude, longitude);
        if !location.is_finite() {
            log::debug!(
                "skipping Overpass {} {} with non-finite coordinates",
                self.element_type,
                self.id
            );
            return None;
        }
        Some(PoiLocation {
            location,
            name: self.tags.remove("name"),
        })
    }

    fn coordinates(&self) -> Option<(f64, f64)> {
        if let (Some(longitude), Some(latitude)) = (self.lon, self.lat) {
            return Some((longitude, latitude));
        }
        self.center.as_ref().map(|center| (center.lon, center.lat))
    }
}
