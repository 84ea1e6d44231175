//! Test helpers for writing CLI inputs and stubbing POI sources.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use quinze_core::test_support::MemoryPoiSource;
use quinze_core::{BoundingBox, DEFAULT_ANALYSIS_RADIUS_DEGREES, GeoPoint, PoiLocation, PoiSource};
use tempfile::TempDir;

use crate::CliError;
use crate::analyze::{AnalyzeConfig, PoiSourceBuilder};

pub(super) const AVEIRO: GeoPoint = GeoPoint::new(40.640, -8.654);

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test input");
}

/// A temporary directory with a UTF-8 root path.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// South-west corner of the default analysis box around Aveiro, which is
/// always a grid sample.
pub(super) fn south_west_sample() -> GeoPoint {
    let bbox = BoundingBox::around(AVEIRO, DEFAULT_ANALYSIS_RADIUS_DEGREES).expect("valid box");
    GeoPoint::new(bbox.min_lat(), bbox.min_lng())
}

/// Serves a supermarket on the south-west grid sample, whatever the config.
pub(super) struct StubPoiSourceBuilder;

impl PoiSourceBuilder for StubPoiSourceBuilder {
    fn build(&self, _config: &AnalyzeConfig) -> Result<Box<dyn PoiSource>, CliError> {
        let source = MemoryPoiSource::new().with_locations(
            "supermarkets",
            [PoiLocation::named(south_west_sample(), "Pingo Doce")],
        );
        Ok(Box::new(source))
    }
}
