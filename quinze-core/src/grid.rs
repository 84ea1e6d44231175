//! Uniform sampling grid over a bounding box.

use crate::{BoundingBox, GeoPoint};

/// A `resolution × resolution` lattice of sample points.
///
/// Sample `(row, col)` sits at
/// `(min_lat + row × lat_step, min_lng + col × lng_step)` where each step is
/// the box extent divided by the resolution. Points are anchored at the
/// south-west corner of their cell, so the northern and eastern edges of the
/// box are never sampled.
///
/// # Examples
/// ```
/// use quinze_core::{BoundingBox, GeoPoint, SampleGrid};
///
/// # fn main() -> Result<(), quinze_core::BoundingBoxError> {
/// let bbox = BoundingBox::new(0.0, 2.0, 10.0, 12.0)?;
/// let grid = SampleGrid::new(bbox, 2);
/// assert_eq!(grid.len(), 4);
/// assert_eq!(grid.point(1, 0), GeoPoint::new(1.0, 10.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    bbox: BoundingBox,
    resolution: u32,
    lat_step: f64,
    lng_step: f64,
}

impl SampleGrid {
    /// Lay a grid over `bbox`. A resolution of zero yields an empty grid.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "step size is the box extent divided evenly"
    )]
    pub fn new(bbox: BoundingBox, resolution: u32) -> Self {
        let divisor = f64::from(resolution.max(1));
        Self {
            bbox,
            resolution,
            lat_step: bbox.lat_span() / divisor,
            lng_step: bbox.lng_span() / divisor,
        }
    }

    /// Samples per axis.
    #[must_use]
    pub const fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        let side = usize::try_from(self.resolution).unwrap_or(usize::MAX);
        side.saturating_mul(side)
    }

    /// Report whether the grid has no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.resolution == 0
    }

    /// Coordinates of sample `(row, col)`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "sample position is an offset from the box corner"
    )]
    pub fn point(&self, row: u32, col: u32) -> GeoPoint {
        GeoPoint::new(
            self.bbox.min_lat() + f64::from(row) * self.lat_step,
            self.bbox.min_lng() + f64::from(col) * self.lng_step,
        )
    }

    /// Iterate the samples of one row, west to east.
    pub fn row(&self, row: u32) -> impl Iterator<Item = GeoPoint> + '_ {
        (0..self.resolution).map(move |col| self.point(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn all_points(grid: &SampleGrid) -> Vec<GeoPoint> {
        (0..grid.resolution()).flat_map(|row| grid.row(row)).collect()
    }

    #[fixture]
    fn bbox() -> BoundingBox {
        BoundingBox::new(40.0, 41.0, -9.0, -8.0).expect("valid box")
    }

    #[rstest]
    fn single_sample_sits_on_lower_left_corner(bbox: BoundingBox) {
        let grid = SampleGrid::new(bbox, 1);
        assert_eq!(all_points(&grid), vec![GeoPoint::new(40.0, -9.0)]);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 4)]
    #[case(75, 5_625)]
    fn sample_count_is_resolution_squared(
        bbox: BoundingBox,
        #[case] resolution: u32,
        #[case] expected: usize,
    ) {
        let grid = SampleGrid::new(bbox, resolution);
        assert_eq!(grid.len(), expected);
        assert_eq!(all_points(&grid).len(), expected);
    }

    #[rstest]
    fn samples_never_reach_the_upper_edges(bbox: BoundingBox) {
        let grid = SampleGrid::new(bbox, 4);
        assert!(all_points(&grid).iter().all(|p| p.latitude < 41.0 && p.longitude < -8.0));
        assert_eq!(grid.point(3, 3), GeoPoint::new(40.75, -8.25));
    }

    #[rstest]
    fn points_are_row_major(bbox: BoundingBox) {
        let grid = SampleGrid::new(bbox, 2);
        let points = all_points(&grid);
        assert_eq!(
            points,
            vec![
                GeoPoint::new(40.0, -9.0),
                GeoPoint::new(40.0, -8.5),
                GeoPoint::new(40.5, -9.0),
                GeoPoint::new(40.5, -8.5),
            ]
        );
    }

    #[rstest]
    fn zero_resolution_is_empty(bbox: BoundingBox) {
        let grid = SampleGrid::new(bbox, 0);
        assert!(grid.is_empty());
        assert_eq!(all_points(&grid).len(), 0);
    }
}
