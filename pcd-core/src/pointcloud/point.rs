use std::cell::OnceCell;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    grid::{index::raster_to_local, Grid},
};

// Cells at or below this value are treated as holes when a grid is turned back into points
pub const MIN_VALID_HEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: u16,
    pub classification: u8,
}

/// Lower-left anchor of the local frame, in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Origin {
    pub easting: f64,
    pub northing: f64,
}

impl Origin {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }
}

/// Column-oriented batch of points as produced by a point source.
#[derive(Debug, Clone, Default)]
pub struct PointBatch {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub zs: Vec<f64>,
    pub intensities: Vec<u16>,
    pub classifications: Vec<u8>,
}

impl PointBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
            zs: Vec::with_capacity(capacity),
            intensities: Vec::with_capacity(capacity),
            classifications: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: PointRecord) {
        self.xs.push(point.x);
        self.ys.push(point.y);
        self.zs.push(point.z);
        self.intensities.push(point.intensity);
        self.classifications.push(point.classification);
    }

    pub fn append(&mut self, other: PointBatch) {
        self.xs.extend(other.xs);
        self.ys.extend(other.ys);
        self.zs.extend(other.zs);
        self.intensities.extend(other.intensities);
        self.classifications.extend(other.classifications);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Checks that every column has the same length as `xs`.
    pub fn validate(&self) -> Result<usize> {
        let expected = self.xs.len();
        for (what, actual) in [
            ("ys", self.ys.len()),
            ("zs", self.zs.len()),
            ("intensities", self.intensities.len()),
            ("classifications", self.classifications.len()),
        ] {
            if actual != expected {
                return Err(Error::ShapeMismatch {
                    what,
                    expected,
                    actual,
                });
            }
        }
        Ok(expected)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub intensity_min: u16,
    pub intensity_max: u16,
}

/// Append-only point store in a lower-left anchored local frame.
///
/// Points are appended in projected coordinates; once every source is
/// loaded the origin is assigned and the bias removed, after which x/y are
/// local meters with a minimum of exactly zero.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<f64>,
    intensities: Vec<u16>,
    classifications: Vec<u8>,
    origin: Option<Origin>,
    bias_removed: bool,
    bounding_volume: OnceCell<BoundingVolume>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn add_points(
        &mut self,
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
        intensities: &[u16],
        classifications: &[u8],
    ) -> Result<()> {
        let expected = xs.len();
        for (what, actual) in [
            ("ys", ys.len()),
            ("zs", zs.len()),
            ("intensities", intensities.len()),
            ("classifications", classifications.len()),
        ] {
            if actual != expected {
                return Err(Error::ShapeMismatch {
                    what,
                    expected,
                    actual,
                });
            }
        }

        self.xs.extend_from_slice(xs);
        self.ys.extend_from_slice(ys);
        self.zs.extend_from_slice(zs);
        self.intensities.extend_from_slice(intensities);
        self.classifications.extend_from_slice(classifications);
        self.appended();
        Ok(())
    }

    pub fn add_batch(&mut self, batch: PointBatch) -> Result<()> {
        batch.validate()?;
        let PointBatch {
            xs,
            ys,
            zs,
            intensities,
            classifications,
        } = batch;
        self.xs.extend(xs);
        self.ys.extend(ys);
        self.zs.extend(zs);
        self.intensities.extend(intensities);
        self.classifications.extend(classifications);
        self.appended();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.bounding_volume = OnceCell::new();
    }

    // New points are not shifted, so the store needs another bias removal
    fn appended(&mut self) {
        self.bias_removed = false;
        self.invalidate();
    }

    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    pub fn bias_removed(&self) -> bool {
        self.bias_removed
    }

    /// Assigns an externally supplied origin. The origin is set at most once;
    /// later calls keep the first origin and return it.
    pub fn set_origin(&mut self, origin: Origin) -> Origin {
        match self.origin {
            Some(existing) => {
                if existing != origin {
                    log::warn!(
                        "origin already assigned at ({}, {}), ignoring ({}, {})",
                        existing.easting,
                        existing.northing,
                        origin.easting,
                        origin.northing
                    );
                }
                existing
            }
            None => {
                self.origin = Some(origin);
                origin
            }
        }
    }

    /// Uses the minimum easting/northing of the loaded points as origin.
    pub fn compute_origin(&mut self) -> Result<Origin> {
        if let Some(origin) = self.origin {
            return Ok(origin);
        }
        let bv = self
            .bounding_volume()
            .ok_or(Error::EmptyInput("point cloud has no points"))?;
        let origin = Origin::new(bv.min[0], bv.min[1]);
        self.origin = Some(origin);
        Ok(origin)
    }

    /// Shifts x/y so that their minimum is exactly zero.
    ///
    /// Subtracting the current minimum (rather than the stored origin) makes
    /// a second call a no-op.
    pub fn remove_bias(&mut self) -> Result<()> {
        if self.origin.is_none() {
            return Err(Error::Unconfigured("origin"));
        }
        let Some(bv) = self.bounding_volume().copied() else {
            return Ok(());
        };
        let (min_x, min_y) = (bv.min[0], bv.min[1]);
        if min_x != 0.0 {
            self.xs.iter_mut().for_each(|x| *x -= min_x);
        }
        if min_y != 0.0 {
            self.ys.iter_mut().for_each(|y| *y -= min_y);
        }
        self.bias_removed = true;
        self.invalidate();
        Ok(())
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn zs(&self) -> &[f64] {
        &self.zs
    }

    pub fn intensities(&self) -> &[u16] {
        &self.intensities
    }

    pub fn classifications(&self) -> &[u8] {
        &self.classifications
    }

    pub fn get(&self, index: usize) -> Option<PointRecord> {
        if index >= self.count() {
            return None;
        }
        Some(PointRecord {
            x: self.xs[index],
            y: self.ys[index],
            z: self.zs[index],
            intensity: self.intensities[index],
            classification: self.classifications[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = PointRecord> + '_ {
        (0..self.count()).map(move |i| PointRecord {
            x: self.xs[i],
            y: self.ys[i],
            z: self.zs[i],
            intensity: self.intensities[i],
            classification: self.classifications[i],
        })
    }

    /// Extents over all points, recomputed lazily after any mutation.
    pub fn bounding_volume(&self) -> Option<&BoundingVolume> {
        if self.is_empty() {
            return None;
        }
        Some(self.bounding_volume.get_or_init(|| {
            let mut bv = BoundingVolume {
                min: [f64::MAX, f64::MAX, f64::MAX],
                max: [f64::MIN, f64::MIN, f64::MIN],
                intensity_min: u16::MAX,
                intensity_max: u16::MIN,
            };
            for i in 0..self.xs.len() {
                bv.min[0] = bv.min[0].min(self.xs[i]);
                bv.min[1] = bv.min[1].min(self.ys[i]);
                bv.min[2] = bv.min[2].min(self.zs[i]);
                bv.max[0] = bv.max[0].max(self.xs[i]);
                bv.max[1] = bv.max[1].max(self.ys[i]);
                bv.max[2] = bv.max[2].max(self.zs[i]);
                bv.intensity_min = bv.intensity_min.min(self.intensities[i]);
                bv.intensity_max = bv.intensity_max.max(self.intensities[i]);
            }
            bv
        }))
    }

    pub fn xmin(&self) -> f64 {
        self.bounding_volume().map_or(0.0, |bv| bv.min[0])
    }

    pub fn xmax(&self) -> f64 {
        self.bounding_volume().map_or(0.0, |bv| bv.max[0])
    }

    pub fn ymin(&self) -> f64 {
        self.bounding_volume().map_or(0.0, |bv| bv.min[1])
    }

    pub fn ymax(&self) -> f64 {
        self.bounding_volume().map_or(0.0, |bv| bv.max[1])
    }

    pub fn zmin(&self) -> f64 {
        self.bounding_volume().map_or(0.0, |bv| bv.min[2])
    }

    pub fn zmax(&self) -> f64 {
        self.bounding_volume().map_or(0.0, |bv| bv.max[2])
    }

    pub fn imin(&self) -> u16 {
        self.bounding_volume().map_or(0, |bv| bv.intensity_min)
    }

    pub fn imax(&self) -> u16 {
        self.bounding_volume().map_or(0, |bv| bv.intensity_max)
    }

    pub fn width(&self) -> f64 {
        self.xmax() - self.xmin()
    }

    pub fn height(&self) -> f64 {
        self.ymax() - self.ymin()
    }

    pub fn upper_left_local(&self) -> (f64, f64) {
        (self.xmin(), self.ymax())
    }

    pub fn lower_right_local(&self) -> (f64, f64) {
        (self.xmax(), self.ymin())
    }

    /// Raster (row, column) of every point at `scale`, in one pass over the columns.
    pub fn raster_indices(&self, scale: f64) -> Vec<(usize, usize)> {
        let inv = 1.0 / scale;
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| {
                let row = (y * inv).floor().max(0.0) as usize;
                let col = (x * inv).floor().max(0.0) as usize;
                (row, col)
            })
            .collect()
    }

    /// Builds a point store from a height grid, one point per cell centre for
    /// every cell above [`MIN_VALID_HEIGHT`]. `grid_origin` is the projected
    /// position of the grid's lower-left corner.
    ///
    /// Leading empty rows/columns are cropped away: the origin moves to the
    /// west/south-most inserted point, which then becomes local (0, 0).
    pub fn from_height_grid(grid: &Grid, grid_origin: Origin) -> Result<Self> {
        let mut batch = PointBatch::with_capacity(grid.valid_count());
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let z = grid.value(row, col);
                if z > MIN_VALID_HEIGHT {
                    let (x, y) = raster_to_local(row, col, grid.scale());
                    batch.push(PointRecord {
                        x,
                        y,
                        z,
                        intensity: 0,
                        classification: 0,
                    });
                }
            }
        }
        if batch.is_empty() {
            return Err(Error::EmptyInput("grid has no valid cells"));
        }

        let mut cloud = PointCloud::new();
        cloud.add_batch(batch)?;
        let west_most = cloud.xmin();
        let south_most = cloud.ymin();
        cloud.set_origin(Origin::new(
            grid_origin.easting + west_most,
            grid_origin.northing + south_most,
        ));
        cloud.remove_bias()?;
        Ok(cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cloud() -> PointCloud {
        let mut cloud = PointCloud::new();
        cloud
            .add_points(
                &[500_010.0, 500_020.5, 500_013.0],
                &[4_100_003.0, 4_100_001.0, 4_100_009.5],
                &[10.0, 12.0, 11.0],
                &[100, 200, 150],
                &[2, 2, 5],
            )
            .unwrap();
        cloud
    }

    #[test]
    fn empty_cloud_counts_zero() {
        let cloud = PointCloud::new();
        assert_eq!(cloud.count(), 0);
        assert!(cloud.bounding_volume().is_none());
        assert_eq!(cloud.width(), 0.0);
    }

    #[test]
    fn add_points_rejects_mismatched_columns() {
        let mut cloud = PointCloud::new();
        let err = cloud
            .add_points(&[1.0, 2.0], &[1.0], &[1.0, 2.0], &[0, 0], &[2, 2])
            .unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                what: "ys",
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(cloud.count(), 0);
    }

    #[test]
    fn compute_origin_requires_points() {
        let mut cloud = PointCloud::new();
        assert!(matches!(cloud.compute_origin(), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn remove_bias_requires_origin() {
        let mut cloud = sample_cloud();
        assert_eq!(cloud.remove_bias(), Err(Error::Unconfigured("origin")));
    }

    #[test]
    fn remove_bias_zeroes_minimum_and_is_idempotent() {
        let mut cloud = sample_cloud();
        let origin = cloud.compute_origin().unwrap();
        assert_eq!(origin, Origin::new(500_010.0, 4_100_001.0));

        cloud.remove_bias().unwrap();
        assert_eq!(cloud.xmin(), 0.0);
        assert_eq!(cloud.ymin(), 0.0);
        assert_eq!(cloud.width(), 10.5);
        assert_eq!(cloud.height(), 8.5);
        assert_eq!(cloud.xs(), &[0.0, 10.5, 3.0]);

        cloud.remove_bias().unwrap();
        assert_eq!(cloud.xs(), &[0.0, 10.5, 3.0]);
        assert_eq!(cloud.ys(), &[2.0, 0.0, 8.5]);
        assert_eq!(cloud.origin(), Some(origin));
    }

    #[test]
    fn extents_follow_appends() {
        let mut cloud = sample_cloud();
        cloud.compute_origin().unwrap();
        cloud.remove_bias().unwrap();
        assert_eq!(cloud.width(), 10.5);

        cloud
            .add_points(&[30.0], &[4.0], &[9.0], &[10], &[2])
            .unwrap();
        assert_eq!(cloud.width(), 30.0);
        assert!(!cloud.bias_removed());
        assert_eq!(cloud.zmin(), 9.0);
        assert_eq!(cloud.bounding_volume().unwrap().intensity_min, 10);
    }

    #[test]
    fn origin_is_assigned_once() {
        let mut cloud = sample_cloud();
        cloud.set_origin(Origin::new(1.0, 2.0));
        assert_eq!(cloud.set_origin(Origin::new(3.0, 4.0)), Origin::new(1.0, 2.0));
        assert_eq!(cloud.compute_origin().unwrap(), Origin::new(1.0, 2.0));
    }

    #[test]
    fn raster_indices_floor_local_coordinates() {
        let mut cloud = PointCloud::new();
        cloud
            .add_points(&[0.0, 3.1, 1.99], &[0.0, 5.9, 4.0], &[0.0; 3], &[0; 3], &[0; 3])
            .unwrap();
        assert_eq!(cloud.raster_indices(2.0), vec![(0, 0), (2, 1), (2, 0)]);
    }

    #[test]
    fn from_height_grid_crops_to_valid_cells() {
        let mut grid = Grid::new(4, 4, 2.0);
        grid.set(1, 2, 7.0);
        grid.set(3, 3, 9.0);
        grid.set(0, 0, 0.05);

        let cloud = PointCloud::from_height_grid(&grid, Origin::new(1000.0, 2000.0)).unwrap();
        assert_eq!(cloud.count(), 2);
        assert_eq!(cloud.xmin(), 0.0);
        assert_eq!(cloud.ymin(), 0.0);
        // cell (1, 2) centre is local (5, 3)
        assert_eq!(cloud.origin(), Some(Origin::new(1005.0, 2003.0)));
        assert_eq!(cloud.width(), 2.0);
        assert_eq!(cloud.height(), 4.0);
    }
}
