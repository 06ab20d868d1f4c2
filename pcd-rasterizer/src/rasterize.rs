//! Point store to grid accumulation.
//!
//! Several points landing in one cell are blended in store order: the first
//! sets the value and each later one moves it part of the way towards its own
//! value. The result therefore depends on point order.

use pcd_core::{
    grid::{index::cell_count, is_valid, Grid},
    pointcloud::{
        decimation::decimator::{PointCloudDecimator, StrideDecimator},
        point::PointCloud,
    },
    progress::ProgressObserver,
    Error, Result,
};

/// Weight of a sample below the current cell elevation.
pub const LOWER_SAMPLE_ALPHA: f64 = 0.4;
/// Weight of a sample at or above the current cell elevation.
pub const HIGHER_SAMPLE_ALPHA: f64 = 0.1;
pub const INTENSITY_ALPHA: f64 = 0.3;

const PROGRESS_STEP: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSelector {
    /// Elevation, blended towards the lowest return.
    Elevation,
    Intensity,
}

impl ValueSelector {
    fn stage(&self) -> &'static str {
        match self {
            ValueSelector::Elevation => "generating heightmap",
            ValueSelector::Intensity => "visualizing lidar",
        }
    }

    fn sample(&self, cloud: &PointCloud, index: usize) -> f64 {
        match self {
            ValueSelector::Elevation => cloud.zs()[index],
            ValueSelector::Intensity => cloud.intensities()[index] as f64,
        }
    }

    fn blend(&self, current: f64, sample: f64) -> f64 {
        if !is_valid(current) {
            return sample;
        }
        let alpha = match self {
            ValueSelector::Elevation if sample < current => LOWER_SAMPLE_ALPHA,
            ValueSelector::Elevation => HIGHER_SAMPLE_ALPHA,
            ValueSelector::Intensity => INTENSITY_ALPHA,
        };
        (sample - current) * alpha + current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    /// Use every Nth point of the store.
    pub sample_stride: usize,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { sample_stride: 1 }
    }
}

/// Accumulates the points accepted by `filter` into a grid of cell pitch
/// `scale` covering the whole store. Cells without points stay no-data.
pub fn rasterize(
    cloud: &PointCloud,
    scale: f64,
    selector: ValueSelector,
    filter: &crate::ClassFilter,
    options: &RasterOptions,
    progress: &mut dyn ProgressObserver,
) -> Result<Grid> {
    if cloud.is_empty() {
        return Err(Error::EmptyInput("point cloud has no points"));
    }
    if !cloud.bias_removed() {
        return Err(Error::Unconfigured("bias removal"));
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::Unconfigured("positive cell scale"));
    }

    let rows = cell_count(cloud.height(), scale);
    let cols = cell_count(cloud.width(), scale);
    let mut grid = Grid::new(rows, cols, scale);
    log::debug!(
        "rasterizing {} points into {}x{} cells at {}",
        cloud.count(),
        rows,
        cols,
        scale
    );

    let cells = cloud.raster_indices(scale);
    let selected = StrideDecimator::new(options.sample_stride).decimate(cloud);
    let classifications = cloud.classifications();
    let total = selected.len();
    let mut accepted = 0usize;

    for (n, &i) in selected.iter().enumerate() {
        if n % PROGRESS_STEP == 0 {
            progress.report(selector.stage(), n, total);
        }
        if !filter.accepts(classifications[i]) {
            continue;
        }
        let (row, col) = cells[i];
        let cell = &mut grid[(row, col)];
        *cell = selector.blend(*cell, selector.sample(cloud, i));
        accepted += 1;
    }
    progress.report(selector.stage(), total, total);
    log::debug!("{} of {} points accumulated", accepted, total);

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassFilter;
    use approx::assert_abs_diff_eq;
    use pcd_core::{pointcloud::point::Origin, progress::NoProgress};

    fn cloud(points: &[(f64, f64, f64, u16, u8)]) -> PointCloud {
        let mut cloud = PointCloud::new();
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let zs: Vec<f64> = points.iter().map(|p| p.2).collect();
        let is: Vec<u16> = points.iter().map(|p| p.3).collect();
        let cs: Vec<u8> = points.iter().map(|p| p.4).collect();
        cloud.add_points(&xs, &ys, &zs, &is, &cs).unwrap();
        cloud.set_origin(Origin::new(0.0, 0.0));
        cloud.remove_bias().unwrap();
        cloud
    }

    fn elevation(cloud: &PointCloud, scale: f64, filter: &ClassFilter) -> Grid {
        rasterize(
            cloud,
            scale,
            ValueSelector::Elevation,
            filter,
            &RasterOptions::default(),
            &mut NoProgress,
        )
        .unwrap()
    }

    #[test]
    fn dimensions_include_slack_cell() {
        let cloud = cloud(&[(0.0, 0.0, 1.0, 0, 2), (10.0, 4.0, 1.0, 0, 2)]);
        let grid = elevation(&cloud, 2.0, &ClassFilter::All);
        assert_eq!(grid.shape(), (3, 6));
        assert_eq!(grid.value(2, 5), 1.0);
        assert_eq!(grid.valid_count(), 2);
    }

    #[test]
    fn elevation_blend_trends_lower() {
        let cloud = cloud(&[
            (0.5, 0.5, 10.0, 0, 2),
            (0.6, 0.5, 20.0, 0, 2),
            (0.7, 0.5, 5.0, 0, 2),
            (3.0, 3.0, 0.0, 0, 2),
        ]);
        let grid = elevation(&cloud, 1.0, &ClassFilter::All);
        // 10 -> 11 (alpha 0.1) -> 8.6 (alpha 0.4)
        assert_abs_diff_eq!(grid.value(0, 0), 8.6, epsilon = 1e-12);
    }

    #[test]
    fn blend_depends_on_order() {
        let a = cloud(&[(0.0, 0.0, 10.0, 0, 2), (0.0, 0.0, 20.0, 0, 2), (2.0, 2.0, 0.0, 0, 2)]);
        let b = cloud(&[(0.0, 0.0, 20.0, 0, 2), (0.0, 0.0, 10.0, 0, 2), (2.0, 2.0, 0.0, 0, 2)]);
        let ga = elevation(&a, 1.0, &ClassFilter::All);
        let gb = elevation(&b, 1.0, &ClassFilter::All);
        assert_abs_diff_eq!(ga.value(0, 0), 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gb.value(0, 0), 16.0, epsilon = 1e-12);
    }

    #[test]
    fn intensity_uses_uniform_blend() {
        let cloud = cloud(&[(0.0, 0.0, 0.0, 100, 2), (0.0, 0.0, 0.0, 0, 2), (1.0, 1.0, 0.0, 7, 2)]);
        let grid = rasterize(
            &cloud,
            1.0,
            ValueSelector::Intensity,
            &ClassFilter::All,
            &RasterOptions::default(),
            &mut NoProgress,
        )
        .unwrap();
        assert_abs_diff_eq!(grid.value(0, 0), 70.0, epsilon = 1e-12);
        assert_eq!(grid.value(1, 1), 7.0);
        assert!(grid.value(0, 1).is_nan());
    }

    #[test]
    fn class_filter_drops_points() {
        let cloud = cloud(&[(0.0, 0.0, 1.0, 0, 2), (1.0, 0.0, 9.0, 0, 5), (2.0, 0.0, 1.0, 0, 2)]);
        let grid = elevation(&cloud, 1.0, &ClassFilter::ground());
        assert_eq!(grid.value(0, 0), 1.0);
        assert!(grid.value(0, 1).is_nan());
        assert_eq!(grid.value(0, 2), 1.0);
    }

    #[test]
    fn stride_skips_points() {
        let cloud = cloud(&[(0.0, 0.0, 1.0, 0, 2), (1.0, 0.0, 2.0, 0, 2), (2.0, 0.0, 3.0, 0, 2)]);
        let grid = rasterize(
            &cloud,
            1.0,
            ValueSelector::Elevation,
            &ClassFilter::All,
            &RasterOptions { sample_stride: 2 },
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(grid.valid_count(), 2);
        assert!(grid.value(0, 1).is_nan());
    }

    #[test]
    fn requires_points_and_bias_removal() {
        let empty = PointCloud::new();
        assert!(matches!(
            rasterize(&empty, 1.0, ValueSelector::Elevation, &ClassFilter::All, &RasterOptions::default(), &mut NoProgress),
            Err(Error::EmptyInput(_))
        ));

        let mut biased = PointCloud::new();
        biased.add_points(&[5.0], &[5.0], &[1.0], &[0], &[2]).unwrap();
        assert_eq!(
            rasterize(&biased, 1.0, ValueSelector::Elevation, &ClassFilter::All, &RasterOptions::default(), &mut NoProgress).unwrap_err(),
            Error::Unconfigured("bias removal")
        );
    }

    #[test]
    fn points_appended_after_bias_removal_are_rejected() {
        let mut cloud = cloud(&[(0.0, 0.0, 1.0, 0, 2), (15.0, 15.0, 1.0, 0, 2)]);
        cloud.add_points(&[-5.0], &[-5.0], &[99.0], &[0], &[2]).unwrap();
        assert_eq!(cloud.xmin(), -5.0);
        assert_eq!(
            rasterize(&cloud, 1.0, ValueSelector::Elevation, &ClassFilter::All, &RasterOptions::default(), &mut NoProgress).unwrap_err(),
            Error::Unconfigured("bias removal")
        );

        cloud.remove_bias().unwrap();
        let grid = elevation(&cloud, 1.0, &ClassFilter::All);
        assert_eq!(grid.value(0, 0), 99.0);
        assert_eq!(grid.value(5, 5), 1.0);
    }
}
