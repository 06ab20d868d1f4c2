//! Point store plus conversions between the geographic, projected, local,
//! raster and destination frames.
//!
//! Local frame: projected coordinates minus the origin, x east, y north.
//! Destination frame: y-up, centred on the point cloud, with local north
//! mapped onto +z and elevation negated onto y.

use std::sync::Arc;

use pcd_core::{
    grid::index::{local_to_raster, raster_to_local},
    pointcloud::point::{Origin, PointBatch, PointCloud},
    Error, Result,
};

use crate::{projection::Projection, transformer::PointTransformer};

#[derive(Debug, Default)]
pub struct CoordinateEngine {
    cloud: PointCloud,
    projection: Option<Arc<dyn Projection>>,
}

impl CoordinateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projection(projection: Arc<dyn Projection>) -> Self {
        Self {
            cloud: PointCloud::new(),
            projection: Some(projection),
        }
    }

    pub fn from_cloud(cloud: PointCloud, projection: Option<Arc<dyn Projection>>) -> Self {
        Self { cloud, projection }
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn into_cloud(self) -> PointCloud {
        self.cloud
    }

    pub fn projection(&self) -> Option<&Arc<dyn Projection>> {
        self.projection.as_ref()
    }

    pub fn set_projection(&mut self, projection: Arc<dyn Projection>) {
        self.projection = Some(projection);
    }

    pub fn count(&self) -> usize {
        self.cloud.count()
    }

    pub fn add_points(
        &mut self,
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
        intensities: &[u16],
        classifications: &[u8],
    ) -> Result<()> {
        self.cloud
            .add_points(xs, ys, zs, intensities, classifications)
    }

    /// Appends a batch expressed in `source`. The first source fixes the store
    /// projection when none is set; later sources in another CRS are
    /// reprojected before they are appended.
    pub fn add_batch(&mut self, mut batch: PointBatch, source: Arc<dyn Projection>) -> Result<()> {
        match &self.projection {
            None => self.projection = Some(source),
            Some(target) => {
                let transformer = PointTransformer::new(source.clone(), target.clone());
                if !transformer.is_identity() {
                    log::warn!(
                        "reprojecting {} points from {} to {}",
                        batch.len(),
                        source.name(),
                        target.name()
                    );
                    transformer.transform_batch_in_place(&mut batch)?;
                }
            }
        }
        self.cloud.add_batch(batch)
    }

    pub fn compute_origin(&mut self) -> Result<Origin> {
        self.cloud.compute_origin()
    }

    pub fn set_origin(&mut self, origin: Origin) -> Origin {
        self.cloud.set_origin(origin)
    }

    pub fn remove_bias(&mut self) -> Result<()> {
        self.cloud.remove_bias()
    }

    pub fn origin(&self) -> Result<Origin> {
        self.cloud.origin().ok_or(Error::Unconfigured("origin"))
    }

    fn require_projection(&self) -> Result<&Arc<dyn Projection>> {
        self.projection
            .as_ref()
            .ok_or(Error::Unconfigured("projection"))
    }

    pub fn projected_to_local(&self, easting: f64, northing: f64) -> Result<(f64, f64)> {
        let origin = self.origin()?;
        Ok((easting - origin.easting, northing - origin.northing))
    }

    pub fn local_to_projected(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let origin = self.origin()?;
        Ok((x + origin.easting, y + origin.northing))
    }

    pub fn geographic_to_projected(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        self.require_projection()?.forward(lon, lat)
    }

    pub fn projected_to_geographic(&self, easting: f64, northing: f64) -> Result<(f64, f64)> {
        self.require_projection()?.inverse(easting, northing)
    }

    pub fn geographic_to_local(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        self.origin()?;
        let (e, n) = self.geographic_to_projected(lon, lat)?;
        self.projected_to_local(e, n)
    }

    pub fn local_to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.require_projection()?;
        let (e, n) = self.local_to_projected(x, y)?;
        self.projected_to_geographic(e, n)
    }

    pub fn local_to_raster(&self, x: f64, y: f64, scale: f64) -> (isize, isize) {
        local_to_raster(x, y, scale)
    }

    /// Cell centre; see [`pcd_core::grid::index::raster_to_local`].
    pub fn raster_to_local(&self, row: usize, col: usize, scale: f64) -> (f64, f64) {
        raster_to_local(row, col, scale)
    }

    /// Raster cell of every stored point.
    pub fn points_to_raster(&self, scale: f64) -> Vec<(usize, usize)> {
        self.cloud.raster_indices(scale)
    }

    pub fn local_to_dest(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let (w, h) = (self.cloud.width(), self.cloud.height());
        (x - w / 2.0, -z, y - h / 2.0)
    }

    pub fn dest_to_local(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let (w, h) = (self.cloud.width(), self.cloud.height());
        (x + w / 2.0, z + h / 2.0, -y)
    }

    pub fn dest_to_raster(&self, x: f64, z: f64, scale: f64) -> (isize, isize) {
        let (lx, ly, _) = self.dest_to_local(x, 0.0, z);
        local_to_raster(lx, ly, scale)
    }

    /// Projected position of the lower-left corner of raster cell (0, 0).
    pub fn grid_origin(&self) -> Result<Origin> {
        let (e, n) = self.local_to_projected(0.0, 0.0)?;
        Ok(Origin::new(e, n))
    }
}
