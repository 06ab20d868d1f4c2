use std::sync::Arc;

use pcd_core::{pointcloud::point::PointBatch, Result};

use crate::projection::Projection;

pub enum PointTransformer {
    Identity,
    Reproject {
        source: Arc<dyn Projection>,
        target: Arc<dyn Projection>,
    },
}

impl PointTransformer {
    pub fn new(source: Arc<dyn Projection>, target: Arc<dyn Projection>) -> Self {
        if source.same_crs(target.as_ref()) {
            return Self::Identity;
        }
        Self::Reproject { source, target }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Rewrites x/y of the batch into the target CRS via geographic
    /// coordinates. Any failing point leaves the whole batch untouched.
    pub fn transform_batch_in_place(&self, batch: &mut PointBatch) -> Result<()> {
        let (source, target) = match self {
            Self::Identity => return Ok(()),
            Self::Reproject { source, target } => (source, target),
        };

        let mut xs = Vec::with_capacity(batch.len());
        let mut ys = Vec::with_capacity(batch.len());
        for (&x, &y) in batch.xs.iter().zip(batch.ys.iter()) {
            let (lon, lat) = source.inverse(x, y)?;
            let (e, n) = target.forward(lon, lat)?;
            xs.push(e);
            ys.push(n);
        }
        batch.xs = xs;
        batch.ys = ys;
        Ok(())
    }
}
