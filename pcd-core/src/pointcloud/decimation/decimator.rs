use crate::pointcloud::point::PointCloud;

/// Picks the subset of a point store that takes part in an accumulation.
/// Returned indices are ascending so the store's natural order is kept.
pub trait PointCloudDecimator {
    fn decimate(&self, cloud: &PointCloud) -> Vec<usize>;
}

/// Keeps every `stride`-th point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideDecimator {
    pub stride: usize,
}

impl StrideDecimator {
    pub fn new(stride: usize) -> Self {
        Self {
            stride: stride.max(1),
        }
    }

    /// Stride that leaves roughly one point per cell of `scale` given the
    /// mean point density of the cloud.
    pub fn for_density(cloud: &PointCloud, scale: f64) -> Self {
        let area = cloud.width() * cloud.height();
        if area <= 0.0 || scale <= 0.0 {
            return Self::new(1);
        }
        let points_per_cell = cloud.count() as f64 / area * scale * scale;
        Self::new(points_per_cell.floor() as usize)
    }
}

impl Default for StrideDecimator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PointCloudDecimator for StrideDecimator {
    fn decimate(&self, cloud: &PointCloud) -> Vec<usize> {
        (0..cloud.count()).step_by(self.stride.max(1)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice(n: usize, step: f64) -> PointCloud {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for row in 0..n {
            for col in 0..n {
                xs.push(col as f64 * step);
                ys.push(row as f64 * step);
            }
        }
        let count = xs.len();
        let mut cloud = PointCloud::new();
        cloud
            .add_points(&xs, &ys, &vec![0.0; count], &vec![0; count], &vec![2; count])
            .unwrap();
        cloud
    }

    #[test]
    fn stride_keeps_every_nth_point() {
        let cloud = lattice(3, 1.0);
        assert_eq!(StrideDecimator::new(4).decimate(&cloud), vec![0, 4, 8]);
        assert_eq!(StrideDecimator::new(0).decimate(&cloud).len(), 9);
    }

    #[test]
    fn density_stride_targets_one_point_per_cell() {
        // 0.5 m spacing gives 4 points per square meter, 16 per 2 m cell
        let cloud = lattice(41, 0.5);
        let stride = StrideDecimator::for_density(&cloud, 2.0).stride;
        assert!((16..=17).contains(&stride), "stride {stride}");
        assert_eq!(StrideDecimator::for_density(&PointCloud::new(), 2.0).stride, 1);
    }
}
