use pcd_core::grid::{is_valid, Grid};

// Cells brighter than this multiple of the median are clipped
const OUTLIER_MEDIAN_FACTOR: f64 = 3.5;

/// Scales an intensity grid into 0..=1 for display, clipping outliers at
/// 3.5 times the median. Missing cells become 0.
pub fn normalize_visual(grid: &Grid) -> Grid {
    let Some(median) = grid.median_valid() else {
        return grid.map(|_| 0.0);
    };
    let ceiling = OUTLIER_MEDIAN_FACTOR * median;
    let clipped = grid.map(|v| if is_valid(v) { v.clamp(0.0, ceiling.max(0.0)) } else { 0.0 });
    let max = clipped.data().iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return clipped;
    }
    clipped.map(|v| v / max)
}
