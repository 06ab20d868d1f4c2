//! Local frame <-> raster index math.
//!
//! Raster indices are (row, column): rows follow local y, columns local x.

/// Cell containing the local point. Not clamped; points left of or below the
/// origin produce negative indices.
pub fn local_to_raster(x: f64, y: f64, scale: f64) -> (isize, isize) {
    ((y / scale).floor() as isize, (x / scale).floor() as isize)
}

/// Centre of a cell in the local frame.
///
/// This is not the inverse of [`local_to_raster`]: the position inside the
/// cell is lost, only cell centres map back onto themselves.
pub fn raster_to_local(row: usize, col: usize, scale: f64) -> (f64, f64) {
    pixel_to_local(col as f64, row as f64, scale)
}

/// Fractional pixel position (column, row) to the local frame, using the same
/// centre convention as [`raster_to_local`].
pub fn pixel_to_local(px: f64, py: f64, scale: f64) -> (f64, f64) {
    ((px + 0.5) * scale, (py + 0.5) * scale)
}

/// Number of cells needed to cover `extent`, with one cell of slack so that an
/// extent that is an exact multiple of `scale` still covers its last point.
pub fn cell_count(extent: f64, scale: f64) -> usize {
    (extent / scale).ceil().max(0.0) as usize + 1
}
