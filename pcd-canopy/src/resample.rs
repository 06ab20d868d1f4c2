use pcd_core::grid::Grid;

/// Nearest-neighbour resampling onto `rows` x `cols` cells covering the same
/// extent. The output pitch follows from the new cell count.
pub fn resample_nearest(grid: &Grid, rows: usize, cols: usize) -> Grid {
    if grid.shape() == (rows, cols) {
        return grid.clone();
    }
    let row_ratio = grid.rows() as f64 / rows.max(1) as f64;
    let col_ratio = grid.cols() as f64 / cols.max(1) as f64;
    let scale = grid.scale() * col_ratio;

    let mut out = Grid::new(rows, cols, scale);
    if grid.rows() == 0 || grid.cols() == 0 {
        return out;
    }
    for row in 0..rows {
        let src_row = ((row as f64 * row_ratio).floor() as usize).min(grid.rows() - 1);
        for col in 0..cols {
            let src_col = ((col as f64 * col_ratio).floor() as usize).min(grid.cols() - 1);
            out.set(row, col, grid.value(src_row, src_col));
        }
    }
    out
}
