use pcd_core::{
    grid::{mask::PaintMask, Grid, NO_DATA},
    Error, Result,
};

use crate::triangulation::{interpolate_lattice, Sample};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InfillOptions {
    /// Background cell pitch as a multiple of the source pitch.
    pub background_ratio: Option<f64>,
    /// Preserved cells keep the interpolated value.
    pub fill_preserved: bool,
    /// Preserved cells are cleared.
    pub purge_preserved: bool,
}

#[derive(Debug, Clone)]
pub struct Infilled {
    pub filled: Grid,
    pub background: Option<Grid>,
}

/// Fills holes of `grid` by linear interpolation between its valid cells.
///
/// Mask policy on the detail grid, in priority order: EXCLUDE clears the cell;
/// PRESERVE clears it when purging, keeps the interpolated value when filling
/// and otherwise restores the source value. The background grid is built from
/// the same samples and never sees the mask.
pub fn infill(grid: &Grid, mask: Option<&PaintMask>, options: &InfillOptions) -> Result<Infilled> {
    if let Some(mask) = mask {
        if mask.shape() != grid.shape() {
            return Err(Error::ShapeMismatch {
                what: "paint mask cells",
                expected: grid.rows() * grid.cols(),
                actual: mask.rows() * mask.cols(),
            });
        }
    }

    let samples: Vec<Sample> = grid
        .valid_cells()
        .map(|(row, col, value)| Sample {
            row: row as f64,
            col: col as f64,
            value,
        })
        .collect();
    if samples.is_empty() {
        return Err(Error::EmptyInput("grid has no valid cells to interpolate"));
    }
    log::debug!(
        "infilling {}x{} grid from {} samples",
        grid.rows(),
        grid.cols(),
        samples.len()
    );

    let mut filled = interpolate_lattice(&samples, grid.rows(), grid.cols(), 1.0, grid.scale());
    if let Some(mask) = mask {
        apply_mask(&mut filled, grid, mask, options);
    }

    let background = match options.background_ratio {
        Some(ratio) if ratio.is_finite() && ratio > 0.0 => {
            let rows = background_cells(grid.rows(), ratio);
            let cols = background_cells(grid.cols(), ratio);
            Some(interpolate_lattice(&samples, rows, cols, ratio, grid.scale() * ratio))
        }
        Some(ratio) => {
            log::warn!("ignoring background ratio {}", ratio);
            None
        }
        None => None,
    };

    Ok(Infilled { filled, background })
}

// Lattice nodes at 0, ratio, 2 * ratio, ... that fall inside the source grid
fn background_cells(cells: usize, ratio: f64) -> usize {
    if cells == 0 {
        return 0;
    }
    ((cells - 1) as f64 / ratio).floor() as usize + 1
}

fn apply_mask(filled: &mut Grid, original: &Grid, mask: &PaintMask, options: &InfillOptions) {
    for row in 0..filled.rows() {
        for col in 0..filled.cols() {
            if mask.is_excluded(row, col) {
                filled.set(row, col, NO_DATA);
            } else if mask.is_preserved(row, col) {
                if options.purge_preserved {
                    filled.set(row, col, NO_DATA);
                } else if !options.fill_preserved {
                    filled.set(row, col, original.value(row, col));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pcd_core::grid::mask::{EXCLUDE, PRESERVE};

    // 10x10 tilted plane with a missing 2x2 block in the middle
    fn synthetic() -> Grid {
        let mut grid = Grid::new(10, 10, 1.0);
        for row in 0..10 {
            for col in 0..10 {
                grid.set(row, col, 10.0 + row as f64 * 0.5 + col as f64);
            }
        }
        for (row, col) in [(4, 4), (4, 5), (5, 4), (5, 5)] {
            grid.set(row, col, NO_DATA);
        }
        grid
    }

    #[test]
    fn holes_are_filled_and_samples_kept() {
        let grid = synthetic();
        let out = infill(&grid, None, &InfillOptions::default()).unwrap();
        assert_eq!(out.filled.shape(), grid.shape());
        assert_eq!(out.filled.valid_count(), 100);
        assert_abs_diff_eq!(out.filled.value(4, 5), 17.0, epsilon = 1e-9);
        assert_eq!(out.filled.value(2, 7), grid.value(2, 7));
        assert!(out.background.is_none());
    }

    #[test]
    fn excluded_cell_is_cleared_regardless_of_neighbours() {
        let mut grid = Grid::filled(3, 3, 1.0, 7.0);
        grid.set(0, 0, 5.0);
        let mut mask = PaintMask::empty(3, 3);
        mask.mark(0, 0, EXCLUDE);
        let out = infill(&grid, Some(&mask), &InfillOptions::default()).unwrap();
        assert!(out.filled.value(0, 0).is_nan());
        assert_eq!(out.filled.value(1, 1), 7.0);
    }

    #[test]
    fn preserve_policy() {
        let grid = synthetic();
        let mut mask = PaintMask::empty(10, 10);
        mask.mark(4, 4, PRESERVE);
        mask.mark(0, 0, PRESERVE);

        let keep = infill(&grid, Some(&mask), &InfillOptions::default()).unwrap();
        assert!(keep.filled.value(4, 4).is_nan());
        assert_eq!(keep.filled.value(0, 0), 10.0);

        let fill = InfillOptions {
            fill_preserved: true,
            ..Default::default()
        };
        let filled = infill(&grid, Some(&mask), &fill).unwrap();
        assert_abs_diff_eq!(filled.filled.value(4, 4), 16.0, epsilon = 1e-9);

        let purge = InfillOptions {
            fill_preserved: true,
            purge_preserved: true,
            ..Default::default()
        };
        let purged = infill(&grid, Some(&mask), &purge).unwrap();
        assert!(purged.filled.value(4, 4).is_nan());
        assert!(purged.filled.value(0, 0).is_nan());
    }

    #[test]
    fn exclude_beats_preserve() {
        let grid = synthetic();
        let mut mask = PaintMask::empty(10, 10);
        mask.mark(1, 1, EXCLUDE | PRESERVE);
        let out = infill(&grid, Some(&mask), &InfillOptions::default()).unwrap();
        assert!(out.filled.value(1, 1).is_nan());
    }

    #[test]
    fn background_ignores_mask() {
        let grid = synthetic();
        let mut mask = PaintMask::empty(10, 10);
        for row in 2..5 {
            for col in 2..5 {
                mask.mark(row, col, EXCLUDE);
            }
        }
        let options = InfillOptions {
            background_ratio: Some(3.0),
            ..Default::default()
        };

        let plain = infill(&grid, None, &options).unwrap();
        let masked = infill(&grid, Some(&mask), &options).unwrap();

        let bg_plain = plain.background.unwrap();
        let bg_masked = masked.background.unwrap();
        assert_eq!(bg_plain.shape(), (4, 4));
        assert_eq!(bg_plain.scale(), 3.0);
        assert!(bg_plain.values_eq(&bg_masked));
        assert!(!plain.filled.values_eq(&masked.filled));
    }

    #[test]
    fn empty_grid_is_an_error() {
        let grid = Grid::new(4, 4, 1.0);
        assert!(matches!(
            infill(&grid, None, &InfillOptions::default()),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn mask_shape_must_match() {
        let grid = synthetic();
        let mask = PaintMask::empty(5, 5);
        assert!(matches!(
            infill(&grid, Some(&mask), &InfillOptions::default()),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
