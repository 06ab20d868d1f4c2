pub mod index;
pub mod mask;
pub mod selection;

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use selection::Selection;

/// Marker for cells without data.
pub const NO_DATA: f64 = f64::NAN;

pub fn is_valid(value: f64) -> bool {
    !value.is_nan()
}

/// Row-major scalar raster. Row 0 is the southern edge, column 0 the western
/// edge, and each cell covers `scale` world units on a side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    scale: f64,
    data: Vec<f64>,
}

impl Grid {
    /// Grid with every cell set to [`NO_DATA`].
    pub fn new(rows: usize, cols: usize, scale: f64) -> Self {
        Self::filled(rows, cols, scale, NO_DATA)
    }

    pub fn filled(rows: usize, cols: usize, scale: f64, value: f64) -> Self {
        Self {
            rows,
            cols,
            scale,
            data: vec![value; rows * cols],
        }
    }

    pub fn from_vec(rows: usize, cols: usize, scale: f64, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                what: "grid data",
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            scale,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Value at (row, col), `None` when outside the grid.
    pub fn get(&self, row: isize, col: isize) -> Option<f64> {
        if self.contains(row, col) {
            Some(self.data[row as usize * self.cols + col as usize])
        } else {
            None
        }
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn is_valid_at(&self, row: usize, col: usize) -> bool {
        is_valid(self.value(row, col))
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| is_valid(**v)).count()
    }

    /// (row, col, value) of every cell holding data.
    pub fn valid_cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| is_valid(**v))
            .map(move |(i, v)| (i / cols, i % cols, *v))
    }

    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Grid {
        Grid {
            rows: self.rows,
            cols: self.cols,
            scale: self.scale,
            data: self.data.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Cell-wise combination of two grids of identical shape.
    pub fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Grid, f: F) -> Result<Grid> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                what: "grid cells",
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        Ok(Grid {
            rows: self.rows,
            cols: self.cols,
            scale: self.scale,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    /// Median of valid cells, `None` on an all-invalid grid.
    pub fn median_valid(&self) -> Option<f64> {
        let mut values: Vec<f64> = self.data.iter().copied().filter(|v| is_valid(*v)).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            Some((values[mid - 1] + values[mid]) / 2.0)
        } else {
            Some(values[mid])
        }
    }

    pub fn min_max_valid(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| is_valid(*v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Sub-grid covered by `selection`, clamped to the grid.
    pub fn crop(&self, selection: &Selection) -> Grid {
        let sel = selection.clamp(self.rows, self.cols);
        let rows = sel.rows();
        let cols = sel.cols();
        let mut data = Vec::with_capacity(rows * cols);
        for row in sel.lower_row..sel.upper_row {
            let start = row * self.cols + sel.lower_col;
            data.extend_from_slice(&self.data[start..start + cols]);
        }
        Grid {
            rows,
            cols,
            scale: self.scale,
            data,
        }
    }

    /// Cell-by-cell equality where two missing cells compare equal.
    pub fn values_eq(&self, other: &Grid) -> bool {
        self.shape() == other.shape()
            && self.scale == other.scale
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> Grid {
        let data = (0..rows * cols).map(|v| v as f64).collect();
        Grid::from_vec(rows, cols, 1.0, data).unwrap()
    }

    #[test]
    fn new_grid_has_no_data() {
        let grid = Grid::new(3, 4, 2.0);
        assert_eq!(grid.shape(), (3, 4));
        assert_eq!(grid.valid_count(), 0);
        assert!(grid.median_valid().is_none());
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(matches!(
            Grid::from_vec(2, 2, 1.0, vec![0.0; 3]),
            Err(Error::ShapeMismatch { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn get_is_bounds_checked() {
        let grid = ramp(2, 3);
        assert_eq!(grid.get(1, 2), Some(5.0));
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid[(1, 0)], 3.0);
    }

    #[test]
    fn crop_keeps_selected_window() {
        let grid = ramp(4, 5);
        let cropped = grid.crop(&Selection::new(1, 1, 3, 4));
        assert_eq!(cropped.shape(), (2, 3));
        assert_eq!(cropped.data(), &[6.0, 7.0, 8.0, 11.0, 12.0, 13.0]);

        let clamped = grid.crop(&Selection::new(2, 3, 10, 10));
        assert_eq!(clamped.shape(), (2, 2));
    }

    #[test]
    fn zip_with_rejects_other_shapes() {
        let a = ramp(2, 2);
        let b = ramp(2, 3);
        assert!(a.zip_with(&b, |x, y| x - y).is_err());
        let diff = a.zip_with(&a, |x, y| x - y).unwrap();
        assert!(diff.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn median_and_equality_ignore_missing_cells() {
        let mut grid = ramp(1, 4);
        grid.set(0, 0, NO_DATA);
        assert_eq!(grid.median_valid(), Some(2.0));
        assert_eq!(grid.min_max_valid(), Some((1.0, 3.0)));
        assert!(grid.values_eq(&grid.clone()));
        assert_eq!(grid.valid_cells().count(), 3);
    }
}
