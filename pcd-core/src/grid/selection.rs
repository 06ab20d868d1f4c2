use serde::{Deserialize, Serialize};

/// Rectangular window over a grid. Lower bounds are inclusive, upper bounds
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub lower_row: usize,
    pub lower_col: usize,
    pub upper_row: usize,
    pub upper_col: usize,
}

impl Selection {
    pub fn new(lower_row: usize, lower_col: usize, upper_row: usize, upper_col: usize) -> Self {
        Self {
            lower_row,
            lower_col,
            upper_row,
            upper_col,
        }
    }

    pub fn full(rows: usize, cols: usize) -> Self {
        Self::new(0, 0, rows, cols)
    }

    pub fn rows(&self) -> usize {
        self.upper_row.saturating_sub(self.lower_row)
    }

    pub fn cols(&self) -> usize {
        self.upper_col.saturating_sub(self.lower_col)
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    /// Intersection with a grid of the given shape.
    pub fn clamp(&self, rows: usize, cols: usize) -> Selection {
        let upper_row = self.upper_row.min(rows);
        let upper_col = self.upper_col.min(cols);
        Selection {
            lower_row: self.lower_row.min(upper_row),
            lower_col: self.lower_col.min(upper_col),
            upper_row,
            upper_col,
        }
    }

    /// Local-frame offset of the selection's lower-left corner.
    pub fn lower_left_offset(&self, scale: f64) -> (f64, f64) {
        (self.lower_col as f64 * scale, self.lower_row as f64 * scale)
    }
}
