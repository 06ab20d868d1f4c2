use crate::{
    error::{Error, Result},
    grid::selection::Selection,
};

/// Cell is forced to no-data and never filled.
pub const EXCLUDE: u8 = 0b01;
/// Cell keeps its sampled value instead of the interpolated one.
pub const PRESERVE: u8 = 0b10;

/// Policy bits of one annotation pixel. Channels are taken in stored order.
pub fn classify_pixel(c0: u8, c1: u8, c2: u8) -> u8 {
    if c0 < 40 && c1 < 40 && c2 > 130 {
        EXCLUDE
    } else if c0 > 200 && c1 < 180 && c2 < 70 {
        PRESERVE
    } else {
        0
    }
}

/// Per-cell policy bits aligned with a height grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintMask {
    rows: usize,
    cols: usize,
    bits: Vec<u8>,
}

impl PaintMask {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: vec![0; rows * cols],
        }
    }

    /// Decodes interleaved 3-channel pixels. Images store their top row first
    /// while grids start at the south edge, so `flip_rows` is normally set.
    pub fn from_channels(rows: usize, cols: usize, pixels: &[u8], flip_rows: bool) -> Result<Self> {
        if pixels.len() != rows * cols * 3 {
            return Err(Error::ShapeMismatch {
                what: "mask pixels",
                expected: rows * cols * 3,
                actual: pixels.len(),
            });
        }
        let mut mask = Self::empty(rows, cols);
        for (i, px) in pixels.chunks_exact(3).enumerate() {
            let src_row = i / cols;
            let row = if flip_rows { rows - 1 - src_row } else { src_row };
            mask.bits[row * cols + i % cols] = classify_pixel(px[0], px[1], px[2]);
        }
        Ok(mask)
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

    pub fn bits(&self, row: usize, col: usize) -> u8 {
        self.bits[row * self.cols + col]
    }

    pub fn mark(&mut self, row: usize, col: usize, bits: u8) {
        self.bits[row * self.cols + col] |= bits;
    }

    pub fn is_excluded(&self, row: usize, col: usize) -> bool {
        self.bits(row, col) & EXCLUDE != 0
    }

    pub fn is_preserved(&self, row: usize, col: usize) -> bool {
        self.bits(row, col) & PRESERVE != 0
    }

    /// Sub-mask covered by `selection`, clamped like [`crate::grid::Grid::crop`].
    pub fn crop(&self, selection: &Selection) -> PaintMask {
        let sel = selection.clamp(self.rows, self.cols);
        let cols = sel.cols();
        let mut bits = Vec::with_capacity(sel.rows() * cols);
        for row in sel.lower_row..sel.upper_row {
            let start = row * self.cols + sel.lower_col;
            bits.extend_from_slice(&self.bits[start..start + cols]);
        }
        PaintMask {
            rows: sel.rows(),
            cols,
            bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(classify_pixel(0, 0, 255), EXCLUDE);
        assert_eq!(classify_pixel(39, 39, 131), EXCLUDE);
        assert_eq!(classify_pixel(40, 0, 255), 0);
        assert_eq!(classify_pixel(0, 0, 130), 0);
        assert_eq!(classify_pixel(255, 0, 0), PRESERVE);
        assert_eq!(classify_pixel(201, 179, 69), PRESERVE);
        assert_eq!(classify_pixel(200, 0, 0), 0);
        assert_eq!(classify_pixel(255, 255, 255), 0);
    }

    #[test]
    fn from_channels_flips_rows() {
        // top image row excluded, bottom row preserved
        let pixels = [0, 0, 255, 0, 0, 255, 255, 0, 0, 255, 0, 0];
        let mask = PaintMask::from_channels(2, 2, &pixels, true).unwrap();
        assert!(mask.is_excluded(1, 0));
        assert!(mask.is_preserved(0, 1));

        let unflipped = PaintMask::from_channels(2, 2, &pixels, false).unwrap();
        assert!(unflipped.is_excluded(0, 0));
    }

    #[test]
    fn crop_keeps_bits_under_the_selection() {
        let mut mask = PaintMask::empty(4, 5);
        mask.mark(2, 3, EXCLUDE);
        mask.mark(0, 0, PRESERVE);
        let cropped = mask.crop(&Selection::new(1, 2, 3, 9));
        assert_eq!(cropped.shape(), (2, 3));
        assert!(cropped.is_excluded(1, 1));
        assert_eq!(cropped.bits.iter().filter(|b| **b != 0).count(), 1);
    }

    #[test]
    fn from_channels_checks_length() {
        assert!(PaintMask::from_channels(2, 2, &[0; 11], false).is_err());
    }
}
