use bitcode::{Decode, Encode};
use pcd_core::{
    grid::{is_valid, Grid, NO_DATA},
    Result,
};
use serde::{Deserialize, Serialize};

/// Stand-in for empty cells, since JSON has no NaN.
pub const NO_DATA_VALUE: f32 = -9999.0;

/// Row-major grid as handed to the packaging side. Row 0 is the south edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct GridRecord {
    pub rows: u32,
    pub cols: u32,
    pub scale: f64,
    pub no_data: f32,
    pub data: Vec<f32>,
}

impl GridRecord {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            rows: grid.rows() as u32,
            cols: grid.cols() as u32,
            scale: grid.scale(),
            no_data: NO_DATA_VALUE,
            data: grid
                .data()
                .iter()
                .map(|v| if is_valid(*v) { *v as f32 } else { NO_DATA_VALUE })
                .collect(),
        }
    }

    pub fn to_grid(&self) -> Result<Grid> {
        let data = self
            .data
            .iter()
            .map(|v| if *v == self.no_data { NO_DATA } else { *v as f64 })
            .collect();
        Grid::from_vec(self.rows as usize, self.cols as usize, self.scale, data)
    }
}

impl From<&Grid> for GridRecord {
    fn from(grid: &Grid) -> Self {
        Self::from_grid(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcd_core::Error;

    #[test]
    fn empty_cells_use_the_sentinel() {
        let mut grid = Grid::filled(2, 3, 0.5, 1.25);
        grid.set(1, 2, NO_DATA);
        let record = GridRecord::from_grid(&grid);
        assert_eq!((record.rows, record.cols, record.scale), (2, 3, 0.5));
        assert_eq!(record.data[5], NO_DATA_VALUE);
        assert_eq!(record.data[0], 1.25);

        let back = record.to_grid().unwrap();
        assert!(back.values_eq(&grid));
    }

    #[test]
    fn truncated_data_is_rejected() {
        let mut record = GridRecord::from_grid(&Grid::filled(2, 2, 1.0, 3.0));
        record.data.pop();
        assert!(matches!(record.to_grid(), Err(Error::ShapeMismatch { .. })));
    }
}
