/// Dense row-major image used by the segmentation stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

pub const NEIGHBOURS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const NEIGHBOURS_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl<T: Copy> Raster<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }

    pub fn from_fn<F: FnMut(usize, usize) -> T>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
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

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    pub fn get_opt(&self, row: isize, col: isize) -> Option<T> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        Some(self.data[row as usize * self.cols + col as usize])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    /// In-bounds neighbours of (row, col) for the given offsets.
    pub fn neighbours<'a>(
        &self,
        row: usize,
        col: usize,
        offsets: &'a [(isize, isize)],
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        let (rows, cols) = (self.rows as isize, self.cols as isize);
        offsets.iter().filter_map(move |(dr, dc)| {
            let r = row as isize + dr;
            let c = col as isize + dc;
            (r >= 0 && c >= 0 && r < rows && c < cols).then_some((r as usize, c as usize))
        })
    }
}
