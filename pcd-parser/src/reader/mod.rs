pub mod csv;
pub mod las;

use std::io;

use pcd_core::pointcloud::point::{PointBatch, PointRecord};

pub trait PointReader {
    fn next_point(&mut self) -> io::Result<Option<PointRecord>>;
}

/// Pulls points from a reader in column batches of at most `chunk_size`.
pub struct PointIterator<R: PointReader> {
    reader: R,
    chunk_size: usize,
    failed: bool,
}

impl<R: PointReader> PointIterator<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            failed: false,
        }
    }
}

impl<R: PointReader> Iterator for PointIterator<R> {
    type Item = io::Result<PointBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut buffer = PointBatch::with_capacity(self.chunk_size);

        for _ in 0..self.chunk_size {
            match self.reader.next_point() {
                Ok(Some(p)) => buffer.push(p),
                Ok(None) => break,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        if buffer.is_empty() {
            None
        } else {
            Some(Ok(buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingReader {
        remaining: usize,
        fail_at: Option<usize>,
    }

    impl PointReader for CountingReader {
        fn next_point(&mut self) -> io::Result<Option<PointRecord>> {
            if Some(self.remaining) == self.fail_at {
                return Err(io::Error::other("broken record"));
            }
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(PointRecord {
                x: self.remaining as f64,
                y: 0.0,
                z: 0.0,
                intensity: 0,
                classification: 2,
            }))
        }
    }

    #[test]
    fn chunks_cover_all_points() {
        let reader = CountingReader {
            remaining: 7,
            fail_at: None,
        };
        let sizes: Vec<usize> = PointIterator::new(reader, 3)
            .map(|batch| batch.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn read_error_ends_iteration() {
        let reader = CountingReader {
            remaining: 7,
            fail_at: Some(2),
        };
        let results: Vec<_> = PointIterator::new(reader, 4).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
