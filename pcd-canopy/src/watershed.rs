//! Marker-controlled watershed flooding the distance transform from its
//! peaks downward.

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::raster::{Raster, NEIGHBOURS_4};

#[derive(Debug, Clone, Copy)]
struct WatershedItem {
    depth: f64,
    age: u64,
    row: usize,
    col: usize,
}

impl PartialEq for WatershedItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WatershedItem {}

impl PartialOrd for WatershedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WatershedItem {
    // BinaryHeap pops the greatest: deepest first, then first queued
    fn cmp(&self, other: &Self) -> Ordering {
        self.depth
            .total_cmp(&other.depth)
            .then_with(|| other.age.cmp(&self.age))
    }
}

/// Grows every non-zero marker over 4-connected `mask` pixels, always
/// expanding from the pixel with the largest `distance`. Pixels outside the
/// mask, or unreachable from any marker, stay 0.
pub fn watershed(distance: &Raster<f64>, markers: &Raster<u32>, mask: &Raster<bool>) -> Raster<u32> {
    let (rows, cols) = distance.shape();
    let mut labels = Raster::new(rows, cols, 0u32);
    let mut heap = BinaryHeap::new();
    let mut age = 0u64;

    for row in 0..rows {
        for col in 0..cols {
            let marker = markers.get(row, col);
            if marker != 0 && mask.get(row, col) {
                labels.set(row, col, marker);
                heap.push(WatershedItem {
                    depth: distance.get(row, col),
                    age,
                    row,
                    col,
                });
                age += 1;
            }
        }
    }

    while let Some(item) = heap.pop() {
        let label = labels.get(item.row, item.col);
        for (nr, nc) in labels.neighbours(item.row, item.col, &NEIGHBOURS_4) {
            if !mask.get(nr, nc) || labels.get(nr, nc) != 0 {
                continue;
            }
            labels.set(nr, nc, label);
            heap.push(WatershedItem {
                depth: distance.get(nr, nc),
                age,
                row: nr,
                col: nc,
            });
            age += 1;
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_basins_split_at_the_saddle() {
        // 1 x 9 ridge: peaks at 2 and 6, saddle at 4
        let profile = [1.0, 2.0, 3.0, 2.0, 1.5, 2.0, 3.0, 2.0, 1.0];
        let distance = Raster::from_fn(1, 9, |_, c| profile[c]);
        let mut markers = Raster::new(1, 9, 0u32);
        markers.set(0, 2, 1);
        markers.set(0, 6, 2);
        let mask = Raster::new(1, 9, true);

        let labels = watershed(&distance, &markers, &mask);
        assert_eq!(labels.data()[..4], [1, 1, 1, 1]);
        assert_eq!(labels.data()[5..], [2, 2, 2, 2]);
        assert_ne!(labels.get(0, 4), 0);
    }

    #[test]
    fn mask_blocks_flooding() {
        let distance = Raster::new(1, 5, 1.0);
        let mut markers = Raster::new(1, 5, 0u32);
        markers.set(0, 0, 7);
        let mask = Raster::from_fn(1, 5, |_, c| c != 2);
        let labels = watershed(&distance, &markers, &mask);
        assert_eq!(labels.data(), &[7, 7, 0, 0, 0]);
    }

    #[test]
    fn equal_depths_pop_in_queue_order() {
        let a = WatershedItem { depth: 1.0, age: 0, row: 0, col: 0 };
        let b = WatershedItem { depth: 1.0, age: 1, row: 0, col: 1 };
        let c = WatershedItem { depth: 2.0, age: 2, row: 0, col: 2 };
        let mut heap = BinaryHeap::from(vec![b, c, a]);
        assert_eq!(heap.pop().map(|i| i.col), Some(2));
        assert_eq!(heap.pop().map(|i| i.col), Some(0));
        assert_eq!(heap.pop().map(|i| i.col), Some(1));
    }
}
