use std::collections::VecDeque;

use crate::raster::{Raster, NEIGHBOURS_4, NEIGHBOURS_8};

// Running maximum over a (2 * radius + 1) window, truncated at the borders
fn max_filter_1d(src: &[f64], dst: &mut [f64], radius: usize) {
    let n = src.len();
    for (i, out) in dst.iter_mut().enumerate().take(n) {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius).min(n - 1);
        *out = src[lo..=hi].iter().copied().fold(f64::MIN, f64::max);
    }
}

fn max_filter(src: &Raster<f64>, radius: usize) -> Raster<f64> {
    let (rows, cols) = src.shape();
    let mut out = Raster::new(rows, cols, 0.0);
    let mut line = vec![0.0; rows.max(cols)];
    let mut filtered = vec![0.0; rows.max(cols)];

    for r in 0..rows {
        for c in 0..cols {
            line[c] = src.get(r, c);
        }
        max_filter_1d(&line[..cols], &mut filtered[..cols], radius);
        for c in 0..cols {
            out.set(r, c, filtered[c]);
        }
    }
    for c in 0..cols {
        for r in 0..rows {
            line[r] = out.get(r, c);
        }
        max_filter_1d(&line[..rows], &mut filtered[..rows], radius);
        for r in 0..rows {
            out.set(r, c, filtered[r]);
        }
    }
    out
}

/// Marks local maxima of `distance` inside `foreground`: pixels equal to the
/// maximum of their (2 * min_distance + 1) square, strictly positive, and at
/// least `min_distance` away from the raster border. Plateaus yield several
/// adjacent peaks; labeling merges them into one seed.
pub fn peak_local_max(distance: &Raster<f64>, foreground: &Raster<bool>, min_distance: usize) -> Raster<bool> {
    let (rows, cols) = distance.shape();
    let radius = min_distance.max(1);
    let maxima = max_filter(distance, radius);

    Raster::from_fn(rows, cols, |r, c| {
        let inside = r >= min_distance
            && c >= min_distance
            && r + min_distance < rows
            && c + min_distance < cols;
        let d = distance.get(r, c);
        inside && foreground.get(r, c) && d > 0.0 && d == maxima.get(r, c)
    })
}

/// Connected component labeling. Labels start at 1; 0 is background.
pub fn label_components(mask: &Raster<bool>, eight_connected: bool) -> (Raster<u32>, u32) {
    let offsets: &[(isize, isize)] = if eight_connected {
        &NEIGHBOURS_8
    } else {
        &NEIGHBOURS_4
    };
    let (rows, cols) = mask.shape();
    let mut labels = Raster::new(rows, cols, 0u32);
    let mut next = 0u32;
    let mut queue = VecDeque::new();

    for r in 0..rows {
        for c in 0..cols {
            if !mask.get(r, c) || labels.get(r, c) != 0 {
                continue;
            }
            next += 1;
            labels.set(r, c, next);
            queue.push_back((r, c));
            while let Some((pr, pc)) = queue.pop_front() {
                for (nr, nc) in mask.neighbours(pr, pc, offsets) {
                    if mask.get(nr, nc) && labels.get(nr, nc) == 0 {
                        labels.set(nr, nc, next);
                        queue.push_back((nr, nc));
                    }
                }
            }
        }
    }
    (labels, next)
}
