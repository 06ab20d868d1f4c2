//! Linear interpolation of scattered samples over their Delaunay triangulation.

use delaunator::{triangulate, Point};
use pcd_core::grid::Grid;

// Tolerance on barycentric weights so lattice points on shared edges are hit
const EDGE_EPSILON: f64 = 1e-9;
const DEGENERATE_AREA: f64 = 1e-12;

/// A valid cell of the source grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub row: f64,
    pub col: f64,
    pub value: f64,
}

/// Interpolates `samples` onto a lattice of `rows` x `cols` nodes, node (i, j)
/// sitting at source position (i * step, j * step). Nodes outside the convex
/// hull of the samples stay [`NO_DATA`](pcd_core::grid::NO_DATA).
///
/// With fewer than three non-collinear samples there is nothing to
/// triangulate; only nodes that coincide with a sample receive a value.
pub fn interpolate_lattice(samples: &[Sample], rows: usize, cols: usize, step: f64, scale: f64) -> Grid {
    let mut out = Grid::new(rows, cols, scale);
    let points: Vec<Point> = samples.iter().map(|s| Point { x: s.col, y: s.row }).collect();
    let triangulation = triangulate(&points);

    if triangulation.triangles.is_empty() {
        log::warn!(
            "{} samples do not span an area, only sample cells are kept",
            samples.len()
        );
        place_samples(&mut out, samples, step);
        return out;
    }
    log::debug!(
        "triangulated {} samples into {} triangles",
        samples.len(),
        triangulation.len()
    );

    for tri in triangulation.triangles.chunks_exact(3) {
        fill_triangle(&mut out, [&samples[tri[0]], &samples[tri[1]], &samples[tri[2]]], step);
    }
    place_samples(&mut out, samples, step);
    out
}

// Samples that sit exactly on a lattice node keep their own value
fn place_samples(out: &mut Grid, samples: &[Sample], step: f64) {
    for s in samples {
        let i = s.row / step;
        let j = s.col / step;
        if i.fract() == 0.0 && j.fract() == 0.0 {
            let (i, j) = (i as usize, j as usize);
            if i < out.rows() && j < out.cols() {
                out.set(i, j, s.value);
            }
        }
    }
}

fn fill_triangle(out: &mut Grid, [a, b, c]: [&Sample; 3], step: f64) {
    let denom = (b.row - c.row) * (a.col - c.col) + (c.col - b.col) * (a.row - c.row);
    if denom.abs() < DEGENERATE_AREA {
        return;
    }

    let min_row = a.row.min(b.row).min(c.row);
    let max_row = a.row.max(b.row).max(c.row);
    let min_col = a.col.min(b.col).min(c.col);
    let max_col = a.col.max(b.col).max(c.col);

    let i0 = (min_row / step).ceil().max(0.0) as usize;
    let i1 = ((max_row / step).floor() as usize).min(out.rows().saturating_sub(1));
    let j0 = (min_col / step).ceil().max(0.0) as usize;
    let j1 = ((max_col / step).floor() as usize).min(out.cols().saturating_sub(1));

    for i in i0..=i1 {
        let py = i as f64 * step;
        for j in j0..=j1 {
            if !out.value(i, j).is_nan() {
                continue;
            }
            let px = j as f64 * step;
            let w1 = ((b.row - c.row) * (px - c.col) + (c.col - b.col) * (py - c.row)) / denom;
            let w2 = ((c.row - a.row) * (px - c.col) + (a.col - c.col) * (py - c.row)) / denom;
            let w3 = 1.0 - w1 - w2;
            if w1 >= -EDGE_EPSILON && w2 >= -EDGE_EPSILON && w3 >= -EDGE_EPSILON {
                out.set(i, j, w1 * a.value + w2 * b.value + w3 * c.value);
            }
        }
    }
}
