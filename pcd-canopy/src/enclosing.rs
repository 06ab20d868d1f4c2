use serde::{Deserialize, Serialize};

use crate::{
    peaks::label_components,
    raster::{Raster, NEIGHBOURS_4},
};

const CONTAINS_EPSILON: f64 = 1e-7;

/// Circle in pixel space, `x` along columns and `y` along rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    fn contains(&self, (x, y): (f64, f64)) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt() <= self.radius + CONTAINS_EPSILON
    }

    fn from_pair(a: (f64, f64), b: (f64, f64)) -> Self {
        let dx = a.0 - b.0;
        let dy = a.1 - b.1;
        Circle {
            x: (a.0 + b.0) / 2.0,
            y: (a.1 + b.1) / 2.0,
            radius: (dx * dx + dy * dy).sqrt() / 2.0,
        }
    }

    fn from_triple(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Self {
        let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
        if d.abs() < 1e-12 {
            // collinear: the widest pair spans the other point
            let pairs = [Self::from_pair(a, b), Self::from_pair(a, c), Self::from_pair(b, c)];
            return pairs
                .into_iter()
                .fold(pairs[0], |best, p| if p.radius > best.radius { p } else { best });
        }
        let a2 = a.0 * a.0 + a.1 * a.1;
        let b2 = b.0 * b.0 + b.1 * b.1;
        let c2 = c.0 * c.0 + c.1 * c.1;
        let x = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
        let y = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
        let radius = ((a.0 - x).powi(2) + (a.1 - y).powi(2)).sqrt();
        Circle { x, y, radius }
    }
}

/// Smallest circle containing every point (incremental Welzl).
pub fn min_enclosing_circle(points: &[(f64, f64)]) -> Option<Circle> {
    let first = *points.first()?;
    let mut circle = Circle {
        x: first.0,
        y: first.1,
        radius: 0.0,
    };
    for i in 1..points.len() {
        if circle.contains(points[i]) {
            continue;
        }
        circle = Circle {
            x: points[i].0,
            y: points[i].1,
            radius: 0.0,
        };
        for j in 0..i {
            if circle.contains(points[j]) {
                continue;
            }
            circle = Circle::from_pair(points[i], points[j]);
            for k in 0..j {
                if !circle.contains(points[k]) {
                    circle = Circle::from_triple(points[i], points[j], points[k]);
                }
            }
        }
    }
    Some(circle)
}

/// Enclosing circle of every label in `1..=count`, taken over the outline of
/// the label's largest 8-connected piece. Entry `i` belongs to label `i + 1`;
/// labels without pixels give `None`.
pub fn crown_circles(labels: &Raster<u32>, count: u32) -> Vec<Option<Circle>> {
    let mut pixels: Vec<Vec<(usize, usize)>> = vec![Vec::new(); count as usize];
    for row in 0..labels.rows() {
        for col in 0..labels.cols() {
            let label = labels.get(row, col);
            if label != 0 && label <= count {
                pixels[label as usize - 1].push((row, col));
            }
        }
    }
    pixels.iter().map(|p| outline_circle(p)).collect()
}

fn outline_circle(pixels: &[(usize, usize)]) -> Option<Circle> {
    let min_row = pixels.iter().map(|p| p.0).min()?;
    let min_col = pixels.iter().map(|p| p.1).min()?;
    let max_row = pixels.iter().map(|p| p.0).max()?;
    let max_col = pixels.iter().map(|p| p.1).max()?;

    let mut local = Raster::new(max_row - min_row + 1, max_col - min_col + 1, false);
    for &(r, c) in pixels {
        local.set(r - min_row, c - min_col, true);
    }

    let (components, count) = label_components(&local, true);
    let mut sizes = vec![0usize; count as usize + 1];
    for &id in components.data() {
        sizes[id as usize] += 1;
    }
    let largest = (1..=count)
        .max_by(|a, b| sizes[*a as usize].cmp(&sizes[*b as usize]).then(b.cmp(a)))?;

    let mut outline = Vec::new();
    for r in 0..local.rows() {
        for c in 0..local.cols() {
            if components.get(r, c) != largest {
                continue;
            }
            let on_edge = NEIGHBOURS_4.iter().any(|(dr, dc)| {
                components.get_opt(r as isize + dr, c as isize + dc) != Some(largest)
            });
            if on_edge {
                outline.push(((c + min_col) as f64, (r + min_row) as f64));
            }
        }
    }
    min_enclosing_circle(&outline)
}
