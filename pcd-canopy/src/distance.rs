//! Exact Euclidean distance transform (Felzenszwalb & Huttenlocher).

use crate::raster::Raster;

// Stand-in for infinity that keeps the parabola intersections finite
const FAR: f64 = 1e20;

fn squared_distance_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        // z[0] is -inf so k never underflows
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate().take(n) {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let dq = qf - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}

/// Distance from every foreground pixel to the nearest background pixel;
/// background pixels are 0.
pub fn distance_transform(foreground: &Raster<bool>) -> Raster<f64> {
    let (rows, cols) = foreground.shape();
    let n = rows.max(cols);
    let mut f = vec![0.0; n];
    let mut d = vec![0.0; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0; n + 1];

    let mut sq = Raster::from_fn(rows, cols, |r, c| if foreground.get(r, c) { FAR } else { 0.0 });

    for c in 0..cols {
        for r in 0..rows {
            f[r] = sq.get(r, c);
        }
        squared_distance_1d(&f[..rows], &mut d[..rows], &mut v, &mut z);
        for r in 0..rows {
            sq.set(r, c, d[r]);
        }
    }
    for r in 0..rows {
        for c in 0..cols {
            f[c] = sq.get(r, c);
        }
        squared_distance_1d(&f[..cols], &mut d[..cols], &mut v, &mut z);
        for c in 0..cols {
            sq.set(r, c, d[c]);
        }
    }

    Raster::from_fn(rows, cols, |r, c| sq.get(r, c).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn brute_force(mask: &Raster<bool>) -> Raster<f64> {
        Raster::from_fn(mask.rows(), mask.cols(), |r, c| {
            if !mask.get(r, c) {
                return 0.0;
            }
            let mut best = f64::MAX;
            for rr in 0..mask.rows() {
                for cc in 0..mask.cols() {
                    if !mask.get(rr, cc) {
                        let dr = rr as f64 - r as f64;
                        let dc = cc as f64 - c as f64;
                        best = best.min((dr * dr + dc * dc).sqrt());
                    }
                }
            }
            best
        })
    }

    #[test]
    fn matches_brute_force() {
        let mask = Raster::from_fn(11, 13, |r, c| {
            let dr = r as f64 - 5.0;
            let dc = c as f64 - 6.0;
            dr * dr + dc * dc <= 16.0 || (r == 1 && c > 8)
        });
        let fast = distance_transform(&mask);
        let slow = brute_force(&mask);
        for (a, b) in fast.data().iter().zip(slow.data()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(fast.get(5, 6), 17f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn background_is_zero() {
        let mask = Raster::new(3, 4, false);
        assert!(distance_transform(&mask).data().iter().all(|v| *v == 0.0));
    }
}
