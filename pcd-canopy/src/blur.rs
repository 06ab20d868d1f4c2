use crate::raster::Raster;

/// Normalized 1-D Gaussian of odd size `ksize`, with sigma derived from the
/// size as `0.3 * ((ksize - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(ksize: usize) -> Vec<f64> {
    let ksize = ksize.max(1) | 1;
    let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (ksize / 2) as isize;
    let kernel: Vec<f64> = (-half..=half)
        .map(|i| {
            let x = i as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.into_iter().map(|v| v / sum).collect()
}

// Mirror without repeating the edge: for n = 5, -1 -> 1 and 5 -> 3
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * (n - 1) - i;
        } else {
            return i as usize;
        }
    }
}

/// Separable Gaussian blur with mirrored borders.
pub fn gaussian_blur(src: &Raster<f64>, ksize: usize) -> Raster<f64> {
    let kernel = gaussian_kernel(ksize);
    let half = (kernel.len() / 2) as isize;
    let (rows, cols) = src.shape();
    if rows == 0 || cols == 0 {
        return src.clone();
    }

    let horizontal = Raster::from_fn(rows, cols, |r, c| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * src.get(r, reflect101(c as isize + k as isize - half, cols)))
            .sum::<f64>()
    });
    Raster::from_fn(rows, cols, |r, c| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * horizontal.get(reflect101(r as isize + k as isize - half, rows), c))
            .sum::<f64>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(5);
        assert_eq!(k.len(), 5);
        assert_abs_diff_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(k[0], k[4]);
        assert!(k[2] > k[1]);
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn reflect101_mirrors_without_edge() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(6, 5), 2);
        assert_eq!(reflect101(3, 1), 0);
    }

    #[test]
    fn blur_preserves_constant_and_mass() {
        let flat = Raster::new(6, 7, 3.0);
        let out = gaussian_blur(&flat, 5);
        for v in out.data() {
            assert_abs_diff_eq!(*v, 3.0, epsilon = 1e-12);
        }

        let mut spike = Raster::new(9, 9, 0.0);
        spike.set(4, 4, 1.0);
        let out = gaussian_blur(&spike, 5);
        assert_abs_diff_eq!(out.data().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(out.get(4, 4) < 1.0);
        assert_abs_diff_eq!(out.get(3, 4), out.get(5, 4), epsilon = 1e-15);
    }
}
