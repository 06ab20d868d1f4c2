use crate::{params::ThresholdMethod, raster::Raster};

/// Stretches the surface onto 0..=255 with truncation. `None` when the
/// surface is flat and carries no contrast to threshold.
pub fn to_gray(src: &Raster<f64>) -> Option<Raster<u8>> {
    let (min, max) = src
        .data()
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if !(max > min) {
        return None;
    }
    let range = max - min;
    Some(Raster::from_fn(src.rows(), src.cols(), |r, c| {
        ((src.get(r, c) - min) / range * 255.0) as u8
    }))
}

/// Otsu's threshold: the level maximizing between-class variance when
/// pixels at or below it are background.
pub fn otsu_threshold(gray: &Raster<u8>) -> u8 {
    let mut hist = [0u64; 256];
    for &v in gray.data() {
        hist[v as usize] += 1;
    }

    let total = gray.data().len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = 0f64;
    let mut best_t = 0u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        sum_b += t as f64 * h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;
        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Local-mean threshold over a `block_size` square window clipped to the
/// image. Zero pixels are never foreground.
pub fn adaptive_threshold(gray: &Raster<u8>, block_size: usize, offset: f64) -> Raster<bool> {
    let (rows, cols) = gray.shape();
    let half = (block_size.max(3) / 2) as isize;

    // summed-area table with a zero border row/column
    let mut integral = vec![0u64; (rows + 1) * (cols + 1)];
    for r in 0..rows {
        let mut row_sum = 0u64;
        for c in 0..cols {
            row_sum += gray.get(r, c) as u64;
            integral[(r + 1) * (cols + 1) + c + 1] = integral[r * (cols + 1) + c + 1] + row_sum;
        }
    }

    Raster::from_fn(rows, cols, |r, c| {
        let v = gray.get(r, c);
        if v == 0 {
            return false;
        }
        let r0 = (r as isize - half).max(0) as usize;
        let c0 = (c as isize - half).max(0) as usize;
        let r1 = ((r as isize + half) as usize).min(rows - 1) + 1;
        let c1 = ((c as isize + half) as usize).min(cols - 1) + 1;
        let sum = integral[r1 * (cols + 1) + c1] + integral[r0 * (cols + 1) + c0]
            - integral[r0 * (cols + 1) + c1]
            - integral[r1 * (cols + 1) + c0];
        let mean = sum as f64 / ((r1 - r0) * (c1 - c0)) as f64;
        v as f64 > mean - offset
    })
}

pub fn binarize(gray: &Raster<u8>, method: ThresholdMethod) -> Raster<bool> {
    match method {
        ThresholdMethod::Otsu => {
            let t = otsu_threshold(gray);
            log::debug!("otsu threshold {}", t);
            Raster::from_fn(gray.rows(), gray.cols(), |r, c| gray.get(r, c) > t)
        }
        ThresholdMethod::Adaptive { block_size, offset } => {
            adaptive_threshold(gray, block_size, offset)
        }
    }
}
