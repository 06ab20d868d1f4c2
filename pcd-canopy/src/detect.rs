use pcd_core::{
    grid::{is_valid, Grid, NO_DATA},
    progress::{NoProgress, ProgressObserver},
    tree::DetectedTree,
    Result,
};
use pcd_infill::{infill, InfillOptions};

use crate::{
    blur::gaussian_blur,
    distance::distance_transform,
    enclosing::crown_circles,
    params::TreeDetectorParams,
    peaks::{label_components, peak_local_max},
    raster::Raster,
    resample::resample_nearest,
    threshold::{binarize, to_gray},
    watershed::watershed,
};

const STAGE: &str = "detecting trees";

/// Object minus ground, cell-wise, with implausible heights dropped and the
/// holes closed by interpolation. Holes in the ground grid are closed first,
/// then it is resampled onto the object grid when their sizes differ.
pub fn height_above_ground(ground: &Grid, object: &Grid, params: &TreeDetectorParams) -> Result<Grid> {
    let closed;
    let ground = if ground.valid_count() < ground.rows() * ground.cols() {
        log::debug!(
            "closing {} empty ground cells",
            ground.rows() * ground.cols() - ground.valid_count()
        );
        closed = infill(ground, None, &InfillOptions::default())?.filled;
        &closed
    } else {
        ground
    };

    let resampled;
    let ground = if ground.shape() != object.shape() {
        log::debug!(
            "resampling ground {:?} onto object {:?}",
            ground.shape(),
            object.shape()
        );
        resampled = resample_nearest(ground, object.rows(), object.cols());
        &resampled
    } else {
        ground
    };

    let ceiling = params.maximum_tree_height;
    let hag = object.zip_with(ground, |o, g| {
        let h = o - g;
        if h > ceiling {
            NO_DATA
        } else {
            h
        }
    })?;
    Ok(infill(&hag, None, &InfillOptions::default())?.filled)
}

/// Maximum valid height within `window` cells of the pixel nearest to
/// (x, y). `None` when the window leaves the grid or holds no valid cell.
pub fn tree_height(hag: &Grid, x: f64, y: f64, window: usize) -> Option<f64> {
    let col = x.round() as isize;
    let row = y.round() as isize;
    let w = window as isize;
    if !hag.contains(row - w, col - w) || !hag.contains(row + w, col + w) {
        return None;
    }

    let mut best: Option<f64> = None;
    for r in row - w..=row + w {
        for c in col - w..=col + w {
            if let Some(v) = hag.get(r, c).filter(|v| is_valid(*v)) {
                best = Some(best.map_or(v, |b| b.max(v)));
            }
        }
    }
    best
}

pub fn detect_trees(ground: &Grid, object: &Grid, params: &TreeDetectorParams) -> Result<Vec<DetectedTree>> {
    detect_trees_with_progress(ground, object, params, &mut NoProgress)
}

/// Finds tree crowns on the object surface above the ground surface.
/// Positions and radii are in pixels of `object`.
pub fn detect_trees_with_progress(
    ground: &Grid,
    object: &Grid,
    params: &TreeDetectorParams,
    progress: &mut dyn ProgressObserver,
) -> Result<Vec<DetectedTree>> {
    let hag = height_above_ground(ground, object, params)?;
    let surface = Raster::from_fn(hag.rows(), hag.cols(), |r, c| {
        let v = hag.value(r, c);
        if is_valid(v) {
            v
        } else {
            0.0
        }
    });

    let blurred = gaussian_blur(&surface, params.estimated_tree_size);
    let Some(gray) = to_gray(&blurred) else {
        log::info!("height surface is flat, no trees");
        return Ok(Vec::new());
    };
    let canopy = binarize(&gray, params.threshold);

    let distance = distance_transform(&canopy);
    let peaks = peak_local_max(&distance, &canopy, params.minimum_tree_distance);
    let (markers, seeds) = label_components(&peaks, true);
    let crowns = watershed(&distance, &markers, &canopy);
    log::debug!("{} crown seeds", seeds);

    let circles = crown_circles(&crowns, seeds);
    let total = circles.len();
    let mut trees = Vec::new();
    for (i, circle) in circles.into_iter().enumerate() {
        progress.report(STAGE, i, total);
        let Some(circle) = circle else {
            continue;
        };
        let Some(height) = tree_height(&hag, circle.x, circle.y, params.height_window) else {
            continue;
        };
        if height < params.minimum_tree_height {
            continue;
        }
        trees.push(DetectedTree {
            x: circle.x,
            y: circle.y,
            radius: circle.radius,
            height,
        });
    }
    progress.report(STAGE, total, total);
    log::info!("found {} trees", trees.len());

    Ok(trees)
}
