use bitcode::{Decode, Encode};
use coordinate_transformer::CoordinateEngine;
use pcd_core::{grid::mask::PaintMask, tree::DetectedTree};
use serde::{Deserialize, Serialize};

/// Tree in destination space: `x`/`z` on the ground plane, centred on the
/// point store, and sizes in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TreePlacement {
    pub x: f64,
    pub z: f64,
    pub radius: f64,
    pub height: f64,
}

/// Converts trees found on a grid of pitch `scale` into destination space.
/// Trees whose centre cell is painted EXCLUDE in `mask` are dropped.
pub fn place_trees(
    engine: &CoordinateEngine,
    trees: &[DetectedTree],
    scale: f64,
    mask: Option<&PaintMask>,
) -> Vec<TreePlacement> {
    let placed: Vec<TreePlacement> = trees
        .iter()
        .filter(|tree| !mask.is_some_and(|mask| on_excluded_cell(mask, tree)))
        .map(|tree| {
            let (lx, ly, radius) = tree.to_local(scale);
            let (x, _, z) = engine.local_to_dest(lx, ly, 0.0);
            TreePlacement {
                x,
                z,
                radius,
                height: tree.height,
            }
        })
        .collect();
    if placed.len() < trees.len() {
        log::info!("{} trees dropped by the paint mask", trees.len() - placed.len());
    }
    placed
}

fn on_excluded_cell(mask: &PaintMask, tree: &DetectedTree) -> bool {
    let row = tree.y.round();
    let col = tree.x.round();
    if row < 0.0 || col < 0.0 {
        return false;
    }
    let (row, col) = (row as usize, col as usize);
    row < mask.rows() && col < mask.cols() && mask.is_excluded(row, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pcd_core::grid::mask::EXCLUDE;

    fn engine() -> CoordinateEngine {
        let mut engine = CoordinateEngine::new();
        engine
            .add_points(
                &[1000.0, 1040.0],
                &[2000.0, 2020.0],
                &[0.0, 0.0],
                &[0, 0],
                &[2, 2],
            )
            .unwrap();
        engine.compute_origin().unwrap();
        engine.remove_bias().unwrap();
        engine
    }

    fn tree(x: f64, y: f64) -> DetectedTree {
        DetectedTree {
            x,
            y,
            radius: 2.0,
            height: 12.0,
        }
    }

    #[test]
    fn trees_are_centred_on_the_store() {
        let placed = place_trees(&engine(), &[tree(9.5, 4.5)], 2.0, None);
        assert_eq!(placed.len(), 1);
        // local (20, 10) on a 40 x 20 store
        assert_abs_diff_eq!(placed[0].x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(placed[0].z, 0.0, epsilon = 1e-12);
        assert_eq!(placed[0].radius, 4.0);
        assert_eq!(placed[0].height, 12.0);
    }

    #[test]
    fn excluded_cells_drop_trees() {
        let mut mask = PaintMask::empty(11, 21);
        mask.mark(3, 7, EXCLUDE);
        let trees = [tree(7.2, 2.8), tree(1.0, 1.0), tree(50.0, 50.0)];
        let placed = place_trees(&engine(), &trees, 2.0, Some(&mask));
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].height, 12.0);
    }
}
