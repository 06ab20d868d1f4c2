use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::grid::index::pixel_to_local;

/// A tree crown found on a height-above-ground raster. `x`/`y` and `radius`
/// are in pixels of that raster; `height` is in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct DetectedTree {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub height: f64,
}

impl DetectedTree {
    /// Position and radius in the local frame for a raster of cell pitch `scale`.
    pub fn to_local(&self, scale: f64) -> (f64, f64, f64) {
        let (x, y) = pixel_to_local(self.x, self.y, scale);
        (x, y, self.radius * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_local_scales_radius() {
        let tree = DetectedTree {
            x: 10.0,
            y: 4.0,
            radius: 3.0,
            height: 12.0,
        };
        assert_eq!(tree.to_local(2.0), (21.0, 9.0, 6.0));
    }
}
