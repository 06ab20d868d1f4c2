//! Tree crown detection on a height-above-ground surface.
//!
//! The surface is blurred and binarized into canopy/background, the canopy
//! is split into crowns by a watershed over its distance transform seeded at
//! distance peaks, and each crown is summarized by its enclosing circle and
//! the surface maximum near the circle centre.

pub mod blur;
pub mod detect;
pub mod distance;
pub mod enclosing;
pub mod params;
pub mod peaks;
pub mod raster;
pub mod resample;
pub mod threshold;
pub mod watershed;

pub use detect::{detect_trees, detect_trees_with_progress, height_above_ground, tree_height};
pub use params::{ThresholdMethod, TreeDetectorParams};
pub use resample::resample_nearest;
