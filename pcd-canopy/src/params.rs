use serde::{Deserialize, Serialize};

pub const DEFAULT_ESTIMATED_TREE_SIZE: usize = 5;
pub const DEFAULT_MINIMUM_TREE_DISTANCE: usize = 2;
pub const DEFAULT_MINIMUM_TREE_HEIGHT: f64 = 3.5;
pub const DEFAULT_MAXIMUM_TREE_HEIGHT: f64 = 40.0;
pub const DEFAULT_HEIGHT_WINDOW: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ThresholdMethod {
    /// Global Otsu threshold on the 8-bit surface.
    Otsu,
    /// Pixel is canopy when above the mean of its `block_size` window minus
    /// `offset`, and above zero.
    Adaptive { block_size: usize, offset: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeDetectorParams {
    /// Blur kernel size in pixels; larger values keep big crowns from splitting.
    pub estimated_tree_size: usize,
    /// Minimum distance in pixels between crown seeds.
    pub minimum_tree_distance: usize,
    pub minimum_tree_height: f64,
    /// Heights above this are treated as sensor noise.
    pub maximum_tree_height: f64,
    pub threshold: ThresholdMethod,
    /// Half-width of the window searched for a crown's height.
    pub height_window: usize,
}

impl Default for TreeDetectorParams {
    fn default() -> Self {
        Self {
            estimated_tree_size: DEFAULT_ESTIMATED_TREE_SIZE,
            minimum_tree_distance: DEFAULT_MINIMUM_TREE_DISTANCE,
            minimum_tree_height: DEFAULT_MINIMUM_TREE_HEIGHT,
            maximum_tree_height: DEFAULT_MAXIMUM_TREE_HEIGHT,
            threshold: ThresholdMethod::Otsu,
            height_window: DEFAULT_HEIGHT_WINDOW,
        }
    }
}
