use std::{fs::File, io::BufReader, path::Path};

use coordinate_transformer::EpsgCode;
use pcd_canopy::TreeDetectorParams;
use pcd_core::grid::selection::Selection;
use pcd_rasterizer::ClassFilter;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const DEFAULT_LIDAR_TREES: bool = true;
pub const DEFAULT_FLIP_MASK_ROWS: bool = true;

/// Settings read from the `--config` JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Preserved cells take the interpolated value.
    pub fill_preserved: bool,
    /// Preserved cells are cleared.
    pub purge_preserved: bool,
    /// Detect trees on the object surface.
    pub lidar_trees: bool,
    /// Classes used for the ground surface.
    pub ground_filter: ClassFilter,
    pub tree_detector: TreeDetectorParams,
    /// Crop window applied to every grid before infilling.
    pub selection: Option<Selection>,
    /// Projected CRS of the output; defaults to the input CRS.
    pub target_epsg: Option<EpsgCode>,
    pub flip_mask_rows: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fill_preserved: false,
            purge_preserved: false,
            lidar_trees: DEFAULT_LIDAR_TREES,
            ground_filter: ClassFilter::ground(),
            tree_detector: TreeDetectorParams::default(),
            selection: None,
            target_epsg: None,
            flip_mask_rows: DEFAULT_FLIP_MASK_ROWS,
        }
    }
}

impl PipelineOptions {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use pcd_canopy::ThresholdMethod;

    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: PipelineOptions = serde_json::from_str(r#"{"fill_preserved": true}"#).unwrap();
        assert!(options.fill_preserved);
        assert!(options.lidar_trees);
        assert_eq!(options.ground_filter, ClassFilter::ground());
        assert_eq!(options.tree_detector, TreeDetectorParams::default());
    }

    #[test]
    fn nested_sections_are_read() {
        let json = r#"{
            "lidar_trees": false,
            "ground_filter": {"type": "only", "classes": [2]},
            "tree_detector": {"minimum_tree_distance": 4, "threshold": {"type": "adaptive", "block_size": 11, "offset": 2.0}},
            "selection": {"lower_row": 1, "lower_col": 2, "upper_row": 10, "upper_col": 20},
            "target_epsg": 32654
        }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let options = PipelineOptions::load(file.path()).unwrap();
        assert!(!options.lidar_trees);
        assert_eq!(options.ground_filter, ClassFilter::Only(vec![2]));
        assert_eq!(options.tree_detector.minimum_tree_distance, 4);
        assert_eq!(options.tree_detector.estimated_tree_size, 5);
        assert_eq!(
            options.tree_detector.threshold,
            ThresholdMethod::Adaptive {
                block_size: 11,
                offset: 2.0
            }
        );
        assert_eq!(options.selection, Some(Selection::new(1, 2, 10, 20)));
        assert_eq!(options.target_epsg, Some(32654));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"lidar_trees\": 3").unwrap();
        assert!(matches!(PipelineOptions::load(file.path()), Err(PipelineError::Config(_))));
    }
}
