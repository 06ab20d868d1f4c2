use bitcode::{Decode, Encode};
use pcd_core::{grid::Grid, pointcloud::point::Origin};
use serde::{Deserialize, Serialize};

use crate::{placement::TreePlacement, record::GridRecord};

pub const BUNDLE_VERSION: u32 = 1;

/// Everything the packaging side needs from one run: the filled height grid,
/// the visual grid, the optional coarse background, where the grid sits in
/// the world and the trees standing on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct GridBundle {
    pub version: u32,
    pub heightmap: GridRecord,
    pub visual: GridRecord,
    pub background: Option<GridRecord>,
    pub scale: f64,
    pub background_scale: Option<f64>,
    /// Projected position of the lower-left corner of cell (0, 0).
    pub origin: Origin,
    pub projection: String,
    pub trees: Vec<TreePlacement>,
}

impl GridBundle {
    pub fn builder(heightmap: &Grid, visual: &Grid, origin: Origin, projection: impl Into<String>) -> GridBundleBuilder {
        GridBundleBuilder {
            heightmap: GridRecord::from_grid(heightmap),
            visual: GridRecord::from_grid(visual),
            background: None,
            scale: heightmap.scale(),
            origin,
            projection: projection.into(),
            trees: Vec::new(),
        }
    }
}

pub struct GridBundleBuilder {
    heightmap: GridRecord,
    visual: GridRecord,
    background: Option<GridRecord>,
    scale: f64,
    origin: Origin,
    projection: String,
    trees: Vec<TreePlacement>,
}

impl GridBundleBuilder {
    pub fn background(mut self, background: &Grid) -> Self {
        self.background = Some(GridRecord::from_grid(background));
        self
    }

    pub fn trees(mut self, trees: Vec<TreePlacement>) -> Self {
        self.trees = trees;
        self
    }

    pub fn build(self) -> GridBundle {
        GridBundle {
            version: BUNDLE_VERSION,
            background_scale: self.background.as_ref().map(|b| b.scale),
            heightmap: self.heightmap,
            visual: self.visual,
            background: self.background,
            scale: self.scale,
            origin: self.origin,
            projection: self.projection,
            trees: self.trees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_scales() {
        let height = Grid::filled(4, 4, 2.0, 1.0);
        let visual = Grid::filled(4, 4, 2.0, 0.5);
        let bare = GridBundle::builder(&height, &visual, Origin::new(1.0, 2.0), "EPSG:32654").build();
        assert_eq!(bare.version, BUNDLE_VERSION);
        assert_eq!(bare.scale, 2.0);
        assert!(bare.background.is_none());
        assert!(bare.background_scale.is_none());
        assert!(bare.trees.is_empty());

        let background = Grid::filled(2, 2, 6.0, 1.0);
        let full = GridBundle::builder(&height, &visual, Origin::new(1.0, 2.0), "EPSG:32654")
            .background(&background)
            .trees(vec![TreePlacement {
                x: 1.0,
                z: 2.0,
                radius: 3.0,
                height: 9.0,
            }])
            .build();
        assert_eq!(full.background_scale, Some(6.0));
        assert_eq!(full.trees.len(), 1);
        assert_eq!(full.projection, "EPSG:32654");
    }
}
