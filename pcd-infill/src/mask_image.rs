use std::path::Path;

use image::RgbImage;
use pcd_core::{grid::mask::PaintMask, Result};

/// Order in which the three channels are handed to the mask thresholds.
/// Annotation tools that store blue first (`Bgr`) put red paint into the
/// EXCLUDE range and blue paint into the PRESERVE range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    Rgb,
    #[default]
    Bgr,
}

/// Decodes an annotation image into per-cell policy bits. Image rows run top
/// to bottom, so `flip_rows` aligns them with grid rows.
pub fn mask_from_image(image: &RgbImage, order: ChannelOrder, flip_rows: bool) -> Result<PaintMask> {
    let rows = image.height() as usize;
    let cols = image.width() as usize;
    match order {
        ChannelOrder::Rgb => PaintMask::from_channels(rows, cols, image.as_raw(), flip_rows),
        ChannelOrder::Bgr => {
            let swapped: Vec<u8> = image
                .pixels()
                .flat_map(|p| [p.0[2], p.0[1], p.0[0]])
                .collect();
            PaintMask::from_channels(rows, cols, &swapped, flip_rows)
        }
    }
}

pub fn load_mask(
    path: &Path,
    order: ChannelOrder,
    flip_rows: bool,
) -> std::result::Result<PaintMask, Box<dyn std::error::Error + Send + Sync>> {
    let image = image::open(path)?.to_rgb8();
    log::debug!("loaded {}x{} mask from {:?}", image.width(), image.height(), path);
    Ok(mask_from_image(&image, order, flip_rows)?)
}
