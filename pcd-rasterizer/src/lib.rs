mod filter;
mod rasterize;
mod visual;

pub use filter::{ClassFilter, UNWANTED_GROUND_CLASSES};
pub use rasterize::{
    rasterize, RasterOptions, ValueSelector, HIGHER_SAMPLE_ALPHA, INTENSITY_ALPHA,
    LOWER_SAMPLE_ALPHA,
};
pub use visual::normalize_visual;
