mod infill;
mod mask_image;
mod triangulation;

pub use infill::{infill, InfillOptions, Infilled};
pub use mask_image::{load_mask, mask_from_image, ChannelOrder};
pub use triangulation::{interpolate_lattice, Sample};
