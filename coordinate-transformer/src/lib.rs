mod engine;
mod error;
mod projection;
mod transformer;

pub use engine::CoordinateEngine;
pub use error::ProjectionError;
pub use projection::{Projection, UtmProjection};
pub use projection_transform::crs::EpsgCode;
pub use transformer::PointTransformer;
