pub mod crs;
pub mod ellipsoid;
pub mod error;
pub mod etmerc;

pub use error::Error;
