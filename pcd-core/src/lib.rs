pub mod error;
pub mod grid;
pub mod pointcloud;
pub mod progress;
pub mod tree;

pub use error::{Error, Result};
