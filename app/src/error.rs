use std::error::Error;

use thiserror::Error;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no input files")]
    NoInput,
    #[error("invalid input: {0}")]
    Input(String),
    #[error("failed to parse point cloud: {0}")]
    Parse(BoxError),
    #[error("failed to load mask: {0}")]
    Mask(BoxError),
    #[error("failed to export: {0}")]
    Export(BoxError),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] pcd_core::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
