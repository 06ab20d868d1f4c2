use crate::crs::EpsgCode;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum Error {
    #[error("unsupported CRS: EPSG:{0}")]
    UnsupportedCrs(EpsgCode),
    #[error("coordinate out of projection domain: ({x}, {y})")]
    OutOfDomain { x: f64, y: f64 },
    #[error("inverse projection did not converge")]
    NonConvergence,
}
