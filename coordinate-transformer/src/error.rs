use projection_transform::crs::EpsgCode;

#[derive(Debug)]
pub struct ProjectionError {
    pub epsg: EpsgCode,
    pub context: &'static str,
    pub source: projection_transform::Error,
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{} {}: {}", self.epsg, self.context, self.source)
    }
}

impl std::error::Error for ProjectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<ProjectionError> for pcd_core::Error {
    fn from(err: ProjectionError) -> Self {
        pcd_core::Error::Projection(err.to_string())
    }
}
