#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum Error {
    #[error("{0} is not configured")]
    Unconfigured(&'static str),
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
    #[error("shape mismatch: {what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("projection error: {0}")]
    Projection(String),
}

impl From<projection_transform::Error> for Error {
    fn from(err: projection_transform::Error) -> Self {
        Error::Projection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
