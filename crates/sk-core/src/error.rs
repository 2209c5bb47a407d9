use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid volume dimensions {dims:?}: every axis must be positive")]
    InvalidDimensions { dims: [usize; 3] },
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("degenerate request: point count must be at least 1, got {point_count}")]
    DegenerateRequest { point_count: usize },
    #[error("out of bounds")]
    OutOfBounds,
}
