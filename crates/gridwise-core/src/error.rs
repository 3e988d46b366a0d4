use std::fmt;

/// Errors raised when configuring a [`SpatialIndex`](crate::SpatialIndex).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpatialError {
    /// Cell sizes must be finite and strictly positive.
    InvalidCellSize(f32),
}

impl fmt::Display for SpatialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize(size) => {
                write!(f, "spatial index: invalid cell size {size}, expected a positive number")
            }
        }
    }
}

impl std::error::Error for SpatialError {}
