use std::fmt;

use gridwise_core::Point;

/// Errors reported by graph configuration and path queries.
///
/// An unreachable goal is not an error: it is reported as an empty
/// [`Path`](crate::Path).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathError {
    /// A custom diagonal weight below `1.0` (or NaN) was supplied.
    InvalidDiagonalWeight(f32),
    /// The start or goal of a query is blocked or out of bounds.
    NotWalkable(Point),
    /// A multi-target query received a non-positive target weight.
    InvalidTargetWeight(f32),
    /// The visitor callback stopped the search.
    Aborted,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDiagonalWeight(w) => write!(
                f,
                "invalid diagonal weight {w}: use a negative value to disable diagonals or a value >= 1.0"
            ),
            Self::NotWalkable(p) => write!(f, "cell {p} is blocked or out of bounds"),
            Self::InvalidTargetWeight(w) => {
                write!(f, "invalid target weight {w}, expected a positive number")
            }
            Self::Aborted => write!(f, "search aborted by visitor"),
        }
    }
}

impl std::error::Error for PathError {}
