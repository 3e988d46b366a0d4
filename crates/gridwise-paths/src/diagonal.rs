//! Diagonal movement cost settings.

use std::f32::consts::SQRT_2;

use crate::error::PathError;

/// Multiplier applied to a diagonal edge's per-cell weight.
///
/// Constructed from a raw value with [`DiagonalWeight::from_value`]:
///
/// | value | meaning |
/// |---|---|
/// | `< 0` | diagonals disabled |
/// | `1.0` | diagonal steps cost the same as orthogonal ones |
/// | `√2` | physically accurate |
/// | other `≥ 1.0` | custom multiplier |
/// | `[0, 1)` or NaN | rejected |
///
/// A multiplier close to 1 does not make the search avoid diagonals: one
/// diagonal step replaces two orthogonal ones, so values up to about 2 still
/// favour diagonal routes, and something around 15 is needed before
/// detours become orthogonal-only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagonalWeight {
    #[default]
    Disabled,
    Uniform,
    Euclidean,
    Custom(f32),
}

impl DiagonalWeight {
    /// Interpret a raw weight.
    pub fn from_value(value: f32) -> Result<Self, PathError> {
        if value.is_nan() {
            return Err(PathError::InvalidDiagonalWeight(value));
        }
        if value < 0.0 {
            return Ok(Self::Disabled);
        }
        if value < 1.0 {
            return Err(PathError::InvalidDiagonalWeight(value));
        }
        Ok(if value == 1.0 {
            Self::Uniform
        } else if value == SQRT_2 {
            Self::Euclidean
        } else {
            Self::Custom(value)
        })
    }

    /// Re-check a value built directly from a variant.
    pub fn validate(self) -> Result<Self, PathError> {
        match self {
            Self::Custom(w) => Self::from_value(w).and_then(|d| {
                if d == Self::Disabled {
                    Err(PathError::InvalidDiagonalWeight(w))
                } else {
                    Ok(d)
                }
            }),
            other => Ok(other),
        }
    }

    /// The multiplier, or `None` when diagonals are disabled.
    #[inline]
    pub fn multiplier(self) -> Option<f32> {
        match self {
            Self::Disabled => None,
            Self::Uniform => Some(1.0),
            Self::Euclidean => Some(SQRT_2),
            Self::Custom(w) => Some(w),
        }
    }

    /// The raw value; `-1.0` when disabled.
    #[inline]
    pub fn value(self) -> f32 {
        self.multiplier().unwrap_or(-1.0)
    }

    #[inline]
    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }
}

impl TryFrom<f32> for DiagonalWeight {
    type Error = PathError;

    fn try_from(value: f32) -> Result<Self, PathError> {
        Self::from_value(value)
    }
}
