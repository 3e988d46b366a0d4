//! Distance heuristics for A*.
//!
//! | Heuristic | Admissible for |
//! |---|---|
//! | [`manhattan`] | orthogonal-only movement |
//! | [`chebyshev`] | diagonal movement at uniform cost |
//! | [`octile`] | diagonal movement at cost √2 |
//! | [`euclidean`] | any diagonal weight ≥ 1 |
//! | [`euclidean_squared`] | nothing; cheaper but breaks optimality |

use std::f32::consts::SQRT_2;

use gridwise_core::Point;

/// Signature of the heuristics in this module. [`Pathfinder`](crate::Pathfinder)
/// also takes capturing closures of the same shape.
pub type Heuristic = fn(Point, Point) -> f32;

#[inline]
fn deltas(a: Point, b: Point) -> (f32, f32) {
    ((a.x - b.x).abs() as f32, (a.y - b.y).abs() as f32)
}

/// Manhattan (L1) distance.
#[inline]
pub fn manhattan(a: Point, b: Point) -> f32 {
    let (dx, dy) = deltas(a, b);
    dx + dy
}

/// Chebyshev (L∞) distance.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> f32 {
    let (dx, dy) = deltas(a, b);
    dx.max(dy)
}

/// Octile distance: diagonal steps cost √2, straight steps 1.
#[inline]
pub fn octile(a: Point, b: Point) -> f32 {
    let (dx, dy) = deltas(a, b);
    dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
}

/// Euclidean (L2) distance.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f32 {
    euclidean_squared(a, b).sqrt()
}

/// Squared Euclidean distance. Overestimates, so paths may be suboptimal.
#[inline]
pub fn euclidean_squared(a: Point, b: Point) -> f32 {
    let (dx, dy) = deltas(a, b);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let a = Point::new(1, 1);
        let b = Point::new(4, 5);
        assert_eq!(manhattan(a, b), 7.0);
        assert_eq!(chebyshev(a, b), 4.0);
        assert_eq!(euclidean(a, b), 5.0);
        assert_eq!(euclidean_squared(a, b), 25.0);
        assert!((octile(a, b) - (4.0 + 3.0 * (SQRT_2 - 1.0))).abs() < 1e-6);
    }

    #[test]
    fn symmetric_and_zero_on_identity() {
        let hs: [Heuristic; 5] = [manhattan, chebyshev, octile, euclidean, euclidean_squared];
        let a = Point::new(-3, 7);
        let b = Point::new(2, -1);
        for h in hs {
            assert_eq!(h(a, a), 0.0);
            assert_eq!(h(a, b), h(b, a));
        }
    }
}
