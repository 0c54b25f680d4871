//! Robust geometric predicates: orientation and in-circle.
//!
//! Both predicates are three-tier (fast double estimate, error-bound filter,
//! adaptive-precision exact fallback); that machinery is provided by the
//! `robust` crate rather than hand-ported, matching the way the teacher
//! crate's `kernels::robust` module wraps the same function. This module is
//! the thin translation layer from `robust`'s signed-`f64` results to our own
//! three-way [`Orientation`].

use crate::vector::Vertex;
use robust::{incircle, orient2d, Coord};

/// The sign of a robust predicate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Negative,
    Zero,
    Positive,
}

impl Orientation {
    fn of(value: f64) -> Orientation {
        if value > 0.0 {
            Orientation::Positive
        } else if value < 0.0 {
            Orientation::Negative
        } else {
            Orientation::Zero
        }
    }
}

fn coord(v: Vertex) -> Coord<f64> {
    Coord { x: v.x, y: v.y }
}

/// Sign of the 2D cross of `(b-a)` and `(c-b)`: positive when `a,b,c` turn
/// anticlockwise, negative when clockwise, zero when collinear.
pub fn orient(a: Vertex, b: Vertex, c: Vertex) -> Orientation {
    Orientation::of(orient2d(coord(a), coord(b), coord(c)))
}

/// Sign of the 4x4 InCircle determinant for `(a,b,c,d)`. Positive means `d`
/// lies strictly inside the oriented circle through `a,b,c` (which must be
/// given in anticlockwise order for "inside" to mean geometrically inside).
pub fn in_circle(a: Vertex, b: Vertex, c: Vertex, d: Vertex) -> Orientation {
    Orientation::of(incircle(coord(a), coord(b), coord(c), coord(d)))
}

/// Convenience: is `a,b,c` wound anticlockwise?
pub fn is_anticlockwise(a: Vertex, b: Vertex, c: Vertex) -> bool {
    matches!(orient(a, b, c), Orientation::Positive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orient_detects_ccw_and_cw() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(1.0, 0.0);
        let c = Vertex::new(0.0, 1.0);
        assert_eq!(orient(a, b, c), Orientation::Positive);
        assert_eq!(orient(a, c, b), Orientation::Negative);
    }

    #[test]
    fn orient_detects_collinear() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(1.0, 1.0);
        let c = Vertex::new(2.0, 2.0);
        assert_eq!(orient(a, b, c), Orientation::Zero);
    }

    #[test]
    fn in_circle_detects_point_on_unit_circle() {
        let a = Vertex::new(1.0, 0.0);
        let b = Vertex::new(0.0, 1.0);
        let c = Vertex::new(-1.0, 0.0);
        let on_circle = Vertex::new(0.0, -1.0);
        let inside = Vertex::new(0.0, 0.0);
        let outside = Vertex::new(0.0, -2.0);
        assert_eq!(in_circle(a, b, c, on_circle), Orientation::Zero);
        assert_eq!(in_circle(a, b, c, inside), Orientation::Positive);
        assert_eq!(in_circle(a, b, c, outside), Orientation::Negative);
    }
}
