//! Ring densification (§4.12, supplemented): insert evenly-spaced
//! intermediate vertices along any edge longer than a maximum separation,
//! grounded in `densify.hpp`. Not part of the distilled pipeline but present
//! in the original implementation's supporting utilities; opt-in, and run
//! after smoothing with no cross-ring state.

use crate::polygon::Polygons;
use crate::ring::Ring;

fn densify_ring(ring: &Ring, separation: f64) -> Ring {
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (v0, v1, _) = ring.corner(i);
        let segments = ((v1 - v0).norm() / separation).ceil() as i64;
        let segments = segments.max(1);
        for step in 1..segments {
            let t = step as f64 / segments as f64;
            out.push(v0 + (v1 - v0) * t);
        }
        out.push(v1);
    }
    Ring(out)
}

/// Densify every ring of every polygon in place.
pub fn densify(polygons: &mut Polygons, separation: f64) {
    for polygon in polygons.iter_mut() {
        polygon.exterior = densify_ring(&polygon.exterior, separation);
        for hole in polygon.holes.iter_mut() {
            *hole = densify_ring(hole, separation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vertex;

    #[test]
    fn inserts_points_along_a_long_edge() {
        let ring = Ring(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(0.0, 10.0),
        ]);
        let densified = densify_ring(&ring, 3.0);
        assert!(densified.len() > ring.len());
        assert_eq!(densified.0[0], Vertex::new(0.0, 0.0));
    }

    #[test]
    fn leaves_short_edges_untouched() {
        let ring = Ring(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0), Vertex::new(1.0, 1.0)]);
        let densified = densify_ring(&ring, 5.0);
        assert_eq!(densified.len(), ring.len());
    }
}
