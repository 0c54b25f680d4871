//! Tearing a finished triangulation apart into its constituent triangles
//! plus its exterior boundary (§4.6), grounded in `mesh.hpp`'s
//! `deconstruct()`. The reference walks separate `exterior_clockwise`/
//! `exterior_anticlockwise` and `next_interior` iterators over a shared
//! mesh-and-points representation; this crate's angle-sorted adjacency
//! makes both kinds of face the same operation: starting from any
//! unconsumed directed edge `a -> b`, repeatedly rotating clockwise around
//! the arrival vertex traces the whole face lying to `a -> b`'s left,
//! whether that face closes into a triangle or turns out to be the single
//! unbounded face wrapping the hull. A closed face of length 3 wound
//! anticlockwise is a real triangle; anything else (a longer cycle, or a
//! 3-cycle wound clockwise, which happens when the hull itself is a
//! triangle) is the hull, recorded in reverse so it reads anticlockwise
//! with the mesh's interior on its left.

use super::Mesh;
use crate::predicates::Orientation;
use crate::vector::Vertex;

/// Triangles whose edge-length product dwarfs twice their area by more than
/// this factor are treated as spanning a real void in the point cloud
/// (`mesh.hpp`'s `Triangle > width` test) rather than a genuine facet; the
/// epsilon below guards the borderline case where a triangle is only
/// infinitesimally large, which should still count as small to avoid
/// flapping between runs that differ only in floating-point rounding.
pub const LARGE_TRIANGLE_TEST_EPS: f64 = 1e-9;

/// A triangulation torn into its small (real) faces and large (void) faces,
/// plus the directed edges of its exterior boundary.
#[derive(Debug, Clone, Default)]
pub struct Deconstructed {
    /// Point-store index triples, each wound anticlockwise.
    pub small: Vec<(usize, usize, usize)>,
    pub large: Vec<(usize, usize, usize)>,
    /// Directed edges of the outer boundary, wound anticlockwise (interior
    /// of the mesh on the left of each edge).
    pub hull: Vec<(usize, usize)>,
}

fn edge_length(mesh: &Mesh, a: usize, b: usize) -> f64 {
    (mesh.vertex(b) - mesh.vertex(a)).norm()
}

/// `mesh.hpp`'s `Triangle > width`: the triangle is "large" (spans a void)
/// when the product of its three edge lengths exceeds twice its area times
/// `width`.
fn is_large(mesh: &Mesh, (a, b, c): (usize, usize, usize), width: f64) -> bool {
    let d0 = mesh.vertex(b) - mesh.vertex(a);
    let d1 = mesh.vertex(c) - mesh.vertex(b);
    let d2 = mesh.vertex(a) - mesh.vertex(c);
    let lengths = d0.norm() * d1.norm() * d2.norm();
    lengths > (d0.cross(d1).abs() * width + LARGE_TRIANGLE_TEST_EPS)
}

/// Tear `mesh` apart into triangles and a boundary, classifying each
/// triangle as small or large against `width` (the minimum void-triangle
/// edge length, i.e. `--width`). Every edge is consumed exactly once: the
/// boundary takes the single-sided hull edges, and the rest pair off into
/// triangles.
pub fn deconstruct(mesh: &Mesh, width: f64) -> Deconstructed {
    let mut result = Deconstructed::default();
    let mut consumed: Vec<Vec<bool>> = mesh
        .all_vertices()
        .iter()
        .enumerate()
        .map(|(i, _)| vec![false; mesh.neighbors(i).len()])
        .collect();

    let edge_index = |a: usize, b: usize| mesh.neighbors(a).iter().position(|&n| n == b).unwrap();

    for a in 0..mesh.len() {
        let neighbors = mesh.neighbors(a).to_vec();
        for &b in &neighbors {
            let ai = edge_index(a, b);
            if consumed[a][ai] {
                continue;
            }

            // trace the whole face to the left of a -> b by rotating
            // clockwise around each arrival vertex until the walk closes
            // back on the starting directed edge.
            let mut face = vec![(a, b)];
            let (mut p, mut q) = (a, b);
            loop {
                let r = mesh.next_cw(q, p).expect("arrival vertex of a live edge has neighbors");
                if (q, r) == (a, b) {
                    break;
                }
                face.push((q, r));
                p = q;
                q = r;
            }

            for &(p, q) in &face {
                consumed[p][edge_index(p, q)] = true;
            }

            let is_triangle = face.len() == 3 && mesh.orient(face[0].0, face[1].0, face[2].0) == Orientation::Positive;
            if is_triangle {
                let triangle = (face[0].0, face[1].0, face[2].0);
                if is_large(mesh, triangle, width) {
                    result.large.push(triangle);
                } else {
                    result.small.push(triangle);
                }
            } else {
                // the unbounded face: traced clockwise, so its reverse reads
                // anticlockwise with the mesh's interior on the left.
                for &(p, q) in &face {
                    result.hull.push((q, p));
                }
            }
        }
    }

    result
}

/// Sum of the three edge lengths of every small triangle touching `vertex`,
/// used by elevation interpolation's local-density heuristic (kept for
/// parity with the reference's per-vertex bookkeeping, §4.5).
pub fn local_scale(mesh: &Mesh, vertex: usize) -> f64 {
    mesh.neighbors(vertex)
        .iter()
        .map(|&n| edge_length(mesh, vertex, n))
        .sum::<f64>()
        / mesh.neighbors(vertex).len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::triangulate::triangulate;

    #[test]
    fn deconstructs_a_single_triangle() {
        let vertices = vec![Vertex::new(0.0, 0.0), Vertex::new(4.0, 0.0), Vertex::new(0.0, 4.0)];
        let mesh = triangulate(vertices).unwrap();
        let parts = deconstruct(&mesh, 1000.0);
        assert_eq!(parts.small.len() + parts.large.len(), 1);
        assert_eq!(parts.hull.len(), 3);
    }

    #[test]
    fn a_long_thin_triangle_is_classified_large() {
        let vertices = vec![Vertex::new(0.0, 0.0), Vertex::new(1000.0, 0.0), Vertex::new(500.0, 0.1)];
        let mesh = triangulate(vertices).unwrap();
        let parts = deconstruct(&mesh, 1.0);
        assert_eq!(parts.large.len(), 1);
        assert!(parts.small.is_empty());
    }

    #[test]
    fn every_edge_is_consumed_exactly_once() {
        let vertices = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(4.0, 0.0),
            Vertex::new(4.0, 4.0),
            Vertex::new(0.0, 4.0),
            Vertex::new(2.0, 2.0),
        ];
        let mesh = triangulate(vertices).unwrap();
        let parts = deconstruct(&mesh, 1000.0);
        let faces = parts.small.len() + parts.large.len();
        assert_eq!(faces * 3 + parts.hull.len(), mesh.edge_count() * 2);
    }
}
