//! Convex hull of a point subset, used only to seed the lower/upper tangent
//! search in the Delaunay merge step (§4.4). Computed independently of mesh
//! adjacency via the standard monotone-chain construction (in the style of
//! the teacher crate's `convex_hull` module), returning indices in
//! anticlockwise order.

use crate::predicates::{orient, Orientation};
use crate::vector::Vertex;

/// Compute the convex hull of `indices` (indexing into `vertices`),
/// returned as indices in anticlockwise order starting from the
/// lowest-then-leftmost point. Assumes at least one point; degenerate
/// (collinear or single-point) inputs return all distinct extreme points.
pub fn convex_hull(vertices: &[Vertex], indices: &[usize]) -> Vec<usize> {
    let mut sorted: Vec<usize> = indices.to_vec();
    sorted.sort_by(|&a, &b| {
        vertices[a]
            .x
            .partial_cmp(&vertices[b].x)
            .unwrap()
            .then(vertices[a].y.partial_cmp(&vertices[b].y).unwrap())
    });
    sorted.dedup_by(|&mut a, &mut b| vertices[a] == vertices[b]);

    if sorted.len() <= 2 {
        return sorted;
    }

    let turn = |a: usize, b: usize, c: usize| orient(vertices[a], vertices[b], vertices[c]);

    let build = |points: &[usize]| -> Vec<usize> {
        let mut chain: Vec<usize> = Vec::with_capacity(points.len());
        for &p in points {
            while chain.len() >= 2
                && turn(chain[chain.len() - 2], chain[chain.len() - 1], p) != Orientation::Positive
            {
                chain.pop();
            }
            chain.push(p);
        }
        chain
    };

    let mut lower = build(&sorted);
    let mut upper_input = sorted.clone();
    upper_input.reverse();
    let upper = build(&upper_input);

    lower.pop();
    let mut upper = upper;
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_of_square_with_interior_point() {
        let vertices = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(0.0, 10.0),
            Vertex::new(5.0, 5.0),
        ];
        let hull = convex_hull(&vertices, &[0, 1, 2, 3, 4]);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&4));
    }

    #[test]
    fn hull_of_two_points() {
        let vertices = vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)];
        let hull = convex_hull(&vertices, &[0, 1]);
        assert_eq!(hull.len(), 2);
    }
}
