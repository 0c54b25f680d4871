//! The land/water boundary as a set of directed edges, plus the `is_water`
//! heuristic that decides whether a void-spanning triangle group should be
//! cut out of the land boundary. Grounded in `edges.hpp` and
//! `multipolygon.hpp` (the two are textually identical; this crate treats
//! `multipolygon.hpp`'s composition — `MultiPolygon` built from `Edges` plus
//! `Simplify`/`Smooth`/`Densify` mixins — as canonical, see DESIGN.md).

use crate::point::PointStore;
use crate::triangle::Triangle;
use crate::vector::{Summation, Vector3};
use std::collections::HashSet;

/// A directed point-store-index edge. The boundary winds so that land lies
/// to the left of each edge (anticlockwise around an exterior ring).
pub type Edges = HashSet<(usize, usize)>;

/// Toggle a triangle's three edges into `edges`: each edge already present
/// (in the same direction) is removed; otherwise its reverse is inserted.
/// This is how a void triangle gets "cut out" of the land boundary, or how
/// the initial exterior hull and a water region cancel where they meet.
pub fn toggle_triangle(edges: &mut Edges, (a, b, c): Triangle) {
    for edge in [(a, b), (b, c), (c, a)] {
        if !edges.remove(&edge) {
            edges.insert((edge.1, edge.0));
        }
    }
}

/// Does any edge of `triangles` already appear in `edges`? Used to decide
/// whether a void component touches the existing boundary and so must be
/// folded in regardless of its own water classification.
pub fn touches(edges: &Edges, triangles: &[Triangle]) -> bool {
    triangles.iter().any(|&(a, b, c)| {
        [(a, b), (b, c), (c, a)]
            .iter()
            .any(|e| edges.contains(e) || edges.contains(&(e.1, e.0)))
    })
}

fn point_vector3(points: &PointStore, index: usize) -> Vector3 {
    let p = points.get(index);
    Vector3::new(p.x, p.y, p.z)
}

/// Classify a connected group of void triangles as water: low relative
/// elevation change (`delta`) across ground-classified corners, and a
/// triangle-normal close enough to vertical (within `slope`) once withheld
/// points are folded in as a vertical-normal proxy. Matches
/// `multipolygon.hpp`'s `is_water`.
pub fn is_water(triangles: &[Triangle], points: &PointStore, delta: f64, slope: f64) -> bool {
    let mut perp_sum = Vector3::new(0.0, 0.0, 0.0);
    let mut perp_x = Summation::new();
    let mut perp_y = Summation::new();
    let mut perp_z = Summation::new();

    let mut delta_sum = Summation::new();
    let mut delta_count: u64 = 0;

    for &(a, b, c) in triangles {
        // rotate so edge0 is the shortest, matching the reference's choice
        // of "base" edge for the perpendicular (normal) computation.
        let edges = [(a, b), (b, c), (c, a)];
        let lengths = edges.map(|(u, v)| (points.get(v).vertex() - points.get(u).vertex()).sqnorm());
        let shortest = (0..3).min_by(|&i, &j| lengths[i].partial_cmp(&lengths[j]).unwrap()).unwrap();
        let rotated = [edges[shortest], edges[(shortest + 1) % 3], edges[(shortest + 2) % 3]];

        let d1 = point_vector3(points, rotated[1].1) - point_vector3(points, rotated[1].0);
        let d2 = point_vector3(points, rotated[2].1) - point_vector3(points, rotated[2].0);
        let perp = d1.cross(d2);

        let p0 = points.get(rotated[0].0);
        let p1 = points.get(rotated[1].0);
        let p2 = points.get(rotated[2].0);

        if p0.withheld || p1.withheld || p2.withheld {
            perp_z.add(perp.norm());
            delta_count += 2;
        } else if p0.is_ground() && p1.is_ground() && p2.is_ground() {
            perp_x.add(perp.x);
            perp_y.add(perp.y);
            perp_z.add(perp.z);
            delta_sum.add((p1.z - p2.z).abs());
            delta_sum.add((p2.z - p0.z).abs());
            delta_count += 2;
        }
    }

    perp_sum.x = perp_x.value();
    perp_sum.y = perp_y.value();
    perp_sum.z = perp_z.value();

    delta_count > 0
        && delta_sum.value() < delta * delta_count as f64
        && perp_sum.z.abs() / perp_sum.norm() > slope.cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;

    #[test]
    fn toggle_cancels_matching_direction_and_inserts_reverse_otherwise() {
        let mut edges: Edges = HashSet::new();
        edges.insert((0, 1));
        toggle_triangle(&mut edges, (0, 1, 2));
        assert!(!edges.contains(&(0, 1)));
        assert!(edges.contains(&(1, 2)));
        assert!(edges.contains(&(2, 0)));
    }

    #[test]
    fn a_flat_low_slope_ground_triangle_is_water() {
        let mut store = PointStore::new();
        let a = store.push(Point::new(0.0, 0.0, 1.0, 2));
        let b = store.push(Point::new(10.0, 0.0, 1.0, 2));
        let c = store.push(Point::new(0.0, 10.0, 1.0, 2));
        assert!(is_water(&[(a, b, c)], &store, 0.5, std::f64::consts::FRAC_PI_4));
    }

    #[test]
    fn a_steep_ground_triangle_is_not_water() {
        let mut store = PointStore::new();
        let a = store.push(Point::new(0.0, 0.0, 0.0, 2));
        let b = store.push(Point::new(10.0, 0.0, 50.0, 2));
        let c = store.push(Point::new(0.0, 10.0, 0.0, 2));
        assert!(!is_water(&[(a, b, c)], &store, 0.5, std::f64::consts::FRAC_PI_4));
    }
}
