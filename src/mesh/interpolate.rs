//! Elevation interpolation for non-ground points (§4.5), grounded in
//! `mesh.hpp`'s `interpolate()`: triangulate the ground points alone, then
//! for every triangle of that triangulation, search an R-tree for the
//! withheld/non-ground points falling inside it and set each to the
//! triangle's barycentrically-weighted elevation.

use super::deconstruct::deconstruct;
use super::Mesh;
use crate::point::{Point, PointStore};
use crate::vector::{Bounds, Vertex};
use rstar::{RTree, AABB};

struct IndexedPoint {
    index: usize,
    vertex: Vertex,
}

impl rstar::RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.vertex.x, self.vertex.y])
    }
}

/// Signed area of `(p1, p2, point)`, doubled; used unnormalised as a
/// barycentric weight since only the ratio between the three matters.
fn barycentric_weight(p1: Vertex, p2: Vertex, point: Vertex) -> f64 {
    (p2 - p1).cross(point - p1)
}

/// Interpolate the elevation of every point in `targets` that falls inside
/// the ground triangulation `mesh`, in place. `mesh`'s vertex `i` is the
/// point at `points.get(ground_indices[i])` — the mesh is built over a
/// local renumbering of the ground subset, not the point store's own
/// indices, so that renumbering is threaded through explicitly here.
///
/// Points outside the triangulation's convex hull are left untouched (the
/// caller is expected to have already excluded any point with no hope of
/// interpolation, per §4.5's "never observed ground under a withheld point"
/// edge case).
pub fn interpolate_ground(mesh: &Mesh, ground_indices: &[usize], points: &mut PointStore, targets: &[usize]) {
    if mesh.len() < 3 || targets.is_empty() {
        return;
    }

    let tree = RTree::bulk_load(
        targets
            .iter()
            .map(|&i| IndexedPoint {
                index: i,
                vertex: points.get(i).vertex(),
            })
            .collect(),
    );

    // width = 0 classifies every triangle as "small", since the void/large
    // split only matters for the final land deconstruction pass, not here.
    let parts = deconstruct(mesh, 0.0);

    for (a, b, c) in parts.small.iter().chain(parts.large.iter()) {
        interpolate_triangle(mesh, ground_indices, points, &tree, *a, *b, *c);
    }
}

fn interpolate_triangle(
    mesh: &Mesh,
    ground_indices: &[usize],
    points: &mut PointStore,
    tree: &RTree<IndexedPoint>,
    a: usize,
    b: usize,
    c: usize,
) {
    let (va, vb, vc) = (mesh.vertex(a), mesh.vertex(b), mesh.vertex(c));
    let bounds = Bounds::from_points([&va, &vb, &vc]);
    let envelope = AABB::from_corners([bounds.xmin, bounds.ymin], [bounds.xmax, bounds.ymax]);

    let (za, zb, zc) = (
        points.get(ground_indices[a]).z,
        points.get(ground_indices[b]).z,
        points.get(ground_indices[c]).z,
    );

    for candidate in tree.locate_in_envelope_intersecting(&envelope) {
        let p = candidate.vertex;
        let w0 = barycentric_weight(vb, vc, p);
        let w1 = barycentric_weight(vc, va, p);
        let w2 = barycentric_weight(va, vb, p);
        let total = w0 + w1 + w2;
        if total == 0.0 {
            continue;
        }
        // all three weights must share the triangle's own winding sign to
        // be inside (or exactly on an edge of) the triangle.
        if (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0) || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0) {
            let z = (w0 * za + w1 * zb + w2 * zc) / total;
            let target: &mut Point = points.get_mut(candidate.index);
            target.set_ground_elevation(z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::triangulate::triangulate;

    #[test]
    fn interpolates_a_point_inside_a_single_triangle() {
        let mut store = PointStore::new();
        let g0 = store.push(Point::new(0.0, 0.0, 0.0, 2));
        let g1 = store.push(Point::new(10.0, 0.0, 0.0, 2));
        let g2 = store.push(Point::new(0.0, 10.0, 0.0, 2));
        let target = store.push(Point::new(2.0, 2.0, -1.0, 1));

        let ground_indices = vec![g0, g1, g2];
        let vertices: Vec<Vertex> = ground_indices.iter().map(|&i| store.vertex(i)).collect();
        let mesh = triangulate(vertices).unwrap();

        interpolate_ground(&mesh, &ground_indices, &mut store, &[target]);
        assert!((store.get(target).z - 0.0).abs() < 1e-9);
        assert!(store.get(target).is_ground());
    }

    #[test]
    fn leaves_points_outside_the_hull_untouched() {
        let mut store = PointStore::new();
        let g0 = store.push(Point::new(0.0, 0.0, 0.0, 2));
        let g1 = store.push(Point::new(10.0, 0.0, 5.0, 2));
        let g2 = store.push(Point::new(0.0, 10.0, 5.0, 2));
        let outside = store.push(Point::new(100.0, 100.0, -1.0, 1));

        let ground_indices = vec![g0, g1, g2];
        let vertices: Vec<Vertex> = ground_indices.iter().map(|&i| store.vertex(i)).collect();
        let mesh = triangulate(vertices).unwrap();

        interpolate_ground(&mesh, &ground_indices, &mut store, &[outside]);
        assert_eq!(store.get(outside).z, -1.0);
        assert!(!store.get(outside).is_ground());
    }
}
