//! Parallel divide-and-conquer Delaunay construction (§4.4, classic
//! Guibas–Stolfi). Recursion alternates splitting by x then y; the merge
//! step finds the lower common tangent between the two sub-triangulations'
//! convex hulls, then zippers upward, deleting any edge whose opposite
//! triangle fails the in-circle test.
//!
//! Each recursive call builds its own freestanding [`Mesh`] over a locally
//! renumbered copy of its vertex subset, so the two halves share no mutable
//! state at all and `rayon::join` is trivially sound — no raw pointers, no
//! index-range bookkeeping. The point-store index of each local vertex is
//! carried alongside as a permutation and applied once, at the very end, to
//! translate the fully-merged local mesh back into point-store-index space.

use super::hull::convex_hull;
use super::{too_few_points, Mesh};
use crate::error::Error;
use crate::predicates::Orientation;
use crate::vector::Vertex;

/// Build the Delaunay triangulation of `vertices`; the returned `Mesh`'s
/// vertex `i` is `vertices[i]` (point-store index order is preserved).
pub fn triangulate(vertices: Vec<Vertex>) -> Result<Mesh, Error> {
    if vertices.len() < 3 {
        return Err(too_few_points());
    }
    let indices: Vec<usize> = (0..vertices.len()).collect();
    let (local_mesh, map) = recurse(&vertices, indices, true)?;

    let mut mesh = Mesh::new(vertices);
    for (a, b) in local_mesh.directed_edges() {
        mesh.connect(map[a], map[b]);
    }
    Ok(mesh)
}

const PARALLEL_THRESHOLD: usize = 512;

/// Recurse over `indices` (point-store ids, not yet renumbered). Returns a
/// mesh in *local* numbering (`0..indices.len()`) together with the
/// local-to-point-store-index map (so `map[local_id] = indices[...]`, i.e.
/// `local_mesh.vertex(i) == positions[map[i]]`).
fn recurse(positions: &[Vertex], mut indices: Vec<usize>, split_on_x: bool) -> Result<(Mesh, Vec<usize>), Error> {
    match indices.len() {
        0 | 1 => Err(too_few_points()),
        2 => {
            let mut mesh = Mesh::new(vec![positions[indices[0]], positions[indices[1]]]);
            mesh.connect(0, 1);
            Ok((mesh, indices))
        }
        3 => {
            let (a, b, c) = (positions[indices[0]], positions[indices[1]], positions[indices[2]]);
            let mut mesh = Mesh::new(vec![a, b, c]);
            if mesh.orient(0, 1, 2) == Orientation::Negative {
                indices.swap(1, 2);
                triangle(&mut mesh, 0, 2, 1);
            } else {
                triangle(&mut mesh, 0, 1, 2);
            }
            Ok((mesh, indices))
        }
        n => {
            if split_on_x {
                indices.sort_by(|&a, &b| positions[a].x.partial_cmp(&positions[b].x).unwrap());
            } else {
                indices.sort_by(|&a, &b| positions[a].y.partial_cmp(&positions[b].y).unwrap());
            }
            let mid = n / 2;
            let right_indices = indices.split_off(mid);
            let left_indices = indices;

            let (left, right) = if cfg!(feature = "multithreading") && n >= PARALLEL_THRESHOLD {
                let (l, r) = rayon::join(
                    || recurse(positions, left_indices, !split_on_x),
                    || recurse(positions, right_indices, !split_on_x),
                );
                (l?, r?)
            } else {
                let l = recurse(positions, left_indices, !split_on_x)?;
                let r = recurse(positions, right_indices, !split_on_x)?;
                (l, r)
            };

            Ok(combine(left, right))
        }
    }
}

fn triangle(mesh: &mut Mesh, a: usize, b: usize, c: usize) {
    mesh.connect(a, b);
    mesh.connect(b, c);
    mesh.connect(c, a);
}

/// Merge two local meshes (each with its own `0..len` numbering) into one,
/// offsetting the right mesh's local ids by the left mesh's length, then
/// zippering the two halves together per §4.4.
fn combine((left_mesh, left_map): (Mesh, Vec<usize>), (right_mesh, right_map): (Mesh, Vec<usize>)) -> (Mesh, Vec<usize>) {
    let offset = left_mesh.len();
    let mut vertices = left_mesh.all_vertices().to_vec();
    vertices.extend_from_slice(right_mesh.all_vertices());

    let mut mesh = Mesh::new(vertices);
    for (a, b) in left_mesh.directed_edges() {
        mesh.connect(a, b);
    }
    for (a, b) in right_mesh.directed_edges() {
        mesh.connect(a + offset, b + offset);
    }

    let left_range: Vec<usize> = (0..offset).collect();
    let right_range: Vec<usize> = (offset..mesh.len()).collect();
    zipper(&mut mesh, &left_range, &right_range);

    let mut map = left_map;
    map.extend(right_map);
    (mesh, map)
}

fn valid(mesh: &Mesh, base_l: usize, base_r: usize, candidate: Option<usize>) -> Option<usize> {
    let c = candidate?;
    if mesh.orient(base_r, base_l, c) == Orientation::Positive {
        Some(c)
    } else {
        None
    }
}

/// Find the lower common tangent between the two halves, using their
/// convex hulls (computed fresh, not derived from mesh adjacency — see
/// [`convex_hull`]). Returns `(left_endpoint, right_endpoint)`.
fn lower_tangent(mesh: &Mesh, left: &[usize], right: &[usize]) -> (usize, usize) {
    let left_hull = convex_hull(mesh.all_vertices(), left);
    let right_hull = convex_hull(mesh.all_vertices(), right);

    let mut l = left_hull
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| mesh.vertex(*a).x.partial_cmp(&mesh.vertex(*b).x).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut r = right_hull
        .iter()
        .copied()
        .enumerate()
        .min_by(|(_, a), (_, b)| mesh.vertex(*a).x.partial_cmp(&mesh.vertex(*b).x).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0);

    let prev = |i: usize, len: usize| (i + len - 1) % len;
    let next = |i: usize, len: usize| (i + 1) % len;

    let max_iters = (left_hull.len() + right_hull.len()) * 2 + 4;
    for _ in 0..max_iters {
        let mut moved = false;
        while mesh.orient(right_hull[r], left_hull[l], left_hull[prev(l, left_hull.len())]) == Orientation::Negative {
            l = prev(l, left_hull.len());
            moved = true;
        }
        while mesh.orient(left_hull[l], right_hull[r], right_hull[next(r, right_hull.len())]) == Orientation::Positive
        {
            r = next(r, right_hull.len());
            moved = true;
        }
        if !moved {
            break;
        }
    }
    (left_hull[l], right_hull[r])
}

/// Zipper the two tangent-joined halves together, deleting any candidate
/// edge whose opposite vertex fails the in-circle test, exactly as
/// described in §4.4.
fn zipper(mesh: &mut Mesh, left: &[usize], right: &[usize]) {
    let (mut l, mut r) = lower_tangent(mesh, left, right);
    mesh.connect(l, r);

    loop {
        let mut lcand = valid(mesh, l, r, mesh.next_ccw(l, r));
        while let Some(c) = lcand {
            let next = valid(mesh, l, r, mesh.next_ccw(l, c));
            match next {
                Some(n) if mesh.in_circle(r, l, c, n) == Orientation::Positive => {
                    mesh.disconnect(l, c);
                    lcand = Some(n);
                }
                _ => break,
            }
        }

        let mut rcand = valid(mesh, l, r, mesh.next_cw(r, l));
        while let Some(c) = rcand {
            let next = valid(mesh, l, r, mesh.next_cw(r, c));
            match next {
                Some(n) if mesh.in_circle(r, l, c, n) == Orientation::Positive => {
                    mesh.disconnect(r, c);
                    rcand = Some(n);
                }
                _ => break,
            }
        }

        match (lcand, rcand) {
            (None, None) => break,
            (Some(lc), None) => {
                mesh.connect(lc, r);
                l = lc;
            }
            (None, Some(rc)) => {
                mesh.connect(l, rc);
                r = rc;
            }
            (Some(lc), Some(rc)) => {
                if mesh.in_circle(r, l, lc, rc) == Orientation::Positive {
                    mesh.connect(l, rc);
                    r = rc;
                } else {
                    mesh.connect(lc, r);
                    l = lc;
                }
            }
        }
    }
}
