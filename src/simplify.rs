//! Two-pass one-sided corner removal (§4.10), grounded in `simplify.hpp`.
//! Corners below `tolerance` (by twice their triangle area) are removed
//! smallest-first, one side at a time (eroding corners, then dilating
//! corners, or the reverse for `--raw`'s rawer opposite), vetoed whenever
//! removing one would make the ring cross itself.
//!
//! The reference keeps an incrementally-updated multiset and R-tree so each
//! removal only touches its immediate neighbors; this crate instead rescans
//! all corners and rebuilds [`SegmentIndex`] after every accepted removal.
//! Simpler to get right without a compiler, and the core selection rule —
//! smallest eligible corner first, vetoed on self-intersection — is
//! unchanged.

use crate::polygon::Polygons;
use crate::ring::Ring;
use crate::rtree::SegmentIndex;

/// `corner.cross()`'s sign tells us which side of the boundary a corner
/// bulges toward; `erode` selects which sign is eligible this pass.
fn corner_cross(ring: &Ring, i: usize) -> f64 {
    let (v0, v1, v2) = ring.corner(i);
    (v1 - v0).cross(v2 - v1)
}

fn flat_rings(polygons: &Polygons) -> Vec<Ring> {
    let mut rings = Vec::new();
    for polygon in polygons {
        rings.push(polygon.exterior.clone());
        rings.extend(polygon.holes.iter().cloned());
    }
    rings
}

fn write_back(polygons: &mut Polygons, rings: Vec<Ring>) {
    let mut iter = rings.into_iter();
    for polygon in polygons.iter_mut() {
        polygon.exterior = iter.next().expect("ring count unchanged by simplify");
        for hole in polygon.holes.iter_mut() {
            *hole = iter.next().expect("ring count unchanged by simplify");
        }
    }
}

/// Remove one side's worth of eligible corners (`erode` picks eroding vs.
/// dilating corners) below `tolerance`, smallest first. Shared with
/// [`crate::smooth`], which runs a pass of this before rounding corners.
pub(crate) fn simplify_polygons_one_sided(rings: &mut Vec<Ring>, tolerance: f64, erode: bool) {
    loop {
        let index = SegmentIndex::build(rings);
        let mut best: Option<(usize, usize, f64)> = None;
        for (r, ring) in rings.iter().enumerate() {
            if ring.len() <= 4 {
                continue;
            }
            for i in 0..ring.len() {
                let cross = corner_cross(ring, i);
                if erode == (cross < 0.0) {
                    continue;
                }
                let area = cross.abs();
                if area >= tolerance {
                    continue;
                }
                if best.is_none_or(|(_, _, best_area)| area < best_area) {
                    let (prev, _, next) = ring.corner(i);
                    if !index.crosses(prev, next, &[(r, (i + ring.len() - 1) % ring.len()), (r, i)]) {
                        best = Some((r, i, area));
                    }
                }
            }
        }
        let Some((r, i, _)) = best else { break };
        let ring = &mut rings[r];
        ring.0.remove(i);
    }
}

/// Simplify every ring in `polygons`: erode then dilate (or the reverse,
/// for `--raw`'s opposite-handedness output), vetoing any removal that
/// would create a self-intersection.
pub fn simplify(polygons: &mut Polygons, tolerance: f64, open: bool) {
    let mut rings = flat_rings(polygons);
    if open {
        simplify_polygons_one_sided(&mut rings, tolerance, false);
        simplify_polygons_one_sided(&mut rings, tolerance, true);
    } else {
        simplify_polygons_one_sided(&mut rings, tolerance, true);
        simplify_polygons_one_sided(&mut rings, tolerance, false);
    }
    write_back(polygons, rings);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vertex;

    #[test]
    fn removes_a_small_notch() {
        // a square with a tiny eroding notch cut into one edge.
        let ring = Ring(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(5.0, 0.0),
            Vertex::new(5.0, 0.1),
            Vertex::new(6.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(0.0, 10.0),
        ]);
        let mut rings = vec![ring];
        simplify_polygons_one_sided(&mut rings, 1.0, false);
        assert_eq!(rings[0].len(), 6);
        assert!(!rings[0].0.contains(&Vertex::new(5.0, 0.1)));
    }
}
