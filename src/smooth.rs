//! Rounding sharp corners (§4.11), grounded in `smooth.hpp`. Each corner is
//! replaced with two new vertices drawn in toward its neighbors (cutting
//! the corner), sharpest-angle first, accepted only when doing so doesn't
//! increase the boundary's local RMS curvature and doesn't make the ring
//! cross itself.
//!
//! As in [`crate::simplify`], the reference's incrementally-updated R-tree
//! and priority multiset are replaced here with a rescan-and-rebuild loop;
//! see DESIGN.md.

use crate::polygon::Polygons;
use crate::ring::Ring;
use crate::rtree::SegmentIndex;
use crate::simplify::simplify_polygons_one_sided;
use crate::vector::Vertex;

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
        polygon.exterior = iter.next().expect("ring count unchanged by smooth");
        for hole in polygon.holes.iter_mut() {
            *hole = iter.next().expect("ring count unchanged by smooth");
        }
    }
}

fn unit(v: Vertex) -> Vertex {
    v.normalise()
}

/// `cos(angle between consecutive edges)` at corner `i`: close to `1` means
/// nearly straight, close to `-1` means a sharp reversal.
fn cosine(ring: &Ring, i: usize) -> f64 {
    let (v0, v1, v2) = ring.corner(i);
    unit(v1 - v0).dot(unit(v2 - v1))
}

/// Would rounding corner `i` (replacing it with `new0, new1`) increase the
/// local RMS curvature relative to leaving it sharp? Compares the sum of
/// consecutive-direction cosines across the five-vertex window before and
/// after the change (`smooth.hpp`'s `increases_rms_curvature`).
fn increases_rms_curvature(ring: &Ring, i: usize, new0: Vertex, new1: Vertex) -> bool {
    let n = ring.len();
    let v0 = ring.0[(i + n - 2) % n];
    let v1 = ring.0[(i + n - 1) % n];
    let v2 = ring.0[i];
    let v3 = ring.0[(i + 1) % n];
    let v4 = ring.0[(i + 2) % n];

    let u01 = unit(v1 - v0);
    let u12 = unit(v2 - v1);
    let u23 = unit(v3 - v2);
    let u34 = unit(v4 - v3);
    let before = u01.dot(u12) + u12.dot(u23) + u23.dot(u34);

    let u1v = unit(new0 - v1);
    let uv3 = unit(v3 - new1);
    let after = u01.dot(u1v) + u1v.dot(uv3) + uv3.dot(u34);
    before - after >= 0.0
}

fn round_corner(ring: &Ring, i: usize, tolerance: f64) -> (Vertex, Vertex) {
    let (v0, v1, v2) = ring.corner(i);
    let f0 = (0.25_f64).min(tolerance / (v1 - v0).norm());
    let f2 = (0.25_f64).min(tolerance / (v2 - v1).norm());
    let new0 = v0 * f0 + v1 * (1.0 - f0);
    let new1 = v2 * f2 + v1 * (1.0 - f2);
    (new0, new1)
}

fn smooth_rings(rings: &mut Vec<Ring>, tolerance: f64, angle: f64) {
    let cosine_limit = angle.cos();
    loop {
        let index = SegmentIndex::build(rings);
        let mut best: Option<(usize, usize, f64)> = None;
        for (r, ring) in rings.iter().enumerate() {
            if ring.len() < 3 {
                continue;
            }
            for i in 0..ring.len() {
                let c = cosine(ring, i);
                if c >= cosine_limit {
                    continue;
                }
                let (new0, new1) = round_corner(ring, i, tolerance);
                if increases_rms_curvature(ring, i, new0, new1) {
                    continue;
                }
                let n = ring.len();
                let prev_edge = (r, (i + n - 1) % n);
                let next_edge = (r, i);
                if index.crosses(ring.0[(i + n - 1) % n], new0, &[prev_edge])
                    || index.crosses(new0, new1, &[prev_edge, next_edge])
                    || index.crosses(new1, ring.0[(i + 1) % n], &[next_edge])
                {
                    continue;
                }
                if best.is_none_or(|(_, _, best_c)| c < best_c) {
                    best = Some((r, i, c));
                }
            }
        }
        let Some((r, i, _)) = best else { break };
        let tol = tolerance;
        let (new0, new1) = round_corner(&rings[r], i, tol);
        rings[r].0.splice(i..i + 1, [new0, new1]);
    }
}

/// Smooth every ring in `polygons`: a one-sided simplify pass each way
/// (per `smooth.hpp`, corner-rounding alone can leave micro-notches that
/// simplification cleans up first), then iteratively round the sharpest
/// remaining corner that doesn't increase curvature or self-intersect.
pub fn smooth(polygons: &mut Polygons, tolerance: f64, angle: f64) {
    let mut rings = flat_rings(polygons);
    simplify_polygons_one_sided(&mut rings, tolerance, false);
    simplify_polygons_one_sided(&mut rings, tolerance, true);
    smooth_rings(&mut rings, tolerance, angle);
    write_back(polygons, rings);
}
