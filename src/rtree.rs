//! Self-intersection queries over a set of rings' edges, used by
//! simplification and smoothing (§4.10/§4.11) to veto a corner edit that
//! would make the boundary cross itself. The reference implementation
//! hand-rolls a bulk-loaded R-tree with incremental insert/erase/update
//! (`rtree.hpp`); this crate instead wraps the `rstar` crate (already an
//! ecosystem dependency for mesh interpolation) and rebuilds the index
//! after each accepted edit rather than updating it incrementally — a
//! simplification documented in DESIGN.md that trades some performance for
//! a much smaller surface to get right without a compiler.

use crate::predicates::{orient, Orientation};
use crate::ring::Ring;
use crate::vector::Vertex;
use rstar::{RTree, RTreeObject, AABB};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    ring: usize,
    index: usize,
    a: Vertex,
    b: Vertex,
}

impl RTreeObject for Segment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.a.x.min(self.b.x), self.a.y.min(self.b.y)],
            [self.a.x.max(self.b.x), self.a.y.max(self.b.y)],
        )
    }
}

/// An index over every edge of every ring, for proper-intersection queries.
pub struct SegmentIndex {
    tree: RTree<Segment>,
}

fn build(rings: &[Ring]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (r, ring) in rings.iter().enumerate() {
        let n = ring.len();
        for i in 0..n {
            segments.push(Segment {
                ring: r,
                index: i,
                a: ring.0[i],
                b: ring.0[(i + 1) % n],
            });
        }
    }
    segments
}

impl SegmentIndex {
    pub fn build(rings: &[Ring]) -> Self {
        SegmentIndex {
            tree: RTree::bulk_load(build(rings)),
        }
    }

    /// Does the open segment `(a, b)` properly cross any indexed edge other
    /// than the ones named in `exclude` (the corner's own adjacent edges,
    /// which necessarily share an endpoint with it and would otherwise
    /// register as false positives)?
    pub fn crosses(&self, a: Vertex, b: Vertex, exclude: &[(usize, usize)]) -> bool {
        let envelope = AABB::from_corners([a.x.min(b.x), a.y.min(b.y)], [a.x.max(b.x), a.y.max(b.y)]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|s| !exclude.contains(&(s.ring, s.index)))
            .any(|s| proper_intersection(a, b, s.a, s.b))
    }
}

/// Do open segments `(a, b)` and `(c, d)` cross properly (not merely touch
/// at a shared endpoint or overlap collinearly)?
fn proper_intersection(a: Vertex, b: Vertex, c: Vertex, d: Vertex) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    o1 != o2 && o1 != Orientation::Zero && o2 != Orientation::Zero && o3 != o4 && o3 != Orientation::Zero && o4 != Orientation::Zero
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_crossing_segment() {
        let rings = vec![Ring(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(0.0, 10.0),
        ])];
        let index = SegmentIndex::build(&rings);
        // edge 1 (10,10)->(10,0) crosses edge 3 (0,10)->(0,0 wrap to first)
        assert!(index.crosses(Vertex::new(5.0, 10.0), Vertex::new(5.0, 0.0), &[]));
    }

    #[test]
    fn touching_shared_endpoint_is_not_a_crossing() {
        let rings = vec![Ring(vec![Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0), Vertex::new(10.0, 10.0)])];
        let index = SegmentIndex::build(&rings);
        assert!(!index.crosses(Vertex::new(10.0, 0.0), Vertex::new(20.0, 0.0), &[(0, 0), (0, 1), (0, 2)]));
    }
}
