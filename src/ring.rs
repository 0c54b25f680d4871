//! Stitching directed boundary edges into closed rings (§4.8), grounded in
//! `rings.hpp`'s `Rings::load()`. At each vertex with more than one
//! outgoing edge, the next edge is chosen by turn angle from the incoming
//! edge; which turn wins depends on the pass. The first pass takes the
//! widest (anticlockwise-most) turn, self-intersection disallowed, and
//! expects every ring it closes to come out anticlockwise (OGC's exterior
//! winding). A ring that closes the wrong way means the widest-turn choice
//! walked into a self-touching pinch instead of staying on the exterior;
//! its edges are handed to a second pass that takes the tightest turn
//! instead, self-intersection permitted, and accepts whatever it gets —
//! mirroring `rings.hpp`'s `allow_self_intersection` second pass over the
//! leftover edges.
//!
//! A ring only ever needs vertex positions once it's been extracted from
//! the mesh (point-store identity — classification, withheld, elevation —
//! has already done its job by then), so, matching `ring.hpp`'s
//! `std::list<Vector<2>>`, a [`Ring`] holds plain coordinates.

use crate::edges::Edges;
use crate::point::PointStore;
use crate::predicates::{orient, Orientation};
use crate::vector::{Summation, Vertex};
use std::collections::HashMap;

/// A closed ring of vertices (the first vertex is not repeated at the end).
#[derive(Debug, Clone, PartialEq)]
pub struct Ring(pub Vec<Vertex>);

impl Ring {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Twice the signed area (positive for anticlockwise winding),
    /// Kahan-summed per §3's compensated-summation requirement.
    pub fn signed_area(&self) -> f64 {
        if self.0.len() < 3 {
            return 0.0;
        }
        let origin = self.0[0];
        let mut sum = Summation::new();
        let n = self.0.len();
        for i in 0..n {
            let v1 = self.0[i] - origin;
            let v2 = self.0[(i + 1) % n] - origin;
            sum.add(v1.cross(v2));
        }
        sum.value() * 0.5
    }

    pub fn is_anticlockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Winding-number test: is `vertex` inside this ring? Works for either
    /// winding direction; a vertex exactly on the boundary returns `false`,
    /// matching `ring.hpp`'s `operator<=>` used for hole nesting.
    pub fn contains_vertex(&self, vertex: Vertex) -> bool {
        if self.0.len() < 3 {
            return false;
        }
        let mut winding = 0i32;
        let n = self.0.len();
        for i in 0..n {
            let v1 = self.0[i];
            let v2 = self.0[(i + 1) % n];
            if v1 == vertex {
                return false;
            }
            if v1.y <= vertex.y && v2.y > vertex.y && (v2 - v1).cross(vertex - v1) > 0.0 {
                winding += 1;
            } else if v2.y <= vertex.y && v1.y > vertex.y && (v1 - v2).cross(vertex - v2) > 0.0 {
                winding -= 1;
            }
        }
        winding != 0
    }

    /// Does this ring (as an exterior) contain `other` (tested via a single
    /// vertex, since rings here never cross one another)?
    pub fn contains_ring(&self, other: &Ring) -> bool {
        other.0.first().is_some_and(|&v| self.contains_vertex(v))
    }

    /// The `(prev, this, next)` triple around corner `i`, wrapping.
    pub fn corner(&self, i: usize) -> (Vertex, Vertex, Vertex) {
        let n = self.0.len();
        (self.0[(i + n - 1) % n], self.0[i], self.0[(i + 1) % n])
    }
}

/// The comparator `rings.hpp` uses to rank an outgoing candidate edge
/// against the incoming one: handedness of the turn first (left before
/// straight-on before right), then the turn's sharpness within that
/// bucket, using plain orientation (never geometric angle) so ties between
/// exactly-opposite or collinear edges resolve deterministically.
fn turn_rank(a: Vertex, b: Vertex, c: Vertex) -> (i32, f64) {
    match orient(a, b, c) {
        Orientation::Positive => (0, -(b - a).cross(c - b)),
        Orientation::Zero => (1, 0.0),
        Orientation::Negative => (2, (b - a).cross(c - b)),
    }
}

fn cmp_rank(a: (i32, f64), b: (i32, f64)) -> std::cmp::Ordering {
    a.0.cmp(&b.0).then(a.1.partial_cmp(&b.1).unwrap())
}

/// Which outgoing candidate wins at a branching vertex: `Max` (the widest,
/// most anticlockwise turn) for an exterior boundary with no self-touching
/// allowed, `Min` (the tightest turn) for a hole, or for an exterior that
/// does turn out to pinch against itself.
#[derive(Clone, Copy)]
enum TurnPolicy {
    Max,
    Min,
}

fn choose_next(policy: TurnPolicy, points: &PointStore, current: (usize, usize), candidates: &[usize]) -> Option<usize> {
    let rank = |&c: &usize| turn_rank(points.vertex(current.0), points.vertex(current.1), points.vertex(c));
    match policy {
        TurnPolicy::Max => candidates.iter().copied().max_by(|a, b| cmp_rank(rank(a), rank(b))),
        TurnPolicy::Min => candidates.iter().copied().min_by(|a, b| cmp_rank(rank(a), rank(b))),
    }
}

/// Trace every ring out of `edges` under `policy`. When `expect_anticlockwise`
/// is `Some`, a completed ring whose winding doesn't match is rejected and
/// its directed edges are returned in the second element for the caller to
/// re-stitch under the opposite policy; `None` accepts every ring traced.
fn stitch_pass(edges: &Edges, points: &PointStore, policy: TurnPolicy, expect_anticlockwise: Option<bool>) -> (Vec<Ring>, Edges) {
    let mut by_origin: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(a, b) in edges {
        by_origin.entry(a).or_default().push(b);
    }

    let mut remaining: HashMap<(usize, usize), bool> = edges.iter().map(|&e| (e, true)).collect();
    let mut accepted = Vec::new();
    let mut leftover = Edges::new();

    while let Some((&start, _)) = remaining.iter().find(|(_, &live)| live) {
        let origin = start.0;
        let mut indices = vec![origin];
        let mut trail = Vec::new();
        let mut current = start;
        loop {
            remaining.insert(current, false);
            trail.push(current);
            if current.1 == origin {
                break;
            }
            indices.push(current.1);
            let candidates: Vec<usize> = by_origin
                .get(&current.1)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&dest| remaining.get(&(current.1, dest)).copied().unwrap_or(false))
                .collect();
            let Some(next_dest) = choose_next(policy, points, current, &candidates) else { break };
            current = (current.1, next_dest);
        }

        let ring = Ring(indices.iter().map(|&i| points.vertex(i)).collect());
        match expect_anticlockwise {
            Some(expected) if ring.is_anticlockwise() != expected => leftover.extend(trail),
            _ => accepted.push(ring),
        }
    }
    (accepted, leftover)
}

/// Stitch `edges` (a directed boundary, land on the left of each edge) into
/// closed rings. Traced first under the exterior (widest-turn) policy;
/// any ring that doesn't close anticlockwise is re-stitched under the hole
/// (tightest-turn, self-intersection-permitted) policy instead.
pub fn stitch(edges: &Edges, points: &PointStore) -> Vec<Ring> {
    let (mut rings, leftover) = stitch_pass(edges, points, TurnPolicy::Max, Some(true));
    if !leftover.is_empty() {
        let (mut recovered, _) = stitch_pass(&leftover, points, TurnPolicy::Min, None);
        rings.append(&mut recovered);
    }
    rings
}
