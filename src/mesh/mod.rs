//! The Delaunay mesh: a vector-of-adjacency-lists representation, built by
//! parallel divide-and-conquer (§4.4), consumed by elevation interpolation
//! (§4.5) and deconstruction (§4.6).
//!
//! Each vertex's adjacency list is kept sorted in ascending angle order
//! around that vertex. Unlike the reference implementation (which maintains
//! this order with an orientation-predicate comparator to avoid
//! transcendental functions on the hot path), this crate sorts by `atan2`:
//! the ordering is a performance/bookkeeping device here, not a
//! correctness-critical geometric judgement — every correctness-critical
//! decision in the merge still goes through [`crate::predicates`].

mod deconstruct;
mod hull;
mod interpolate;
mod triangulate;

pub use deconstruct::{Deconstructed, LARGE_TRIANGLE_TEST_EPS};
pub use interpolate::interpolate_ground;
pub use triangulate::triangulate;

use crate::error::Error;
use crate::predicates::{self, Orientation};
use crate::vector::Vertex;

/// A directed edge between two point-store indices.
pub type Edge = (usize, usize);

/// The triangulation: `vertices[i]` is the position of point-store index
/// `i`; `adjacency[i]` lists `i`'s neighbors in ascending-angle order.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    adjacency: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        let n = vertices.len();
        Mesh {
            vertices,
            adjacency: vec![Vec::new(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, i: usize) -> Vertex {
        self.vertices[i]
    }

    pub fn all_vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.adjacency[i]
    }

    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].contains(&b)
    }

    fn angle_of(&self, around: usize, other: usize) -> f64 {
        let v = self.vertices[other] - self.vertices[around];
        v.y.atan2(v.x)
    }

    /// Insert `b` into `a`'s adjacency list at its angle-sorted position.
    fn insert_sorted(&mut self, a: usize, b: usize) {
        let angle_b = self.angle_of(a, b);
        let list = &self.adjacency[a];
        let pos = list
            .iter()
            .position(|&n| self.angle_of(a, n) > angle_b)
            .unwrap_or(list.len());
        self.adjacency[a].insert(pos, b);
    }

    /// Connect `a` and `b` with an undirected edge, maintaining both
    /// adjacency lists' angular order. A no-op if already connected.
    pub fn connect(&mut self, a: usize, b: usize) {
        if a == b || self.is_connected(a, b) {
            return;
        }
        self.insert_sorted(a, b);
        self.insert_sorted(b, a);
    }

    /// Remove the undirected edge between `a` and `b`, if present.
    pub fn disconnect(&mut self, a: usize, b: usize) {
        self.adjacency[a].retain(|&n| n != b);
        self.adjacency[b].retain(|&n| n != a);
    }

    fn index_of(&self, around: usize, neighbor: usize) -> Option<usize> {
        self.adjacency[around].iter().position(|&n| n == neighbor)
    }

    /// Rotate counter-clockwise: the neighbor of `around` whose angle
    /// follows `from`'s (wrapping around).
    pub fn next_ccw(&self, around: usize, from: usize) -> Option<usize> {
        let list = &self.adjacency[around];
        if list.is_empty() {
            return None;
        }
        let i = self.index_of(around, from)?;
        Some(list[(i + 1) % list.len()])
    }

    /// Rotate clockwise: the neighbor of `around` whose angle precedes
    /// `from`'s (wrapping around).
    pub fn next_cw(&self, around: usize, from: usize) -> Option<usize> {
        let list = &self.adjacency[around];
        if list.is_empty() {
            return None;
        }
        let i = self.index_of(around, from)?;
        Some(list[(i + list.len() - 1) % list.len()])
    }

    pub fn orient(&self, a: usize, b: usize, c: usize) -> Orientation {
        predicates::orient(self.vertices[a], self.vertices[b], self.vertices[c])
    }

    pub fn in_circle(&self, a: usize, b: usize, c: usize, d: usize) -> Orientation {
        predicates::in_circle(self.vertices[a], self.vertices[b], self.vertices[c], self.vertices[d])
    }

    /// Iterate the directed edges of the mesh (each undirected edge appears
    /// once in each direction).
    pub fn directed_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, ns)| ns.iter().map(move |&b| (a, b)))
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|ns| ns.len()).sum::<usize>() / 2
    }

    /// The median length of this mesh's (undirected) edges, used by the
    /// data-dependent `--width` default (§7, §12).
    pub fn median_edge_length(&self) -> f64 {
        let mut lengths: Vec<f64> = self
            .adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, ns)| {
                ns.iter()
                    .filter(move |&&b| b > a)
                    .map(move |&b| (self.vertices[b] - self.vertices[a]).norm())
            })
            .collect();
        if lengths.is_empty() {
            return 0.0;
        }
        let mid = lengths.len() / 2;
        lengths.select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap());
        lengths[mid]
    }
}

pub(crate) fn too_few_points() -> Error {
    Error::geometry("fewer than three distinct points in a triangulation partition")
}
