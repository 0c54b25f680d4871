//! Nesting holes into their enclosing exterior rings (§4.9), grounded in
//! `multipolygon.hpp`'s constructor: anticlockwise rings are exteriors,
//! clockwise rings are holes (the OGC simple-features convention); each
//! hole is assigned to the smallest exterior that contains it, found by
//! processing exteriors in ascending area order and partitioning off the
//! holes each one claims.

use crate::ring::Ring;

/// One exterior ring plus its (possibly empty) holes.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

pub type Polygons = Vec<Polygon>;

/// Group stitched `rings` into polygons: anticlockwise rings become
/// exteriors, clockwise rings become holes nested into whichever exterior
/// contains them.
pub fn nest(mut rings: Vec<Ring>) -> Polygons {
    rings.retain(|r| r.len() >= 3);

    let mut holes: Vec<Ring> = Vec::new();
    let mut exteriors: Vec<Ring> = Vec::new();
    for ring in rings {
        if ring.is_anticlockwise() {
            exteriors.push(ring);
        } else {
            holes.push(ring);
        }
    }
    exteriors.sort_by(|a, b| a.signed_area().partial_cmp(&b.signed_area()).unwrap());

    let mut polygons = Vec::with_capacity(exteriors.len());
    for exterior in exteriors {
        let (mine, rest): (Vec<Ring>, Vec<Ring>) = holes.into_iter().partition(|hole| exterior.contains_ring(hole));
        holes = rest;
        polygons.push(Polygon {
            exterior,
            holes: mine,
        });
    }
    polygons
}

/// Drop any polygon whose exterior's area is below `area`, and any hole
/// within a surviving polygon whose area is below `area`. Matches
/// `multipolygon.hpp`'s `filter`.
pub fn filter(polygons: &mut Polygons, area: f64) {
    for polygon in polygons.iter_mut() {
        polygon.holes.retain(|hole| hole.signed_area().abs() > area);
    }
    polygons.retain(|p| p.exterior.signed_area().abs() > area);
}

pub fn ring_count(polygons: &Polygons) -> usize {
    polygons.iter().map(|p| 1 + p.holes.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vertex;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64, ccw: bool) -> Ring {
        let mut v = vec![
            Vertex::new(x0, y0),
            Vertex::new(x1, y0),
            Vertex::new(x1, y1),
            Vertex::new(x0, y1),
        ];
        if !ccw {
            v.reverse();
        }
        Ring(v)
    }

    #[test]
    fn a_hole_nests_inside_its_exterior() {
        let outer = square(0.0, 0.0, 10.0, 10.0, true);
        let hole = square(2.0, 2.0, 4.0, 4.0, false);
        let polygons = nest(vec![outer, hole]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes.len(), 1);
    }

    #[test]
    fn filter_drops_small_polygons_and_holes() {
        let outer = square(0.0, 0.0, 10.0, 10.0, true);
        let tiny_hole = square(2.0, 2.0, 2.1, 2.1, false);
        let mut polygons = nest(vec![outer, tiny_hole]);
        filter(&mut polygons, 1.0);
        assert_eq!(polygons[0].holes.len(), 0);

        let mut tiny_only = nest(vec![square(0.0, 0.0, 0.5, 0.5, true)]);
        filter(&mut tiny_only, 1.0);
        assert!(tiny_only.is_empty());
    }
}
