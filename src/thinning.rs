//! Grid-based thinning: keep one "best" point per cell of resolution `R`,
//! both when ingesting a single tile and when merging two already-thinned
//! point sets.

use crate::error::Error;
use crate::point::Point;

/// The full Web Mercator coordinate span this tool supports, matching
/// `thin.hpp`'s `web_mercator_range` literal. Thinning resolution must be
/// coarse enough that `resolution * i32::MAX` still covers this span,
/// otherwise cell indices would overflow before the data could plausibly
/// need it.
pub const WEB_MERCATOR_MAX: f64 = 40_097_932.2;

fn cell(value: f64, resolution: f64) -> i64 {
    (value / resolution).floor() as i64
}

/// A cell key: `(floor(x/R), floor(y/R))`.
pub type Cell = (i64, i64);

pub fn cell_of(point: &Point, resolution: f64) -> Cell {
    (cell(point.x, resolution), cell(point.y, resolution))
}

/// Thin a batch of points to at most one per cell, keeping the best point
/// (§3's point ordering) in each occupied cell. The classes in `discard` are
/// dropped before thinning (they never compete for a cell).
///
/// Returns points sorted by cell key, which is the invariant the
/// merge-thinning step below depends on.
pub fn thin_tile(points: impl IntoIterator<Item = Point>, resolution: f64, discard: &[u8]) -> Result<Vec<Point>, Error> {
    check_resolution(resolution)?;

    let mut keyed: Vec<(Cell, Point)> = points
        .into_iter()
        .filter(|p| p.key_point || !discard.contains(&p.classification))
        .map(|p| (cell_of(&p, resolution), p))
        .collect();

    keyed.sort_by_key(|(cell, _)| *cell);

    let mut out = Vec::with_capacity(keyed.len());
    let mut i = 0;
    while i < keyed.len() {
        let cell = keyed[i].0;
        let mut best = keyed[i].1;
        let mut j = i + 1;
        while j < keyed.len() && keyed[j].0 == cell {
            if keyed[j].1.better_than(&best) {
                best = keyed[j].1;
            }
            j += 1;
        }
        out.push(best);
        i = j;
    }
    Ok(out)
}

/// Merge two already cell-thinned, cell-sorted point sets, keeping the
/// better point wherever both sets have a point in the same cell. Runs in a
/// single parallel-friendly linear merge walk rather than re-sorting the
/// concatenation.
pub fn merge_thinned(resolution: f64, a: Vec<Point>, b: Vec<Point>) -> Result<Vec<Point>, Error> {
    check_resolution(resolution)?;

    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(a.len() + b.len());
    while i < a.len() && j < b.len() {
        let ca = cell_of(&a[i], resolution);
        let cb = cell_of(&b[j], resolution);
        match ca.cmp(&cb) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(if a[i].better_than(&b[j]) { a[i] } else { b[j] });
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    Ok(out)
}

fn check_resolution(resolution: f64) -> Result<(), Error> {
    if resolution <= 0.0 || resolution * (i32::MAX as f64) < WEB_MERCATOR_MAX {
        Err(Error::geometry(format!(
            "resolution {resolution} too small to cover the working coordinate range"
        )))
    } else {
        Ok(())
    }
}

/// The resolution used for thinning is derived from the minimum void-
/// triangle edge length (the `--width` parameter, user-supplied or
/// defaulted): `R = length / sqrt(8)`.
pub fn resolution_from_length(length: f64) -> f64 {
    length / 8.0_f64.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64, z: f64, class: u8) -> Point {
        Point::new(x, y, z, class)
    }

    #[test]
    fn thin_keeps_one_point_per_cell() {
        let points = vec![pt(0.1, 0.1, 1.0, 2), pt(0.2, 0.2, 5.0, 2), pt(5.0, 5.0, 0.0, 2)];
        let thinned = thin_tile(points, 1.0, &[]).unwrap();
        assert_eq!(thinned.len(), 2);
        let cell0 = thinned.iter().find(|p| p.x < 1.0).unwrap();
        assert_eq!(cell0.z, 5.0, "higher elevation wins the tie");
    }

    #[test]
    fn thin_drops_discarded_classes_unless_key_point() {
        let mut withheld_class = pt(0.0, 0.0, 0.0, 7);
        withheld_class.key_point = true;
        let points = vec![pt(0.0, 0.0, 1.0, 7), withheld_class];
        let thinned = thin_tile(points, 1.0, &[7]).unwrap();
        assert_eq!(thinned.len(), 1);
        assert!(thinned[0].key_point);
    }

    #[test]
    fn thinning_is_idempotent() {
        let points: Vec<Point> = (0..50)
            .map(|i| pt((i as f64) * 0.3, (i as f64) * 0.7, i as f64, 2))
            .collect();
        let once = thin_tile(points, 2.0, &[]).unwrap();
        let twice = thin_tile(once.clone(), 2.0, &[]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_of_thinned_tiles_matches_thinning_the_union() {
        let a: Vec<Point> = (0..20).map(|i| pt(i as f64, 0.0, i as f64, 2)).collect();
        let b: Vec<Point> = (10..30).map(|i| pt(i as f64, 0.0, (30 - i) as f64, 2)).collect();

        let resolution = 1.5;
        let thinned_a = thin_tile(a.clone(), resolution, &[]).unwrap();
        let thinned_b = thin_tile(b.clone(), resolution, &[]).unwrap();
        let merged = merge_thinned(resolution, thinned_a, thinned_b).unwrap();

        let mut union = a;
        union.extend(b);
        let mut expected = thin_tile(union, resolution, &[]).unwrap();
        let mut merged_sorted = merged;
        expected.sort_by(|p, q| p.x.partial_cmp(&q.x).unwrap());
        merged_sorted.sort_by(|p, q| p.x.partial_cmp(&q.x).unwrap());
        assert_eq!(expected, merged_sorted);
    }

    #[test]
    fn resolution_too_small_fails() {
        assert!(check_resolution(0.0).is_err());
    }

    #[test]
    fn thinning_a_jittered_grid_is_still_idempotent() {
        use rand::SeedableRng;
        use rand_distr::{Distribution, Normal};

        let mut rng = rand::rngs::StdRng::seed_from_u64(99);
        let jitter = Normal::new(0.0, 0.2).unwrap();
        let points: Vec<Point> = (0..20)
            .flat_map(|y| (0..20).map(move |x| (x, y)))
            .map(|(x, y)| {
                let dx: f64 = jitter.sample(&mut rng);
                let dy: f64 = jitter.sample(&mut rng);
                pt(x as f64 + dx, y as f64 + dy, 0.0, 2)
            })
            .collect();

        let once = thin_tile(points, 1.0, &[]).unwrap();
        let twice = thin_tile(once.clone(), 1.0, &[]).unwrap();
        assert_eq!(once, twice);
    }
}
