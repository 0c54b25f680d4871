//! End-to-end scenarios run through the real CLI validation and orchestrator,
//! against synthetic LAS tiles built in-process (no committed binary
//! fixtures). Corresponds to the literal scenarios of SPEC_FULL.md §11;
//! scenarios D (hole-in-water nesting) and F (simplification tolerance) are
//! covered at the unit level in `polygon.rs` and `simplify.rs` instead of
//! being re-derived here from raw point clouds.

mod common;

use common::{grid_with_void, write_las_tile};
use las2poly::config::{Cli, Config};
use las2poly::error::Error;
use las2poly::pipeline;
use std::path::PathBuf;

fn base_cli(tile_paths: Vec<PathBuf>, output: PathBuf) -> Cli {
    Cli {
        width: Some(10.0),
        delta: 1.5,
        slope: 10.0,
        land: false,
        area: Some(1.0),
        scale: None,
        simplify: false,
        raw: true,
        discard: vec![0, 1, 7, 9, 12, 18],
        multi: false,
        lines: false,
        densify: None,
        epsg: None,
        threads: vec![1],
        tiles: None,
        overwrite: true,
        quiet: true,
        tile_paths,
        output,
    }
}

fn feature_count(output: &std::path::Path) -> usize {
    let text = std::fs::read_to_string(output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["features"].as_array().unwrap().len()
}

#[test]
fn square_lake_void_is_extracted_as_water() {
    let dir = tempdir();
    let points = grid_with_void(0.0, 100.0, 0.0, 100.0, 5.0, 0.0, Some((40.0, 60.0, 40.0, 60.0)));
    let tile = write_las_tile(dir.path(), "tile.las", &points);
    let output = dir.path().join("out.geojson");

    let config = Config::from_cli(base_cli(vec![tile], output.clone())).unwrap();
    pipeline::run(&config).unwrap();

    assert!(feature_count(&output) >= 1, "a flat void surrounded by ground should be extracted as water");
}

#[test]
fn two_overlapping_tiles_agree_with_the_single_tile_result() {
    let dir = tempdir();
    let points = grid_with_void(0.0, 100.0, 0.0, 100.0, 5.0, 0.0, Some((40.0, 60.0, 40.0, 60.0)));

    let left: Vec<_> = points.iter().copied().filter(|&(x, _, _, _)| x <= 60.0).collect();
    let right: Vec<_> = points.iter().copied().filter(|&(x, _, _, _)| x >= 40.0).collect();
    let left_tile = write_las_tile(dir.path(), "left.las", &left);
    let right_tile = write_las_tile(dir.path(), "right.las", &right);
    let output = dir.path().join("out.geojson");

    let config = Config::from_cli(base_cli(vec![left_tile, right_tile], output.clone())).unwrap();
    pipeline::run(&config).unwrap();

    assert!(feature_count(&output) >= 1, "splitting the same scene across overlapping tiles shouldn't lose the lake");
}

#[test]
fn a_steep_void_is_not_classified_as_water() {
    let dir = tempdir();
    let slope = 15.0_f64.to_radians().tan();
    let mut points = grid_with_void(0.0, 100.0, 0.0, 100.0, 5.0, 0.0, Some((40.0, 60.0, 40.0, 60.0)));
    for point in points.iter_mut() {
        point.2 = slope * point.0;
    }
    let tile = write_las_tile(dir.path(), "tile.las", &points);
    let output = dir.path().join("out.geojson");

    let config = Config::from_cli(base_cli(vec![tile], output.clone())).unwrap();
    pipeline::run(&config).unwrap();

    assert_eq!(feature_count(&output), 0, "a void on a 15 degree slope exceeds a 10 degree slope limit");
}

#[test]
fn fewer_than_three_ground_points_is_a_geometry_error() {
    let dir = tempdir();
    let points = vec![(0.0, 0.0, 0.0, 2), (1.0, 1.0, 0.0, 2)];
    let tile = write_las_tile(dir.path(), "tile.las", &points);
    let output = dir.path().join("out.geojson");

    let config = Config::from_cli(base_cli(vec![tile], output)).unwrap();
    match pipeline::run(&config) {
        Err(Error::Geometry(_)) => {}
        other => panic!("expected a geometry error, got {other:?}"),
    }
}

fn tempdir() -> tempfile_like::TempDir {
    tempfile_like::TempDir::new()
}

/// A minimal drop-cleanup temp directory, so these tests don't depend on the
/// `tempfile` crate just for scratch LAS files.
mod tempfile_like {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    pub struct TempDir(PathBuf);

    impl TempDir {
        pub fn new() -> Self {
            let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!("las2poly-test-{}-{unique}", std::process::id()));
            let _ = std::fs::remove_dir_all(&path);
            std::fs::create_dir_all(&path).unwrap();
            TempDir(path)
        }

        pub fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
}
