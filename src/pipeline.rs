//! Top-level sequencing (§12), grounded in the reference implementation's
//! `main.cpp`: parse+validate CLI (done by the caller, via [`crate::config`])
//! → build thread pools → load and thin tiles → resolve data-dependent
//! defaults → triangulate → interpolate → deconstruct → classify → stitch →
//! nest → simplify → smooth → densify → filter → emit.

use crate::config::Config;
use crate::edges::{self, Edges};
use crate::error::Error;
use crate::io::{self, TileData};
use crate::logging::{Count, Elapsed};
use crate::mesh;
use crate::point::{Point, PointStore};
use crate::polygon::{self, Polygons};
use crate::ring;
use crate::smooth;
use crate::srs::Srs;
use crate::thinning;
use crate::triangle;
use crate::{densify, simplify};
use log::info;
use std::path::Path;
use std::time::Instant;

/// Corners sharper than this are eligible for rounding in §4.11's smoothing
/// pass; not exposed on the CLI surface (§6.4 names no such flag), so this
/// crate fixes it at a conventional "clearly not already smooth" threshold.
/// See DESIGN.md.
const SMOOTH_ANGLE_LIMIT_DEGREES: f64 = 150.0;

/// Run the whole pipeline for a validated `config`, writing the result to
/// `config.output`. No partial output is ever written: every error return
/// happens before the final emit step.
pub fn run(config: &Config) -> Result<(), Error> {
    if !config.overwrite && config.output.exists() {
        return Err(Error::config(format!(
            "{} already exists (pass --overwrite to replace it)",
            config.output.display()
        )));
    }

    let compute_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.compute_threads)
        .build()
        .map_err(|e| Error::internal(format!("failed to start compute thread pool: {e}")))?;
    let io_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads)
        .build()
        .map_err(|e| Error::internal(format!("failed to start I/O thread pool: {e}")))?;

    let width = match config.width {
        Some(width) => width,
        None => {
            info!("estimating minimum width from {} file(s)", config.tile_paths.len());
            let width = io_pool.install(|| estimate_width(&config.tile_paths))?;
            info!("using minimum width of {width:.1} metres");
            width
        }
    };
    let area = config.area.unwrap_or(4.0 * width * width);
    let scale = config.scale.unwrap_or(width);

    let start = Instant::now();
    let (mut points, srs) = io_pool.install(|| load_and_thin(&config.tile_paths, width, &config.discard))?;
    info!("loaded {} in {}", Count(points.len(), "point"), Elapsed(start.elapsed()));

    let srs = resolve_srs(config, srs)?;

    let ground_indices: Vec<usize> =
        points.iter().enumerate().filter(|(_, p)| p.is_ground()).map(|(i, _)| i).collect();
    if ground_indices.len() < 3 {
        return Err(Error::geometry("fewer than three ground points survived thinning"));
    }

    let start = Instant::now();
    let ground_vertices = ground_indices.iter().map(|&i| points.vertex(i)).collect();
    let ground_mesh = compute_pool.install(|| mesh::triangulate(ground_vertices))?;
    info!(
        "triangulated ground mesh ({}) in {}",
        Count(ground_indices.len(), "point"),
        Elapsed(start.elapsed())
    );

    let non_ground: Vec<usize> = points.iter().enumerate().filter(|(_, p)| !p.is_ground()).map(|(i, _)| i).collect();
    mesh::interpolate_ground(&ground_mesh, &ground_indices, &mut points, &non_ground);
    drop(ground_mesh);

    let start = Instant::now();
    let all_vertices = points.iter().map(Point::vertex).collect();
    let full_mesh = compute_pool.install(|| mesh::triangulate(all_vertices))?;
    info!(
        "triangulated full mesh ({}) in {}",
        Count(points.len(), "point"),
        Elapsed(start.elapsed())
    );

    let start = Instant::now();
    let parts = compute_pool.install(|| mesh::deconstruct(&full_mesh, width));
    info!(
        "deconstructed into {} and {} in {}",
        Count(parts.small.len(), "small triangle"),
        Count(parts.large.len(), "large triangle"),
        Elapsed(start.elapsed())
    );
    drop(full_mesh);

    let start = Instant::now();
    let boundary = classify(&parts.large, &parts.hull, &points, config);
    info!("classified boundary ({}) in {}", Count(boundary.len(), "edge"), Elapsed(start.elapsed()));

    let start = Instant::now();
    let rings = ring::stitch(&boundary, &points);
    let mut polygons = polygon::nest(rings);
    info!(
        "stitched {} ring(s) into {} polygon(s) in {}",
        polygon::ring_count(&polygons),
        polygons.len(),
        Elapsed(start.elapsed())
    );

    if !config.raw {
        let start = Instant::now();
        let tolerance = 4.0 * scale * scale;
        simplify::simplify(&mut polygons, tolerance, !config.land);
        info!("simplified in {}", Elapsed(start.elapsed()));

        if !config.simplify_only {
            let start = Instant::now();
            smooth::smooth(&mut polygons, scale, SMOOTH_ANGLE_LIMIT_DEGREES.to_radians());
            info!("smoothed in {}", Elapsed(start.elapsed()));
        }
    }

    if let Some(separation) = config.densify {
        densify::densify(&mut polygons, separation);
    }

    polygon::filter(&mut polygons, area);
    info!("emitting {} polygon(s)", polygons.len());

    emit(config, &polygons, srs.as_ref())
}

/// Reference's `Defaults`: triangulate each tile's raw ground points on its
/// own and take the median of each tile's median edge length, times 4. Run
/// before thinning (which itself needs a width to pick its resolution),
/// so it re-reads and re-triangulates the tiles independently of the main
/// load below.
fn estimate_width(tile_paths: &[std::path::PathBuf]) -> Result<f64, Error> {
    let medians: Result<Vec<f64>, Error> = if cfg!(feature = "multithreading") {
        use rayon::prelude::*;
        tile_paths.par_iter().map(|p| tile_median_edge_length(p)).collect()
    } else {
        tile_paths.iter().map(|p| tile_median_edge_length(p)).collect()
    };
    let mut medians = medians?;
    medians.retain(|m| *m > 0.0);
    if medians.is_empty() {
        return Err(Error::geometry("no tile had enough ground points to estimate a width"));
    }
    let mid = medians.len() / 2;
    medians.select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap());
    Ok(4.0 * medians[mid])
}

fn tile_median_edge_length(path: &Path) -> Result<f64, Error> {
    let tile = io::read_tile(path)?;
    let vertices: Vec<_> = tile.points.iter().filter(|p| p.is_ground()).map(Point::vertex).collect();
    if vertices.len() < 3 {
        return Ok(0.0);
    }
    let mesh = mesh::triangulate(vertices)?;
    Ok(mesh.median_edge_length())
}

/// Load every tile, thinning each on ingestion and merge-thinning the
/// results together (§4.3), carrying forward the first tile's CRS that any
/// tile actually reports.
fn load_and_thin(tile_paths: &[std::path::PathBuf], width: f64, discard: &[u8]) -> Result<(PointStore, Option<Srs>), Error> {
    let resolution = thinning::resolution_from_length(width);

    let loaded: Result<Vec<TileData>, Error> = if cfg!(feature = "multithreading") {
        use rayon::prelude::*;
        tile_paths.par_iter().map(|p| io::read_tile(p)).collect()
    } else {
        tile_paths.iter().map(|p| io::read_tile(p)).collect()
    };
    let loaded = loaded?;

    let mut srs = None;
    let mut merged: Option<Vec<Point>> = None;
    for tile in loaded {
        if srs.is_none() {
            srs = tile.srs;
        }
        let thinned = thinning::thin_tile(tile.points, resolution, discard)?;
        merged = Some(match merged {
            None => thinned,
            Some(existing) => thinning::merge_thinned(resolution, existing, thinned)?,
        });
    }

    Ok((merged.unwrap_or_default().into_iter().collect(), srs))
}

/// `--epsg` always wins over whatever a tile's header reported.
fn resolve_srs(config: &Config, detected: Option<Srs>) -> Result<Option<Srs>, Error> {
    match config.epsg {
        Some(epsg) => Ok(Some(Srs::from_epsg(epsg)?)),
        None => Ok(detected),
    }
}

/// Region classification and boundary cancellation (§4.7). `hull` is the
/// mesh's exterior, already wound anticlockwise (OGC convention); water
/// extraction starts from an empty boundary instead and folds water
/// components in, rather than folding void components out of the land hull.
fn classify(large: &[(usize, usize, usize)], hull: &[(usize, usize)], points: &PointStore, config: &Config) -> Edges {
    let mut boundary: Edges = if config.land { hull.iter().copied().collect() } else { Edges::new() };

    let mut pending: Vec<Vec<(usize, usize, usize)>> = triangle::explode(large);
    loop {
        let mut changed = false;
        let mut next = Vec::with_capacity(pending.len());
        for component in pending {
            let water = edges::is_water(&component, points, config.delta, config.slope_radians);
            if water || edges::touches(&boundary, &component) {
                for &t in &component {
                    edges::toggle_triangle(&mut boundary, t);
                }
                changed = true;
            } else {
                next.push(component);
            }
        }
        pending = next;
        if !changed {
            break;
        }
    }
    boundary
}

fn emit(config: &Config, polygons: &Polygons, srs: Option<&Srs>) -> Result<(), Error> {
    let extension = config.output.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension.eq_ignore_ascii_case("shp") {
        return io::shapefile::write(&config.output, polygons);
    }

    let value = if config.lines {
        io::geojson::lines_feature_collection(polygons, srs, config.multi)
    } else {
        io::geojson::polygons_feature_collection(polygons, srs, config.multi)
    };
    let path = if config.output.as_os_str() == "-" { None } else { Some(config.output.as_path()) };
    io::geojson::write(path, &value)
}
