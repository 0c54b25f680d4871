//! CLI flags and the validated, defaulted configuration built from them
//! (§7), grounded in `opts.hpp`/`args.hpp`: a two-stage `Cli` → `Config`
//! construction, parsed here with `clap`'s derive API instead of a
//! hand-rolled argument scanner.

use crate::error::Error;
use clap::Parser;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Raw command-line flags, exactly as typed by the user.
#[derive(Parser, Debug)]
#[command(name = "las2poly", about = "Extract land/water polygons from lidar tiles")]
pub struct Cli {
    /// Minimum width of water bodies (default: 4x the median ground-mesh edge length)
    #[arg(short = 'w', long)]
    pub width: Option<f64>,

    /// Maximum water-body height delta
    #[arg(long, default_value_t = 1.5)]
    pub delta: f64,

    /// Maximum water-body slope, in degrees
    #[arg(long, default_value_t = 5.0)]
    pub slope: f64,

    /// Extract land instead of water
    #[arg(long)]
    pub land: bool,

    /// Minimum polygon/hole area (default: 4 * width^2)
    #[arg(long)]
    pub area: Option<f64>,

    /// Feature scale for simplify/smooth (default: width)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Simplify but don't smooth
    #[arg(long)]
    pub simplify: bool,

    /// Don't smooth or simplify
    #[arg(long)]
    pub raw: bool,

    /// Point classes to discard, comma-separated
    #[arg(long, value_delimiter = ',', default_value = "0,1,7,9,12,18")]
    pub discard: Vec<u16>,

    /// Emit a MultiPolygon instead of one feature per polygon
    #[arg(long)]
    pub multi: bool,

    /// Emit polygon boundaries as linestrings
    #[arg(long)]
    pub lines: bool,

    /// Maximum vertex spacing in the final rings (supplemented; disabled by default)
    #[arg(long)]
    pub densify: Option<f64>,

    /// Override missing or incorrect EPSG codes
    #[arg(long)]
    pub epsg: Option<i32>,

    /// Processing thread counts: "compute[,io]"
    #[arg(long, value_delimiter = ',', default_value = "0")]
    pub threads: Vec<i64>,

    /// List of input tiles as a text file ("-" for stdin)
    #[arg(long)]
    pub tiles: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Suppress progress information
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Positional lidar tile paths (mutually exclusive with --tiles)
    pub tile_paths: Vec<PathBuf>,

    /// GeoJSON or shapefile output path
    pub output: PathBuf,
}

/// The validated, defaulted configuration used by every later stage. Width
/// and area are resolved from the data and so stay `None` here until
/// [`crate::pipeline`] fills them in via the data-dependent defaulting step
/// of §7.
#[derive(Debug, Clone)]
pub struct Config {
    pub width: Option<f64>,
    pub delta: f64,
    pub slope_radians: f64,
    pub land: bool,
    pub area: Option<f64>,
    pub scale: Option<f64>,
    pub simplify_only: bool,
    pub raw: bool,
    pub discard: Vec<u8>,
    pub multi: bool,
    pub lines: bool,
    pub densify: Option<f64>,
    pub epsg: Option<i32>,
    pub compute_threads: usize,
    pub io_threads: usize,
    pub tile_paths: Vec<PathBuf>,
    pub output: PathBuf,
    pub overwrite: bool,
    pub quiet: bool,
}

fn read_lines(path: &Path) -> Result<Vec<PathBuf>, Error> {
    let reader: Box<dyn BufRead> = if path == Path::new("-") {
        Box::new(std::io::BufReader::new(std::io::stdin()))
    } else {
        Box::new(std::io::BufReader::new(
            std::fs::File::open(path).map_err(|e| Error::io(path, e))?,
        ))
    };
    reader
        .lines()
        .map(|line| line.map(PathBuf::from).map_err(|e| Error::io(path, e)))
        .collect()
}

impl Config {
    /// Validate and default a parsed [`Cli`], matching the rules of §6.4.
    pub fn from_cli(cli: Cli) -> Result<Self, Error> {
        if let Some(w) = cli.width {
            if w <= 0.0 {
                return Err(Error::config("width must be positive"));
            }
        }
        if let Some(a) = cli.area {
            if a < 0.0 {
                return Err(Error::config("area can't be negative"));
            }
        }
        if cli.delta <= 0.0 {
            return Err(Error::config("delta must be positive"));
        }
        if cli.slope <= 0.0 || cli.slope >= 90.0 {
            return Err(Error::config("slope must be strictly between 0 and 90 degrees"));
        }
        if let Some(s) = cli.scale {
            if s < 0.0 {
                return Err(Error::config("scale can't be negative"));
            }
        }
        if cli.raw && cli.simplify {
            return Err(Error::config("either --raw or --simplify but not both"));
        }
        let mut discard = Vec::with_capacity(cli.discard.len());
        for class in cli.discard {
            if class > 255 {
                return Err(Error::config(format!("invalid lidar point class {class}")));
            }
            discard.push(class as u8);
        }
        let threads: Vec<i64> = cli.threads;
        if threads.is_empty() || threads.len() > 2 {
            return Err(Error::config("--threads accepts one or two counts"));
        }
        let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let mut counts = threads.iter().map(|&n| if n <= 0 { available } else { n as usize });
        let compute_threads = counts.next().unwrap();
        if compute_threads == 0 {
            return Err(Error::config("number of threads must be positive"));
        }
        let io_threads = counts.next().unwrap_or(compute_threads);

        let mut tile_paths = cli.tile_paths;
        if let Some(tiles_path) = &cli.tiles {
            if !tile_paths.is_empty() {
                return Err(Error::config("can't specify tiles as arguments and also in a file"));
            }
            tile_paths = read_lines(tiles_path)?;
        }
        if tile_paths.is_empty() {
            return Err(Error::config("missing argument: lidar tile path"));
        }
        let stdin_count = tile_paths.iter().filter(|p| p.as_os_str() == "-").count();
        if stdin_count > 1 {
            return Err(Error::config("can't read standard input more than once"));
        }
        if stdin_count > 0 && cli.width.is_none() {
            return Err(Error::config("can't estimate width from standard input"));
        }

        let extension = cli.output.extension().and_then(|e| e.to_str()).unwrap_or("");
        let is_shapefile = extension.eq_ignore_ascii_case("shp");
        let is_geojson = extension.eq_ignore_ascii_case("json") || extension.eq_ignore_ascii_case("geojson");
        if !is_shapefile && !is_geojson {
            return Err(Error::config("output path must end in .json, .geojson or .shp"));
        }
        if is_shapefile && cli.epsg.is_some() {
            return Err(Error::config("--epsg is not supported for shapefile output"));
        }

        Ok(Config {
            width: cli.width,
            delta: cli.delta,
            slope_radians: cli.slope.to_radians(),
            land: cli.land,
            area: cli.area,
            scale: cli.scale,
            simplify_only: cli.simplify,
            raw: cli.raw,
            discard,
            multi: cli.multi,
            lines: cli.lines,
            densify: cli.densify,
            epsg: cli.epsg,
            compute_threads,
            io_threads,
            tile_paths,
            output: cli.output,
            overwrite: cli.overwrite,
            quiet: cli.quiet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            width: Some(5.0),
            delta: 1.5,
            slope: 5.0,
            land: false,
            area: None,
            scale: None,
            simplify: false,
            raw: false,
            discard: vec![0, 1, 7, 9, 12, 18],
            multi: false,
            lines: false,
            densify: None,
            epsg: None,
            threads: vec![0],
            tiles: None,
            overwrite: false,
            quiet: false,
            tile_paths: vec![PathBuf::from("tile.las")],
            output: PathBuf::from("out.geojson"),
        }
    }

    #[test]
    fn rejects_raw_and_simplify_together() {
        let mut cli = base_cli();
        cli.raw = true;
        cli.simplify = true;
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn rejects_bad_output_extension() {
        let mut cli = base_cli();
        cli.output = PathBuf::from("out.txt");
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn rejects_epsg_override_for_shapefile() {
        let mut cli = base_cli();
        cli.output = PathBuf::from("out.shp");
        cli.epsg = Some(4326);
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn accepts_a_minimal_valid_config() {
        let config = Config::from_cli(base_cli()).unwrap();
        assert_eq!(config.width, Some(5.0));
        assert_eq!(config.discard, vec![0, 1, 7, 9, 12, 18]);
    }
}
