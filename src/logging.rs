//! Logging setup and the `Display` formatting helpers used throughout the
//! pipeline's progress messages (§9), grounded in `log.hpp`/`logger.hpp`.
//! Structured logging itself goes through the `log` facade (as the teacher
//! crate's own modules do) rather than a bespoke writer; `init` wires it to
//! `env_logger` with `-q/--quiet` mapped to `LevelFilter::Warn`.

use std::fmt;
use std::time::Duration;

/// Initialise the global logger. `quiet` maps to `Warn`, otherwise `Info`.
pub fn init(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Formats a duration the way the reference logger does: under 60s as one
/// decimal second, otherwise as `XmYYs`.
pub struct Elapsed(pub Duration);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0.as_secs_f64();
        let minutes = (seconds / 60.0).floor() as u64;
        if minutes > 0 {
            write!(f, "{minutes}m{:02.0}s", seconds - 60.0 * minutes as f64)
        } else {
            write!(f, "{seconds:.1}s")
        }
    }
}

/// Formats a count with a pluralised unit name and a k/M/G suffix past
/// 1000, e.g. `Count(42_000, "point")` displays as `42.0k points`.
pub struct Count(pub usize, pub &'static str);

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SUFFIXES: [&str; 4] = ["", "k", "M", "G"];
        let mut decimal = self.0 as f64;
        let mut suffix = 0;
        while decimal >= 999.95 && suffix + 1 < SUFFIXES.len() {
            decimal *= 0.001;
            suffix += 1;
        }
        let plural = if self.0 == 1 { "" } else { "s" };
        if self.0 < 1000 {
            write!(f, "{decimal:.0}{} {}{plural}", SUFFIXES[suffix], self.1)
        } else {
            write!(f, "{decimal:.1}{} {}{plural}", SUFFIXES[suffix], self.1)
        }
    }
}
