//! Tile format dispatch (§6.1), grounded in `tile.hpp`: a four-byte magic
//! sniff picks the LAS or PLY reader, anything else is a format error.

use crate::error::Error;
use crate::io::las::{self, TileData};
use crate::io::ply;
use std::io::Read;
use std::path::Path;

/// Read an entire tile (file path, or `-` for standard input) into memory
/// and parse it, dispatching on its magic bytes.
pub fn read_tile(path: &Path) -> Result<TileData, Error> {
    let bytes = if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| Error::io(path, e))?;
        buf
    } else {
        std::fs::read(path).map_err(|e| Error::io(path, e))?
    };

    if bytes.len() < 4 {
        return Err(Error::format(path, "file too short to identify format"));
    }
    match &bytes[0..4] {
        b"LASF" => las::read(bytes).map_err(|e| rewrap(e, path)),
        b"ply\n" => ply::read(bytes).map_err(|e| rewrap(e, path)),
        _ => Err(Error::format(path, "unrecognised tile format (expected LAS or PLY)")),
    }
}

/// The format readers don't know their own path (they operate on an
/// in-memory buffer); stitch it back in for error messages.
fn rewrap(error: Error, path: &Path) -> Error {
    match error {
        Error::Format { message, .. } => Error::format(path, message),
        other => other,
    }
}
