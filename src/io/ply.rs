//! Binary PLY point cloud ingestion (§6.1), grounded in `ply.hpp`.
//! Binary-little-endian only; the header must declare exactly the six
//! properties this pipeline understands, in order.

use crate::error::Error;
use crate::io::las::TileData;
use crate::point::Point;
use std::io::{Cursor, Read};

/// Reads one newline-terminated line directly from the cursor, advancing it
/// by exactly the bytes consumed (a `BufReader` would over-read into the
/// binary vertex data that follows the header).
fn read_line(cursor: &mut Cursor<Vec<u8>>) -> Result<String, Error> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match cursor.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                line.push(byte[0]);
            }
            Err(e) => return Err(Error::format("", e.to_string())),
        }
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line).map_err(|e| Error::format("", e.to_string()))
}

fn next_non_comment(cursor: &mut Cursor<Vec<u8>>) -> Result<String, Error> {
    loop {
        let line = read_line(cursor)?;
        if !line.starts_with("comment") {
            return Ok(line);
        }
    }
}

fn expect_line(cursor: &mut Cursor<Vec<u8>>, want: &str) -> Result<(), Error> {
    let line = next_non_comment(cursor)?;
    if line != want {
        return Err(Error::format("", format!("expected '{want}', found '{line}'")));
    }
    Ok(())
}

pub fn read(bytes: Vec<u8>) -> Result<TileData, Error> {
    let mut cursor = Cursor::new(bytes);

    expect_line(&mut cursor, "format binary_little_endian 1.0")?;
    let element_line = next_non_comment(&mut cursor)?;
    let Some(count_str) = element_line.strip_prefix("element vertex") else {
        return Err(Error::format("", "expected 'element vertex N'"));
    };
    let size: usize = count_str
        .trim()
        .parse()
        .map_err(|_| Error::format("", "invalid vertex count"))?;
    expect_line(&mut cursor, "property float64 x")?;
    expect_line(&mut cursor, "property float64 y")?;
    expect_line(&mut cursor, "property float64 z")?;
    expect_line(&mut cursor, "property uint8 classification")?;
    expect_line(&mut cursor, "end_header")?;

    let mut points = Vec::with_capacity(size);
    let mut record = [0u8; 25];
    for _ in 0..size {
        cursor
            .read_exact(&mut record)
            .map_err(|e| Error::format("", format!("truncated PLY vertex data: {e}")))?;
        let x = f64::from_le_bytes(record[0..8].try_into().unwrap());
        let y = f64::from_le_bytes(record[8..16].try_into().unwrap());
        let z = f64::from_le_bytes(record[16..24].try_into().unwrap());
        let classification = record[24];
        let mut point = Point::new(x, y, z, classification);
        point.overlap = classification == 12;
        points.push(point);
    }

    Ok(TileData { points, srs: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_ply(points: &[(f64, f64, f64, u8)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"format binary_little_endian 1.0\n");
        bytes.extend_from_slice(format!("element vertex {}\n", points.len()).as_bytes());
        bytes.extend_from_slice(b"property float64 x\n");
        bytes.extend_from_slice(b"property float64 y\n");
        bytes.extend_from_slice(b"property float64 z\n");
        bytes.extend_from_slice(b"property uint8 classification\n");
        bytes.extend_from_slice(b"end_header\n");
        for &(x, y, z, classification) in points {
            bytes.extend_from_slice(&x.to_le_bytes());
            bytes.extend_from_slice(&y.to_le_bytes());
            bytes.extend_from_slice(&z.to_le_bytes());
            bytes.push(classification);
        }
        bytes
    }

    #[test]
    fn reads_points_from_a_minimal_ply() {
        let bytes = minimal_ply(&[(1.0, 2.0, 3.0, 2), (4.0, 5.0, 6.0, 12)]);
        let tile = read(bytes).unwrap();
        assert_eq!(tile.points.len(), 2);
        assert_eq!(tile.points[1].overlap, true);
    }

    #[test]
    fn rejects_a_malformed_header() {
        let mut bytes = minimal_ply(&[]);
        bytes[0] = b'X';
        assert!(read(bytes).is_err());
    }
}
