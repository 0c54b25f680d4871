//! LAS point cloud ingestion (§6.1), grounded in `las.hpp`. Versions 1.1
//! through 1.4, point data record formats 0-10; LAZ (`format > 127`) and
//! unsupported formats are rejected. Unlike the reference's streaming
//! `istream`, this reads the whole tile into memory first and parses it
//! from a cursor — this crate's Non-goals already rule out streaming.

use crate::error::Error;
use crate::point::Point;
use crate::srs::Srs;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};

const LASF_PROJECTION: &[u8; 16] = b"LASF_Projection\0";

fn point_record_length(format: u8) -> Option<usize> {
    Some(match format {
        0 => 20,
        1 => 28,
        2 => 26,
        3 => 34,
        4 => 57,
        5 => 63,
        6 => 30,
        7 => 36,
        8 => 38,
        9 => 59,
        10 => 67,
        _ => return None,
    })
}

fn read_fixed(cursor: &mut Cursor<Vec<u8>>, n: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; n];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| Error::format("", format!("truncated LAS file: {e}")))?;
    Ok(buf)
}

/// Extract the `PROJCS[...]` substring from a WKT-in-GeoTIFF-VLR blob by
/// matching brackets, per `las.hpp`'s VLR 2112 handler.
fn extract_projcs(wkt: &str) -> Option<String> {
    let start = wkt.find("PROJCS[")?;
    let mut depth = 0i32;
    for (offset, ch) in wkt[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth -= 1,
            _ => {}
        }
        if depth == 0 && offset > 0 {
            return Some(wkt[start..start + offset + 1].to_string());
        }
    }
    None
}

struct VlrOutcome {
    srs: Option<Srs>,
}

fn read_standard_vlrs(cursor: &mut Cursor<Vec<u8>>, count: u32) -> Result<VlrOutcome, Error> {
    let mut srs = None;
    for _ in 0..count {
        if srs.is_some() {
            break;
        }
        cursor.seek(SeekFrom::Current(2)).ok(); // reserved
        let user_id = read_fixed(cursor, 16)?;
        let record_id = cursor.read_u16::<LittleEndian>().map_err(|e| Error::format("", e.to_string()))?;
        let record_length = cursor.read_u16::<LittleEndian>().map_err(|e| Error::format("", e.to_string()))? as u64;
        cursor.seek(SeekFrom::Current(32)).ok(); // description

        if user_id.as_slice() != &LASF_PROJECTION[..] {
            cursor.seek(SeekFrom::Current(record_length as i64)).ok();
            continue;
        }
        match record_id {
            2112 => {
                let bytes = read_fixed(cursor, record_length as usize)?;
                let text = String::from_utf8_lossy(&bytes);
                if let Some(projcs) = extract_projcs(&text) {
                    srs = Some(Srs::from_wkt(projcs));
                }
            }
            34735 => {
                let _version = cursor.read_u16::<LittleEndian>().ok();
                let _revision = cursor.read_u16::<LittleEndian>().ok();
                let _minor = cursor.read_u16::<LittleEndian>().ok();
                let number_of_keys = cursor.read_u16::<LittleEndian>().unwrap_or(0);
                let mut epsg = None;
                for _ in 0..number_of_keys {
                    let key_id = cursor.read_u16::<LittleEndian>().unwrap_or(0);
                    let _location = cursor.read_u16::<LittleEndian>().unwrap_or(0);
                    let _count = cursor.read_u16::<LittleEndian>().unwrap_or(0);
                    let value_offset = cursor.read_u16::<LittleEndian>().unwrap_or(0);
                    if key_id == 3072 {
                        epsg = Some(value_offset as i32);
                    }
                }
                if let Some(code) = epsg {
                    if let Ok(resolved) = Srs::from_epsg(code) {
                        srs = Some(resolved);
                    }
                }
                let consumed = 8 * (number_of_keys as i64 + 1);
                cursor.seek(SeekFrom::Current(record_length as i64 - consumed)).ok();
            }
            _ => {
                cursor.seek(SeekFrom::Current(record_length as i64)).ok();
            }
        }
    }
    Ok(VlrOutcome { srs })
}

/// A tile's worth of points plus whatever CRS information was embedded in
/// it, as yielded by both the LAS and PLY readers.
pub struct TileData {
    pub points: Vec<Point>,
    pub srs: Option<Srs>,
}

pub fn read(mut bytes: Vec<u8>) -> Result<TileData, Error> {
    if bytes.len() < 4 || &bytes[0..4] != b"LASF" {
        return Err(Error::format("", "not a LAS file"));
    }
    // header_size can exceed 255 bytes read so far; ensure it's all present.
    bytes.shrink_to_fit();
    let mut cursor = Cursor::new(bytes);

    cursor.seek(SeekFrom::Start(24))?;
    let version_major = cursor.read_u8()?;
    let version_minor = cursor.read_u8()?;
    if version_major != 1 {
        return Err(Error::format("", format!("unsupported LAS version {version_major}.{version_minor}")));
    }

    cursor.seek(SeekFrom::Start(94))?;
    let header_size = cursor.read_u16::<LittleEndian>()?;
    let offset_to_point_data = cursor.read_u32::<LittleEndian>()?;
    let number_of_vlrs = cursor.read_u32::<LittleEndian>()?;
    let point_data_record_format_raw = cursor.read_u8()?;
    if point_data_record_format_raw > 127 {
        return Err(Error::format("", "LAZ compression is not supported"));
    }
    let Some(point_record_length) = point_record_length(point_data_record_format_raw) else {
        return Err(Error::format("", format!("unsupported LAS point data record format {point_data_record_format_raw}")));
    };

    cursor.seek(SeekFrom::Start(107))?;
    let legacy_number_of_point_records = cursor.read_u32::<LittleEndian>()?;

    cursor.seek(SeekFrom::Start(131))?;
    let x_scale = cursor.read_f64::<LittleEndian>()?;
    let y_scale = cursor.read_f64::<LittleEndian>()?;
    let z_scale = cursor.read_f64::<LittleEndian>()?;
    let x_offset = cursor.read_f64::<LittleEndian>()?;
    let y_offset = cursor.read_f64::<LittleEndian>()?;
    let z_offset = cursor.read_f64::<LittleEndian>()?;

    let mut start_of_evlr = None;
    let mut number_of_evlrs = 0u32;
    let size = if version_minor < 4 {
        legacy_number_of_point_records as u64
    } else {
        cursor.seek(SeekFrom::Start(235))?;
        let start = cursor.read_u64::<LittleEndian>()?;
        let count = cursor.read_u32::<LittleEndian>()?;
        let number_of_point_records = cursor.read_u64::<LittleEndian>()?;
        start_of_evlr = Some(start);
        number_of_evlrs = count;
        number_of_point_records
    };

    cursor.seek(SeekFrom::Start(header_size as u64))?;
    let VlrOutcome { mut srs } = read_standard_vlrs(&mut cursor, number_of_vlrs)?;

    if srs.is_none() {
        if let Some(start) = start_of_evlr {
            cursor.seek(SeekFrom::Start(start))?;
            for _ in 0..number_of_evlrs {
                if srs.is_some() {
                    break;
                }
                cursor.seek(SeekFrom::Current(2)).ok();
                let user_id = read_fixed(&mut cursor, 16)?;
                let record_id = cursor.read_u16::<LittleEndian>()?;
                let record_length = cursor.read_u64::<LittleEndian>()?;
                cursor.seek(SeekFrom::Current(32)).ok();
                if user_id.as_slice() == &LASF_PROJECTION[..] && record_id == 2112 {
                    let bytes = read_fixed(&mut cursor, record_length as usize)?;
                    let text = String::from_utf8_lossy(&bytes);
                    if let Some(projcs) = extract_projcs(&text) {
                        srs = Some(Srs::from_wkt(projcs));
                    }
                } else {
                    cursor.seek(SeekFrom::Current(record_length as i64)).ok();
                }
            }
        }
    }

    cursor.seek(SeekFrom::Start(offset_to_point_data as u64))?;

    let mut points = Vec::with_capacity(size as usize);
    let mut buffer = vec![0u8; point_record_length];
    for _ in 0..size {
        cursor
            .read_exact(&mut buffer)
            .map_err(|e| Error::format("", format!("truncated LAS point data: {e}")))?;
        let raw_x = i32::from_le_bytes(buffer[0..4].try_into().unwrap());
        let raw_y = i32::from_le_bytes(buffer[4..8].try_into().unwrap());
        let raw_z = i32::from_le_bytes(buffer[8..12].try_into().unwrap());
        let x = x_offset + x_scale * raw_x as f64;
        let y = y_offset + y_scale * raw_y as f64;
        let z = z_offset + z_scale * raw_z as f64;

        let (key_point, withheld, overlap, classification) = if point_data_record_format_raw <= 5 {
            let flags = buffer[15];
            let classification = flags & 0b0001_1111;
            (flags & 0b0100_0000 != 0, flags & 0b1000_0000 != 0, classification == 12, classification)
        } else {
            let flags = buffer[16];
            let classification = buffer[17];
            (flags & 0b0000_0010 != 0, flags & 0b0000_0100 != 0, flags & 0b0000_1000 != 0, classification)
        };

        let mut point = Point::new(x, y, z, classification);
        point.key_point = key_point;
        point.withheld = withheld;
        point.overlap = overlap;
        points.push(point);
    }

    Ok(TileData { points, srs })
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::format("", format!("truncated or malformed LAS header: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_las_1_2(format: u8, points: &[(i32, i32, i32, u8)]) -> Vec<u8> {
        let header_size = 227u16;
        let mut bytes = vec![0u8; header_size as usize];
        bytes[0..4].copy_from_slice(b"LASF");
        bytes[24] = 1; // version major
        bytes[25] = 2; // version minor
        bytes[94..96].copy_from_slice(&header_size.to_le_bytes());
        let offset_to_point_data = header_size as u32;
        bytes[96..100].copy_from_slice(&offset_to_point_data.to_le_bytes());
        bytes[100..104].copy_from_slice(&0u32.to_le_bytes()); // no VLRs
        bytes[104] = format;
        bytes[107..111].copy_from_slice(&(points.len() as u32).to_le_bytes());
        bytes[131..139].copy_from_slice(&1.0f64.to_le_bytes()); // x scale
        bytes[139..147].copy_from_slice(&1.0f64.to_le_bytes()); // y scale
        bytes[147..155].copy_from_slice(&1.0f64.to_le_bytes()); // z scale
        bytes[155..163].copy_from_slice(&0.0f64.to_le_bytes()); // x offset
        bytes[163..171].copy_from_slice(&0.0f64.to_le_bytes()); // y offset
        bytes[171..179].copy_from_slice(&0.0f64.to_le_bytes()); // z offset

        let record_length = point_record_length(format).unwrap();
        for &(x, y, z, classification) in points {
            let mut record = vec![0u8; record_length];
            record[0..4].copy_from_slice(&x.to_le_bytes());
            record[4..8].copy_from_slice(&y.to_le_bytes());
            record[8..12].copy_from_slice(&z.to_le_bytes());
            record[15] = classification;
            bytes.extend_from_slice(&record);
        }
        bytes
    }

    #[test]
    fn reads_points_from_a_format_0_file() {
        let bytes = minimal_las_1_2(0, &[(100, 200, 300, 2), (150, 250, 350, 1)]);
        let tile = read(bytes).unwrap();
        assert_eq!(tile.points.len(), 2);
        assert_eq!(tile.points[0].x, 100.0);
        assert_eq!(tile.points[0].classification, 2);
        assert!(tile.points[0].is_ground());
    }

    #[test]
    fn rejects_laz_compressed_format() {
        let mut bytes = minimal_las_1_2(0, &[]);
        bytes[104] = 130;
        assert!(read(bytes).is_err());
    }

    #[test]
    fn rejects_non_las_magic() {
        assert!(read(vec![0u8; 8]).is_err());
    }
}
