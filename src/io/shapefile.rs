//! ESRI Shapefile emission (§6.3), grounded in `shapefile.hpp`'s `SHPX`/`DBF`
//! writers: a shared `.shp`/`.shx` pair of polygon geometry (shape type 5,
//! big-endian file headers wrapping little-endian content) plus a `.dbf`
//! sidecar carrying one `FID` field per feature. `byteorder` supplies the
//! mixed-endianness writes the format requires.

use crate::error::Error;
use crate::polygon::{Polygon, Polygons};
use crate::ring::Ring;
use crate::vector::Bounds;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::path::Path;

const SHAPE_TYPE_POLYGON: i32 = 5;
const FILE_HEADER_LEN: usize = 100;

/// Shapefile winding is the mirror of this crate's internal convention
/// (exteriors anticlockwise, holes clockwise, matching OGC): exteriors must
/// be clockwise and holes anticlockwise, so every ring is reversed on the
/// way out.
fn reversed(ring: &Ring) -> Vec<crate::vector::Vertex> {
    let mut v = ring.0.clone();
    v.reverse();
    v
}

fn polygon_bounds(polygon: &Polygon) -> Bounds {
    let exterior = Bounds::from_points(polygon.exterior.0.iter());
    polygon
        .holes
        .iter()
        .fold(exterior, |b, hole| b.union(&Bounds::from_points(hole.0.iter())))
}

/// The `.shp` record content (without the 8-byte record header) for one
/// polygon: the 44-byte prefix, a part-start-index array, then the flattened,
/// closing-vertex-duplicated coordinate array.
fn build_polygon_record(polygon: &Polygon) -> Vec<u8> {
    let rings: Vec<Vec<crate::vector::Vertex>> =
        std::iter::once(&polygon.exterior).chain(polygon.holes.iter()).map(reversed).collect();
    let num_parts = rings.len() as i32;
    let num_points: i32 = rings.iter().map(|r| r.len() as i32 + 1).sum();
    let bounds = polygon_bounds(polygon);

    let mut buf = Vec::new();
    buf.write_i32::<LittleEndian>(SHAPE_TYPE_POLYGON).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.xmin).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.ymin).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.xmax).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.ymax).expect(WRITE_CANNOT_FAIL);
    buf.write_i32::<LittleEndian>(num_parts).expect(WRITE_CANNOT_FAIL);
    buf.write_i32::<LittleEndian>(num_points).expect(WRITE_CANNOT_FAIL);

    let mut index = 0i32;
    for ring in &rings {
        buf.write_i32::<LittleEndian>(index).expect(WRITE_CANNOT_FAIL);
        index += ring.len() as i32 + 1;
    }
    for ring in &rings {
        for vertex in ring.iter().chain(ring.first()) {
            buf.write_f64::<LittleEndian>(vertex.x).expect(WRITE_CANNOT_FAIL);
            buf.write_f64::<LittleEndian>(vertex.y).expect(WRITE_CANNOT_FAIL);
        }
    }
    buf
}

const WRITE_CANNOT_FAIL: &str = "writing into a Vec<u8> cannot fail";

/// The shared 100-byte `.shp`/`.shx` file header.
fn write_file_header(buf: &mut Vec<u8>, file_length_words: i32, bounds: Bounds) {
    buf.write_i32::<BigEndian>(9994).expect(WRITE_CANNOT_FAIL);
    buf.extend_from_slice(&[0u8; 20]);
    buf.write_i32::<BigEndian>(file_length_words).expect(WRITE_CANNOT_FAIL);
    buf.write_i32::<LittleEndian>(1000).expect(WRITE_CANNOT_FAIL);
    buf.write_i32::<LittleEndian>(SHAPE_TYPE_POLYGON).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.xmin).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.ymin).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.xmax).expect(WRITE_CANNOT_FAIL);
    buf.write_f64::<LittleEndian>(bounds.ymax).expect(WRITE_CANNOT_FAIL);
    for _ in 0..4 {
        buf.write_f64::<LittleEndian>(0.0).expect(WRITE_CANNOT_FAIL);
    }
}

fn write_dbf(path: &Path, count: usize) -> Result<(), Error> {
    let field_width = count.max(1).to_string().len().max(1) as u8;
    let record_length = field_width as u16 + 1;

    let mut buf = Vec::new();
    buf.push(0x03);
    buf.extend_from_slice(&[0u8; 3]);
    buf.write_u32::<LittleEndian>(count as u32).expect(WRITE_CANNOT_FAIL);
    buf.write_u16::<LittleEndian>(65).expect(WRITE_CANNOT_FAIL);
    buf.write_u16::<LittleEndian>(record_length).expect(WRITE_CANNOT_FAIL);
    buf.extend_from_slice(&[0u8; 2]);
    buf.push(0);
    buf.push(0);
    buf.extend_from_slice(&[0u8; 12]);
    buf.push(0);
    buf.push(0x57);
    buf.extend_from_slice(&[0u8; 2]);

    let mut name = [0u8; 11];
    name[0..3].copy_from_slice(b"FID");
    buf.extend_from_slice(&name);
    buf.push(b'N');
    buf.extend_from_slice(&[0u8; 4]);
    buf.push(field_width);
    buf.push(0);
    buf.extend_from_slice(&[0u8; 14]);
    buf.push(0x0D);

    for fid in 1..=count {
        buf.push(0x20);
        let text = format!("{:>width$}", fid, width = field_width as usize);
        buf.extend_from_slice(text.as_bytes());
    }
    buf.push(0x1A);

    std::fs::write(path, buf).map_err(|e| Error::io(path, e))
}

/// Write `polygons` as a shapefile triple alongside `output` (whose
/// extension is replaced with `.shp`/`.shx`/`.dbf`).
pub fn write(output: &Path, polygons: &Polygons) -> Result<(), Error> {
    let records: Vec<Vec<u8>> = polygons.iter().map(build_polygon_record).collect();
    let bounds = polygons.iter().fold(Bounds::empty(), |b, p| b.union(&polygon_bounds(p)));

    let shp_length_words = (FILE_HEADER_LEN + records.iter().map(|r| 8 + r.len()).sum::<usize>()) as i32 / 2;
    let mut shp = Vec::new();
    write_file_header(&mut shp, shp_length_words, bounds);

    let shx_length_words = (FILE_HEADER_LEN + polygons.len() * 8) as i32 / 2;
    let mut shx = Vec::new();
    write_file_header(&mut shx, shx_length_words, bounds);

    for (i, content) in records.iter().enumerate() {
        let record_number = (i + 1) as i32;
        let content_words = (content.len() / 2) as i32;
        let offset_words = (shp.len() / 2) as i32;

        shp.write_i32::<BigEndian>(record_number).expect(WRITE_CANNOT_FAIL);
        shp.write_i32::<BigEndian>(content_words).expect(WRITE_CANNOT_FAIL);
        shp.extend_from_slice(content);

        shx.write_i32::<BigEndian>(offset_words).expect(WRITE_CANNOT_FAIL);
        shx.write_i32::<BigEndian>(content_words).expect(WRITE_CANNOT_FAIL);
    }

    let shp_path = output.with_extension("shp");
    let shx_path = output.with_extension("shx");
    let dbf_path = output.with_extension("dbf");
    std::fs::write(&shp_path, shp).map_err(|e| Error::io(&shp_path, e))?;
    std::fs::write(&shx_path, shx).map_err(|e| Error::io(&shx_path, e))?;
    write_dbf(&dbf_path, polygons.len())
}
