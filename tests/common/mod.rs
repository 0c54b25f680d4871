//! A from-scratch LAS 1.2, point data record format 0 writer, just
//! sufficient to drive the pipeline end-to-end from synthetic point clouds
//! without needing committed binary fixtures.

use std::path::{Path, PathBuf};

const SCALE: f64 = 0.001;

pub fn write_las_tile(dir: &Path, name: &str, points: &[(f64, f64, f64, u8)]) -> PathBuf {
    let header_size = 227u16;
    let mut bytes = vec![0u8; header_size as usize];
    bytes[0..4].copy_from_slice(b"LASF");
    bytes[24] = 1;
    bytes[25] = 2;
    bytes[94..96].copy_from_slice(&header_size.to_le_bytes());
    bytes[96..100].copy_from_slice(&(header_size as u32).to_le_bytes());
    bytes[100..104].copy_from_slice(&0u32.to_le_bytes());
    bytes[104] = 0;
    bytes[107..111].copy_from_slice(&(points.len() as u32).to_le_bytes());
    bytes[131..139].copy_from_slice(&SCALE.to_le_bytes());
    bytes[139..147].copy_from_slice(&SCALE.to_le_bytes());
    bytes[147..155].copy_from_slice(&SCALE.to_le_bytes());
    bytes[155..163].copy_from_slice(&0.0f64.to_le_bytes());
    bytes[163..171].copy_from_slice(&0.0f64.to_le_bytes());
    bytes[171..179].copy_from_slice(&0.0f64.to_le_bytes());

    for &(x, y, z, classification) in points {
        let mut record = vec![0u8; 20];
        record[0..4].copy_from_slice(&((x / SCALE).round() as i32).to_le_bytes());
        record[4..8].copy_from_slice(&((y / SCALE).round() as i32).to_le_bytes());
        record[8..12].copy_from_slice(&((z / SCALE).round() as i32).to_le_bytes());
        record[15] = classification;
        bytes.extend_from_slice(&record);
    }

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A flat ground grid over `[x0, x1] x [y0, y1]` at `spacing`, all classified
/// ground (2) at elevation `z`, except that no point is emitted inside
/// `void` (simulating the absence of lidar returns over open water).
pub fn grid_with_void(x0: f64, x1: f64, y0: f64, y1: f64, spacing: f64, z: f64, void: Option<(f64, f64, f64, f64)>) -> Vec<(f64, f64, f64, u8)> {
    let mut points = Vec::new();
    let mut x = x0;
    while x <= x1 {
        let mut y = y0;
        while y <= y1 {
            let inside_void = void.is_some_and(|(vx0, vx1, vy0, vy1)| x > vx0 && x < vx1 && y > vy0 && y < vy1);
            if !inside_void {
                points.push((x, y, z, 2));
            }
            y += spacing;
        }
        x += spacing;
    }
    points
}
