//! GeoJSON emission (§6.3), grounded in `geojson.hpp`. The reference builds
//! the document by hand with a custom `operator<<` stream; this crate
//! builds a `serde_json::Value` instead, since `serde_json` is already an
//! ecosystem dependency and gets the escaping, number formatting, and
//! pretty-printing for free.

use crate::error::Error;
use crate::polygon::{Polygon, Polygons};
use crate::ring::Ring;
use crate::srs::Srs;
use crate::vector::Vertex;
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::Path;

fn vertex_json(v: Vertex) -> Value {
    json!([v.x, v.y])
}

/// A ring's coordinates, closed by repeating the first vertex.
fn ring_json(ring: &Ring) -> Value {
    let mut coords: Vec<Value> = ring.0.iter().map(|&v| vertex_json(v)).collect();
    if let Some(&first) = ring.0.first() {
        coords.push(vertex_json(first));
    }
    Value::Array(coords)
}

fn polygon_coordinates(polygon: &Polygon) -> Value {
    let mut rings = vec![ring_json(&polygon.exterior)];
    rings.extend(polygon.holes.iter().map(ring_json));
    Value::Array(rings)
}

fn crs_json(srs: &Srs) -> Value {
    let name = match srs.epsg {
        Some(epsg) => format!("urn:ogc:def:crs:EPSG::{epsg}"),
        None => srs.wkt.clone(),
    };
    json!({"type": "name", "properties": {"name": name}})
}

fn wrap(mut features: Vec<Value>, srs: Option<&Srs>) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), json!("FeatureCollection"));
    if let Some(srs) = srs {
        obj.insert("crs".into(), crs_json(srs));
    }
    obj.insert("features".into(), Value::Array(std::mem::take(&mut features)));
    Value::Object(obj)
}

/// Polygon or MultiPolygon features, depending on `multi`.
pub fn polygons_feature_collection(polygons: &Polygons, srs: Option<&Srs>, multi: bool) -> Value {
    let features = if multi {
        if polygons.is_empty() {
            Vec::new()
        } else {
            let coordinates: Vec<Value> = polygons.iter().map(polygon_coordinates).collect();
            vec![json!({
                "type": "Feature",
                "properties": null,
                "geometry": {"type": "MultiPolygon", "coordinates": coordinates},
            })]
        }
    } else {
        polygons
            .iter()
            .map(|polygon| {
                json!({
                    "type": "Feature",
                    "properties": null,
                    "geometry": {"type": "Polygon", "coordinates": polygon_coordinates(polygon)},
                })
            })
            .collect()
    };
    wrap(features, srs)
}

/// Polygon boundaries as LineString or MultiLineString features (`--lines`).
pub fn lines_feature_collection(polygons: &Polygons, srs: Option<&Srs>, multi: bool) -> Value {
    let features = if multi {
        polygons
            .iter()
            .map(|polygon| {
                let mut coordinates = vec![ring_json(&polygon.exterior)];
                coordinates.extend(polygon.holes.iter().map(ring_json));
                json!({
                    "type": "Feature",
                    "properties": null,
                    "geometry": {"type": "MultiLineString", "coordinates": coordinates},
                })
            })
            .collect()
    } else {
        polygons
            .iter()
            .flat_map(|polygon| std::iter::once(&polygon.exterior).chain(polygon.holes.iter()))
            .map(|ring| {
                json!({
                    "type": "Feature",
                    "properties": null,
                    "geometry": {"type": "LineString", "coordinates": ring_json(ring)},
                })
            })
            .collect()
    };
    wrap(features, srs)
}

/// Write `value` to `path`, or to stdout when `path` is `None`.
pub fn write(path: Option<&Path>, value: &Value) -> Result<(), Error> {
    let text = serde_json::to_string(value).map_err(|e| Error::geometry(format!("failed to serialize GeoJSON: {e}")))?;
    match path {
        Some(path) => {
            std::fs::write(path, text + "\n").map_err(|e| Error::io(path, e))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{text}").map_err(|e| Error::io("<stdout>", e))?;
        }
    }
    Ok(())
}
