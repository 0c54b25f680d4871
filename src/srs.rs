//! EPSG → WKT coordinate reference system catalog (§6.2), grounded in
//! `srs.hpp`. The original ships a large generated `wkts.hpp` table that
//! wasn't available to build from, so this module instead keeps a small
//! curated table of the entries that don't follow a closed-form rule (WGS84,
//! Web Mercator, a handful of national grids) and derives UTM zone WKT
//! directly from the zone number, which is the bulk of what `--epsg` is
//! ever used for. See DESIGN.md.

use crate::error::Error;

/// A resolved coordinate reference system: its EPSG code (when known) and
/// WKT representation, as attached to ingested tiles and carried through to
/// the GeoJSON emitter's `crs` member.
#[derive(Debug, Clone, PartialEq)]
pub struct Srs {
    pub epsg: Option<i32>,
    pub wkt: String,
}

impl Srs {
    /// An SRS parsed directly from a tile's embedded WKT VLR, with no known
    /// EPSG code.
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Srs {
            epsg: None,
            wkt: wkt.into(),
        }
    }

    /// Resolve an EPSG code to its WKT, failing with `Error::Config` if the
    /// code isn't in the curated table and isn't a recognised UTM zone.
    pub fn from_epsg(epsg: i32) -> Result<Self, Error> {
        if let Ok(index) = CURATED.binary_search_by_key(&epsg, |&(code, _)| code) {
            return Ok(Srs {
                epsg: Some(epsg),
                wkt: CURATED[index].1.to_string(),
            });
        }
        if let Some(wkt) = utm_wkt(epsg) {
            return Ok(Srs { epsg: Some(epsg), wkt });
        }
        Err(Error::config(format!("invalid EPSG code: {epsg}")))
    }
}

/// WGS84 / UTM north zones are 32601-32660, south zones 32701-32760.
fn utm_wkt(epsg: i32) -> Option<String> {
    let (zone, north) = match epsg {
        32601..=32660 => (epsg - 32600, true),
        32701..=32760 => (epsg - 32700, false),
        _ => return None,
    };
    let central_meridian = -183 + 6 * zone;
    let hemisphere = if north { "N" } else { "S" };
    Some(format!(
        "PROJCS[\"WGS 84 / UTM zone {zone}{hemisphere}\",\
         GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],\
         PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]],\
         PROJECTION[\"Transverse_Mercator\"],\
         PARAMETER[\"latitude_of_origin\",0],\
         PARAMETER[\"central_meridian\",{central_meridian}],\
         PARAMETER[\"scale_factor\",0.9996],\
         PARAMETER[\"false_easting\",500000],\
         PARAMETER[\"false_northing\",{false_northing}],\
         UNIT[\"metre\",1]]",
        false_northing = if north { 0 } else { 10_000_000 },
    ))
}

/// Entries with no closed-form derivation, sorted by EPSG code for binary
/// search.
const CURATED: &[(i32, &str)] = &[
    (
        2193,
        "PROJCS[\"NZGD2000 / New Zealand Transverse Mercator 2000\",\
         GEOGCS[\"NZGD2000\",DATUM[\"New_Zealand_Geodetic_Datum_2000\",\
         SPHEROID[\"GRS 1980\",6378137,298.257222101]],PRIMEM[\"Greenwich\",0],\
         UNIT[\"degree\",0.0174532925199433]],PROJECTION[\"Transverse_Mercator\"],\
         PARAMETER[\"latitude_of_origin\",0],PARAMETER[\"central_meridian\",173],\
         PARAMETER[\"scale_factor\",0.9996],PARAMETER[\"false_easting\",1600000],\
         PARAMETER[\"false_northing\",10000000],UNIT[\"metre\",1]]",
    ),
    (
        3577,
        "PROJCS[\"GDA94 / Australian Albers\",GEOGCS[\"GDA94\",\
         DATUM[\"Geocentric_Datum_of_Australia_1994\",SPHEROID[\"GRS 1980\",6378137,298.257222101]],\
         PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]],\
         PROJECTION[\"Albers_Conic_Equal_Area\"],PARAMETER[\"standard_parallel_1\",-18],\
         PARAMETER[\"standard_parallel_2\",-36],PARAMETER[\"latitude_of_center\",0],\
         PARAMETER[\"longitude_of_center\",132],PARAMETER[\"false_easting\",0],\
         PARAMETER[\"false_northing\",0],UNIT[\"metre\",1]]",
    ),
    (
        3857,
        "PROJCS[\"WGS 84 / Pseudo-Mercator\",GEOGCS[\"WGS 84\",\
         DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],\
         PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]],\
         PROJECTION[\"Mercator_1SP\"],PARAMETER[\"central_meridian\",0],\
         PARAMETER[\"scale_factor\",1],PARAMETER[\"false_easting\",0],\
         PARAMETER[\"false_northing\",0],UNIT[\"metre\",1]]",
    ),
    (
        4326,
        "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],\
         PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]]",
    ),
    (
        27700,
        "PROJCS[\"OSGB36 / British National Grid\",\
         GEOGCS[\"OSGB36\",DATUM[\"OSGB_1936\",SPHEROID[\"Airy 1830\",6377563.396,299.3249646]],\
         PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]],\
         PROJECTION[\"Transverse_Mercator\"],PARAMETER[\"latitude_of_origin\",49],\
         PARAMETER[\"central_meridian\",-2],PARAMETER[\"scale_factor\",0.9996012717],\
         PARAMETER[\"false_easting\",400000],PARAMETER[\"false_northing\",-100000],\
         UNIT[\"metre\",1]]",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_curated_code() {
        let srs = Srs::from_epsg(4326).unwrap();
        assert!(srs.wkt.starts_with("GEOGCS"));
    }

    #[test]
    fn derives_a_utm_north_zone() {
        let srs = Srs::from_epsg(32611).unwrap();
        assert!(srs.wkt.contains("zone 11N"));
        assert!(srs.wkt.contains("central_meridian\",-117"));
    }

    #[test]
    fn derives_a_utm_south_zone() {
        let srs = Srs::from_epsg(32756).unwrap();
        assert!(srs.wkt.contains("zone 56S"));
        assert!(srs.wkt.contains("false_northing\",10000000"));
    }

    #[test]
    fn rejects_an_unknown_code() {
        assert!(Srs::from_epsg(999999).is_err());
    }
}
