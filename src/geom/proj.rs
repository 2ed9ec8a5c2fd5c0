use std::{collections::HashMap, fmt, sync::LazyLock};

use anyhow::{Context, Result, anyhow, bail, ensure};
use geo::{Coord, Geometry, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};
use regex::Regex;

/// A declared source coordinate reference system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crs {
    /// An EPSG code from the supported set (geographic, web mercator, UTM).
    Epsg(u32),
    /// A raw PROJ.4 definition.
    Proj4(String),
}

impl Crs {
    /// WGS84 longitude/latitude, the coordinate system the web map draws in.
    pub const WGS84: Crs = Crs::Epsg(4326);

    /// Parse a user declaration: `EPSG:<code>` or a `+proj=` string.
    pub fn parse(declared: &str) -> Result<Self> {
        let declared = declared.trim();
        if declared.starts_with("+proj=") {
            return Ok(Self::Proj4(declared.to_string()))
        }

        let code = declared.get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
            .map(|_| &declared[5..])
            .ok_or_else(|| anyhow!("[geom::proj] Unrecognized CRS declaration: {declared:?} (expected EPSG:<code> or +proj=...)"))?;
        let code: u32 = code.trim().parse()
            .with_context(|| format!("[geom::proj] Invalid EPSG code in {declared:?}"))?;

        let crs = Self::Epsg(code);
        crs.to_proj4()?;
        Ok(crs)
    }

    /// Derive the CRS from the WKT text of a shapefile `.prj` sidecar.
    pub fn from_prj(wkt: &str) -> Result<Self> {
        static AUTHORITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"AUTHORITY\["EPSG",\s*"?(\d+)"?\]\s*\]\s*$"#).unwrap());
        static UTM_ZONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)UTM[ _]zone[ _]?(\d{1,2})\s*([NS])").unwrap());

        let wkt = wkt.trim();

        if let Some(code) = AUTHORITY.captures(wkt).and_then(|c| c[1].parse().ok()) {
            let crs = Self::Epsg(code);
            if crs.to_proj4().is_ok() { return Ok(crs) }
        }

        let upper = wkt.to_ascii_uppercase();
        let is_nad83 = upper.contains("NAD83") || upper.contains("NAD_1983") || upper.contains("NORTH_AMERICAN_DATUM_1983");

        if upper.starts_with("GEOGCS") || upper.starts_with("GEOGCRS") {
            return Ok(Self::Epsg(if is_nad83 { 4269 } else { 4326 }))
        }

        if let Some(captures) = UTM_ZONE.captures(wkt) {
            let zone: u32 = captures[1].parse()?;
            ensure!((1..=60).contains(&zone), "[geom::proj] UTM zone out of range in .prj: {zone}");
            let north = captures[2].eq_ignore_ascii_case("N");
            // EPSG only numbers NAD83 UTM for northern zones 1 to 23.
            return Ok(match (is_nad83, north) {
                (true, true) if zone <= 23 => Self::Epsg(26900 + zone),
                (true, _) => Self::Proj4(utm_proj4(zone, north, "NAD83")),
                (false, true) => Self::Epsg(32600 + zone),
                (false, false) => Self::Epsg(32700 + zone),
            })
        }

        if upper.contains("MERCATOR_AUXILIARY_SPHERE") || upper.contains("PSEUDO-MERCATOR") || upper.contains("WEB_MERCATOR") {
            return Ok(Self::Epsg(3857))
        }

        if upper.contains("TRANSVERSE_MERCATOR") {
            return transverse_mercator_from_wkt(wkt).map(Self::Proj4)
        }

        bail!("[geom::proj] Unknown coordinate system in .prj; declare it explicitly (EPSG:<code> or +proj=...)")
    }

    /// True if coordinates are longitude/latitude degrees.
    pub fn is_geographic(&self) -> bool {
        match self {
            Self::Epsg(code) => matches!(code, 4326 | 4269),
            Self::Proj4(def) => def.contains("+proj=longlat") || def.contains("+proj=latlong"),
        }
    }

    /// Build the PROJ.4 definition for this CRS.
    pub fn to_proj4(&self) -> Result<String> {
        Ok(match self {
            Self::Proj4(def) => def.clone(),
            Self::Epsg(4326) => "+proj=longlat +datum=WGS84 +no_defs +type=crs".into(),
            Self::Epsg(4269) => "+proj=longlat +datum=NAD83 +no_defs +type=crs".into(),
            Self::Epsg(3857) => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs".into(),
            Self::Epsg(code @ 32601..=32660) => utm_proj4(code - 32600, true, "WGS84"),
            Self::Epsg(code @ 32701..=32760) => utm_proj4(code - 32700, false, "WGS84"),
            Self::Epsg(code @ 26901..=26923) => utm_proj4(code - 26900, true, "NAD83"),
            Self::Epsg(code) => bail!("[geom::proj] Unsupported EPSG code {code}; declare a +proj= string instead"),
        })
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epsg(code) => write!(f, "EPSG:{code}"),
            Self::Proj4(def) => write!(f, "{def}"),
        }
    }
}

/// Build PROJ.4 string for a UTM zone.
#[inline]
fn utm_proj4(zone: u32, north: bool, datum: &str) -> String {
    let south = if north { "" } else { " +south" };
    format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs")
}

/// Build a `+proj=tmerc` definition from WKT projection parameters and spheroid.
fn transverse_mercator_from_wkt(wkt: &str) -> Result<String> {
    static PARAMETER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"PARAMETER\["([^"]+)",\s*(-?[0-9.eE+-]+)\]"#).unwrap());
    static TOWGS84: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"TOWGS84\[([^\]]*)\]"#).unwrap());
    static SPHEROID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"SPHEROID\["[^"]*",\s*([0-9.eE+-]+),\s*([0-9.eE+-]+)"#).unwrap());

    let params: HashMap<String, f64> = PARAMETER.captures_iter(wkt)
        .filter_map(|c| Some((c[1].to_ascii_lowercase(), c[2].parse().ok()?)))
        .collect();
    let param = |name: &str, default: f64| params.get(name).copied().unwrap_or(default);

    let spheroid = SPHEROID.captures(wkt)
        .ok_or_else(|| anyhow!("[geom::proj] Transverse_Mercator .prj has no SPHEROID"))?;
    let a: f64 = spheroid[1].parse()?;
    let rf: f64 = spheroid[2].parse()?;
    let ellipsoid = if rf == 0.0 { format!("+a={a} +b={a}") } else { format!("+a={a} +rf={rf}") };

    // Datum shift to WGS84, when the WKT carries one.
    let towgs84 = match TOWGS84.captures(wkt) {
        Some(c) => {
            let values = c[1].split(',')
                .map(|v| v.trim().parse::<f64>().map(|v| v.to_string()))
                .collect::<Result<Vec<_>, _>>()
                .context("[geom::proj] Invalid TOWGS84 parameters in .prj")?;
            ensure!(matches!(values.len(), 3 | 7), "[geom::proj] TOWGS84 needs 3 or 7 parameters, got {}", values.len());
            format!(" +towgs84={}", values.join(","))
        }
        None => String::new(),
    };

    Ok(format!(
        "+proj=tmerc +lat_0={} +lon_0={} +k={} +x_0={} +y_0={} {ellipsoid}{towgs84} +units=m +no_defs +type=crs",
        param("latitude_of_origin", 0.0),
        param("central_meridian", 0.0),
        param("scale_factor", 1.0),
        param("false_easting", 0.0),
        param("false_northing", 0.0),
    ))
}

/// Transforms geometries from a source CRS to WGS84 longitude/latitude degrees.
pub struct Reprojector {
    from: Proj4,
    to: Proj4,
    geographic_source: bool,
}

impl Reprojector {
    /// Prepare a transform from `source` to WGS84.
    pub fn to_wgs84(source: &Crs) -> Result<Self> {
        let from = {
            let proj_string = source.to_proj4()?;
            Proj4::from_proj_string(&proj_string)
                .map_err(|e| anyhow!("[geom::proj] failed to build source PROJ.4 {proj_string:?}: {e:?}"))?
        };

        let to = {
            let proj_string = Crs::WGS84.to_proj4()?;
            Proj4::from_proj_string(&proj_string)
                .map_err(|e| anyhow!("[geom::proj] failed to build target PROJ.4 {proj_string:?}: {e:?}"))?
        };

        Ok(Self { from, to, geographic_source: source.is_geographic() })
    }

    /// Transform a single coordinate to lon/lat degrees.
    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        // Geographic input is handed to PROJ in radians, projected input in meters.
        let mut point = if self.geographic_source {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        transform(&self.from, &self.to, &mut point)
            .map_err(|e| anyhow!("[geom::proj] CRS transform failed at ({}, {}): {e:?}", coord.x, coord.y))?;

        let lonlat = Coord { x: point.0.to_degrees(), y: point.1.to_degrees() };
        ensure!(lonlat.x.is_finite() && lonlat.y.is_finite(),
            "[geom::proj] CRS transform produced a non-finite coordinate for ({}, {})", coord.x, coord.y);
        Ok(lonlat)
    }

    /// Transform every coordinate of a geometry.
    pub fn reproject(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|coord| self.transform_coord(coord))
    }
}
