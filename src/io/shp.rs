//! ESRI shapefile reading operations.

use std::{collections::BTreeMap, fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use shapefile::{Reader, dbase};
use tracing::debug;

use crate::{
    feature::{AttrValue, Attributes},
    geom::{Crs, geometry_kind, shape_to_geometry},
    io::{GeometryRecord, GeometrySource, GeometryTable},
};

/// A `.shp` file with its `.dbf` table and optional `.prj` sidecar.
#[derive(Debug, Clone)]
pub struct ShapefileSource {
    path: PathBuf,
}

impl ShapefileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    #[inline] pub fn path(&self) -> &Path { &self.path }
}

impl GeometrySource for ShapefileSource {
    fn read_geometry(&self) -> Result<GeometryTable> {
        read_shapefile(&self.path)
    }
}

/// Reads all shapes + attribute records from a given `.shp` file path.
/// Attributes keep the `.dbf` field order.
pub fn read_shapefile(path: &Path) -> Result<GeometryTable> {
    let fields = read_dbf_fields(&path.with_extension("dbf"))?;
    let crs = read_prj(&path.with_extension("prj"))?;

    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut records = Vec::new();
    for (i, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp] Error reading shape+record {i} in {}", path.display()))?;
        let geometry = shape_to_geometry(shape)
            .with_context(|| format!("[io::shp] Error converting shape {i} in {}", path.display()))?;
        let attributes: Attributes = fields.iter()
            .map(|field| (field.clone(), record.get(field).cloned().map_or(AttrValue::Null, AttrValue::from)))
            .collect();
        records.push(GeometryRecord { geometry, attributes });
    }

    debug!(path = %path.display(), records = records.len(), crs = ?crs, "read shapefile");
    Ok(GeometryTable { crs, fields, records })
}

/// Read the field names of a `.dbf` table, in declaration order.
fn read_dbf_fields(path: &Path) -> Result<Vec<String>> {
    let reader = dbase::Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open attribute table: {}", path.display()))?;
    Ok(reader.fields().iter().map(|field| field.name().to_string()).collect())
}

/// Read the CRS declared by a `.prj` sidecar. A missing sidecar declares nothing;
/// an unrecognized one is an error.
fn read_prj(path: &Path) -> Result<Option<Crs>> {
    if !path.exists() { return Ok(None) }
    let wkt = fs::read_to_string(path)
        .with_context(|| format!("[io::shp] Failed to read {}", path.display()))?;
    Crs::from_prj(&wkt)
        .with_context(|| format!("[io::shp] Could not interpret {}", path.display()))
        .map(Some)
}

/// Summary of a shapefile, for choosing join keys and checking the CRS.
#[derive(Debug, Clone)]
pub struct ShapefileSummary {
    pub records: usize,
    pub crs: Option<Crs>,
    pub geometry_mix: BTreeMap<&'static str, usize>,
    pub fields: Vec<(String, AttrValue)>,
}

impl ShapefileSummary {
    pub fn of(table: &GeometryTable) -> Self {
        let mut geometry_mix = BTreeMap::new();
        for record in &table.records {
            *geometry_mix.entry(geometry_kind(&record.geometry)).or_default() += 1;
        }

        let fields = table.fields.iter()
            .map(|field| {
                let sample = table.records.first()
                    .and_then(|record| record.attributes.get(field))
                    .cloned()
                    .unwrap_or(AttrValue::Null);
                (field.clone(), sample)
            })
            .collect();

        Self { records: table.records.len(), crs: table.crs.clone(), geometry_mix, fields }
    }
}
