//! Capability contracts for the two inputs of the pipeline.

use anyhow::Result;
use geo::Geometry;

use crate::{feature::Attributes, geom::Crs};

/// One geometry record with its raw attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    pub geometry: Geometry<f64>,
    pub attributes: Attributes,
}

/// Everything a vector reader yields: declared CRS, field schema, records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryTable {
    pub crs: Option<Crs>,
    pub fields: Vec<String>,
    pub records: Vec<GeometryRecord>,
}

/// Everything a tabular reader yields: column schema and rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    pub columns: Vec<String>,
    pub rows: Vec<Attributes>,
}

/// Reads records with geometry.
pub trait GeometrySource {
    fn read_geometry(&self) -> Result<GeometryTable>;
}

/// Reads attribute rows.
pub trait AttributeSource {
    fn read_rows(&self) -> Result<AttributeTable>;
}

impl GeometrySource for GeometryTable {
    fn read_geometry(&self) -> Result<GeometryTable> { Ok(self.clone()) }
}

impl AttributeSource for AttributeTable {
    fn read_rows(&self) -> Result<AttributeTable> { Ok(self.clone()) }
}

impl AttributeTable {
    /// Keep only the named columns, in the given order.
    pub fn select(self, columns: &[String]) -> Self {
        let rows = self.rows.into_iter()
            .map(|row| columns.iter()
                .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                .collect())
            .collect();
        Self {
            columns: columns.iter().filter(|c| self.columns.contains(c)).cloned().collect(),
            rows,
        }
    }
}
