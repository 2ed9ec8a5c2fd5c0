//! IO module for the pipeline inputs.
//!
//! The pipeline only depends on the [`GeometrySource`] and [`AttributeSource`]
//! contracts. Format modules provide the concrete readers:
//!
//! - `shp` - ESRI shapefile geometry with its `.dbf` table and `.prj` sidecar
//! - `csv` - CSV attribute tables

mod source;

pub(crate) mod csv;
pub(crate) mod shp;

pub use csv::{CsvSource, read_csv_string};
pub use shp::{ShapefileSource, ShapefileSummary, read_shapefile};
pub use source::{AttributeSource, AttributeTable, GeometryRecord, GeometrySource, GeometryTable};
