//! CSV reading operations.

use std::{fs::File, io::Cursor, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::CsvReadOptions};

use crate::{feature::{AttrValue, Attributes}, io::{AttributeSource, AttributeTable}};

/// A comma-separated attribute table with a header row.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    #[inline] pub fn path(&self) -> &Path { &self.path }
}

impl AttributeSource for CsvSource {
    fn read_rows(&self) -> Result<AttributeTable> {
        dataframe_to_table(&read_csv(&self.path)?)
    }
}

/// Reads a CSV file from `path` into a Polars DataFrame.
/// Every column is read as a string, so join keys such as `"007"` keep their
/// leading zeros and values render in popups exactly as written.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV from a string.
pub fn read_csv_string(csv: &str) -> Result<AttributeTable> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(csv.as_bytes()))
        .finish()
        .context("[io::csv::read] Failed to read CSV from string")?;
    dataframe_to_table(&df)
}

/// Convert an all-string DataFrame into ordered attribute rows.
fn dataframe_to_table(df: &DataFrame) -> Result<AttributeTable> {
    let columns: Vec<String> = df.get_column_names().iter().map(|name| name.to_string()).collect();

    let mut rows = vec![Attributes::new(); df.height()];
    for column in df.get_columns() {
        let name = column.name().to_string();
        let values = column.as_materialized_series().str()
            .with_context(|| format!("[io::csv::read] Column {name} is not a string column"))?;
        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            row.insert(name.clone(), AttrValue::from(value));
        }
    }

    Ok(AttributeTable { columns, rows })
}
