//! End-to-end: read sources → join → style → index → search → document.

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::MapConfig,
    document::{self, Document},
    io::{AttributeSource, CsvSource, GeometrySource, ShapefileSource},
    join, search, spatial, style,
};

/// Compile a document from already-constructed sources.
/// Keep this thin; all work lives in the stage modules.
pub fn compile(config: &MapConfig, geometry: &dyn GeometrySource, attributes: &dyn AttributeSource) -> Result<Document> {
    config.validate()?;

    let mut table = geometry.read_geometry().context("[pipeline] Failed to read geometry source")?;
    let rows = attributes.read_rows().context("[pipeline] Failed to read attribute source")?;
    if let Some(crs) = config.source_crs()? {
        info!(%crs, "[pipeline] using configured source CRS");
        table.crs = Some(crs);
    }

    let joined = join::join(table, rows, &config.join).context("[pipeline] join stage failed")?;
    let styled = style::resolve(joined, &config.fields);
    let indexed = spatial::index(styled).context("[pipeline] spatial stage failed")?;
    let index = search::build(indexed.features(), &config.fields.name).context("[pipeline] search stage failed")?;

    document::compile(config, &indexed, &index).context("[pipeline] document stage failed")
}

/// Read the configured shapefile and CSV, compile the document and write it
/// to `config.output`.
pub fn run(config: &MapConfig) -> Result<Document> {
    let document = compile(
        config,
        &ShapefileSource::new(&config.geometry),
        &CsvSource::new(&config.attributes),
    )?;

    document.write(&config.output)?;
    info!(output = %config.output.display(), digest = %document.digest()?, "[pipeline] wrote map document");
    Ok(document)
}
