//! Joining attribute rows onto geometry records.

use ahash::AHashMap;
use anyhow::{Result, ensure};
use tracing::{debug, info};

use crate::{
    config::{JoinConfig, UnmatchedPolicy},
    feature::{AttrValue, Attributes, Feature, FeatureCollection},
    io::{AttributeTable, GeometryTable},
};

/// Composite join key: canonical strings of the key attributes, in key order.
type JoinKey = Vec<String>;

/// Build the composite key of a record or row. `None` if any part is missing.
/// Parts flagged in `numeric` compare by number, so text `"7.0"` matches `7`.
fn join_key(attributes: &Attributes, keys: &[String], numeric: &[bool]) -> Option<JoinKey> {
    keys.iter()
        .zip(numeric)
        .map(|(key, &numeric)| {
            let value = attributes.get(key)?;
            if numeric { value.numeric_join_key() } else { value.join_key() }
        })
        .collect()
}

/// Merge attribute rows onto geometry records by the configured join key.
///
/// A record matching several rows yields one feature per row, in row order.
/// Row values win over geometry values on a name collision. Unmatched records
/// are dropped or kept per [`UnmatchedPolicy`]; kept records carry every table
/// column as null.
pub fn join(geometry: GeometryTable, table: AttributeTable, config: &JoinConfig) -> Result<FeatureCollection> {
    let keys = &config.keys;
    ensure!(!keys.is_empty(), "[join] no join key declared");
    for key in keys {
        ensure!(geometry.fields.contains(key),
            "[join] join key {key:?} is absent from the geometry schema (fields: {})", geometry.fields.join(", "));
        ensure!(table.columns.contains(key),
            "[join] join key {key:?} is absent from the attribute schema (columns: {})", table.columns.join(", "));
    }

    let table = match &config.columns {
        Some(columns) => {
            for column in columns {
                ensure!(table.columns.contains(column), "[join] selected column {column:?} is absent from the attribute schema");
            }
            let selected: Vec<String> = keys.iter()
                .filter(|key| !columns.contains(key))
                .chain(columns)
                .cloned()
                .collect();
            table.select(&selected)
        }
        None => table,
    };

    // Columns merged onto each record; keys are already present on the record.
    let merged: Vec<&String> = table.columns.iter().filter(|c| !keys.contains(c)).collect();

    for o in &config.overrides {
        ensure!(geometry.fields.contains(&o.source) || merged.contains(&&o.source),
            "[join] override source {:?} is absent from both schemas", o.source);
    }

    // A key is numeric when either side stores it as a number; text-to-text keys
    // such as "007" keep their exact form.
    let numeric: Vec<bool> = keys.iter()
        .map(|key| {
            let is_number = |attributes: &Attributes| matches!(attributes.get(key), Some(AttrValue::Number(_)));
            geometry.records.iter().any(|record| is_number(&record.attributes))
                || table.rows.iter().any(is_number)
        })
        .collect();

    let mut index: AHashMap<JoinKey, Vec<usize>> = AHashMap::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        if let Some(key) = join_key(row, keys, &numeric) {
            index.entry(key).or_default().push(i);
        }
    }

    let (mut matched, mut dropped, mut kept) = (0usize, 0usize, 0usize);
    let mut features = Vec::with_capacity(geometry.records.len());

    for record in geometry.records {
        let rows = join_key(&record.attributes, keys, &numeric).and_then(|key| index.get(&key));
        match (rows, config.unmatched) {
            (Some(rows), _) => {
                matched += 1;
                for &row in rows {
                    let mut attributes = record.attributes.clone();
                    for &column in &merged {
                        let value = table.rows[row].get(column).cloned().unwrap_or(AttrValue::Null);
                        attributes.insert(column.clone(), value);
                    }
                    features.push(Feature::new(record.geometry.clone(), attributes));
                }
            }
            (None, UnmatchedPolicy::Drop) => {
                dropped += 1;
                debug!(key = ?join_key(&record.attributes, keys, &numeric), "[join] dropping unmatched record");
            }
            (None, UnmatchedPolicy::Keep) => {
                kept += 1;
                let mut attributes = record.attributes;
                for &column in &merged {
                    if !attributes.contains(column) { attributes.insert(column.clone(), AttrValue::Null) }
                }
                features.push(Feature::new(record.geometry, attributes));
            }
        }
    }

    let features = if config.overrides.is_empty() {
        features
    } else {
        features.into_iter()
            .map(|feature| {
                let mut attributes = feature.attributes().clone();
                for o in &config.overrides {
                    let value = attributes.remove(&o.source).unwrap_or(AttrValue::Null);
                    attributes.insert(o.target.clone(), value);
                }
                feature.with_attributes(attributes)
            })
            .collect()
    };

    info!(features = features.len(), matched, dropped, kept, policy = ?config.unmatched, "[join] joined attributes");
    Ok(FeatureCollection::new(geometry.crs, features))
}
