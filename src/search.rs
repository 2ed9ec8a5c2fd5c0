//! Name → bounding-box lookup behind the client-side search control.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{feature::FeatureCollection, geom::BoundingBox};

/// Display names mapped to the bounding box of the feature carrying them.
///
/// Names are expected to be unique. When they are not, the feature processed
/// last wins; earlier entries under the same name are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchIndex {
    entries: BTreeMap<String, BoundingBox>,
}

impl SearchIndex {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Look up the box for a display name.
    pub fn get(&self, name: &str) -> Option<&BoundingBox> { self.entries.get(name) }

    #[inline] pub fn contains(&self, name: &str) -> bool { self.entries.contains_key(name) }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundingBox)> {
        self.entries.iter().map(|(name, bbox)| (name.as_str(), bbox))
    }

    /// Insert an entry, returning the box it replaced.
    pub fn insert(&mut self, name: impl Into<String>, bbox: BoundingBox) -> Option<BoundingBox> {
        self.entries.insert(name.into(), bbox)
    }

    /// The table the client script consumes: `{ name: [minX, minY, maxX, maxY] }`,
    /// with names in sorted order.
    pub fn to_json_table(&self) -> Result<Value> {
        serde_json::to_value(self).context("[search] Failed to serialize search table")
    }
}

/// Build the search index from indexed features, reading names from `name_field`.
/// Features with an empty or missing name are skipped.
pub fn build(features: &FeatureCollection, name_field: &str) -> Result<SearchIndex> {
    let mut index = SearchIndex::new();
    let (mut unnamed, mut overwritten) = (0usize, 0usize);

    for (i, feature) in features.iter().enumerate() {
        let Some(name) = feature.attributes().get(name_field).and_then(|value| value.as_text()) else {
            unnamed += 1;
            continue
        };
        let bbox = feature.bbox()
            .ok_or_else(|| anyhow!("[search] feature {i} ({name:?}) has no bounding box; index features first"))?;

        if index.insert(name, *bbox).is_some() {
            overwritten += 1;
            debug!(name, "[search] duplicate display name; keeping the later feature");
        }
    }

    info!(entries = index.len(), unnamed, overwritten, "[search] built search index");
    Ok(index)
}
