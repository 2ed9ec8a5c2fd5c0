//! Run configuration, read from a JSON file and threaded through every stage.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::geom::Crs;

/// What to do with a geometry record that matches no attribute row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Discard the record (inner join).
    #[default]
    Drop,
    /// Keep the record; its table columns are null and it gets the default style (left join).
    Keep,
}

/// Replace `target` with the value of `source` after the join, then remove `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverride {
    pub target: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JoinConfig {
    /// Ordered attribute names composing the join key.
    pub keys: Vec<String>,
    pub unmatched: UnmatchedPolicy,
    /// Attribute-table columns to keep; all columns when unset. Join keys are always kept.
    pub columns: Option<Vec<String>>,
    pub overrides: Vec<FieldOverride>,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            keys: vec!["Group".into()],
            unmatched: UnmatchedPolicy::Drop,
            columns: None,
            overrides: Vec::new(),
        }
    }
}

/// Attribute names the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    /// Display name: tooltip text and search key.
    pub name: String,
    pub color: String,
    pub width: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self { name: "Project".into(), color: "Color".into(), width: "Line_wt".into() }
    }
}

/// A raster tile base layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileLayerConfig {
    pub name: String,
    /// URL template with `{x}`, `{y}`, `{z}` placeholders.
    pub url: String,
    pub attribution: String,
}

impl Default for TileLayerConfig {
    fn default() -> Self {
        Self {
            name: "Google Satellite Hybrid".into(),
            url: "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}".into(),
            attribution: "Google".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub zoom: u8,
    /// `[lat, lon]`; computed from the data when unset.
    pub center: Option<[f64; 2]>,
    pub scale_bar: bool,
}

impl Default for ViewConfig {
    fn default() -> Self { Self { zoom: 7, center: None, scale_bar: true } }
}

/// Static overlay panels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Title banner text.
    pub title: Option<String>,
    /// Legend image URL or path relative to the output document.
    pub legend: Option<String>,
    /// Footer HTML snippet, inserted as-is.
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    pub overlay_name: String,
    pub search_placeholder: String,
    pub geocoder_placeholder: String,
    pub layers_collapsed: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            overlay_name: "Projects".into(),
            search_placeholder: "Search projects...".into(),
            geocoder_placeholder: "Search places...".into(),
            layers_collapsed: false,
        }
    }
}

/// Full configuration of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub geometry: PathBuf,
    pub attributes: PathBuf,
    pub output: PathBuf,
    /// Source CRS declaration (`EPSG:<code>` or `+proj=`); overrides the `.prj` sidecar.
    pub crs: Option<String>,
    pub join: JoinConfig,
    pub fields: FieldConfig,
    pub base_layers: Vec<TileLayerConfig>,
    pub view: ViewConfig,
    pub panels: PanelConfig,
    pub controls: ControlConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            geometry: "AllGroup.shp".into(),
            attributes: "LicenseHref.csv".into(),
            output: "index.html".into(),
            crs: None,
            join: JoinConfig::default(),
            fields: FieldConfig::default(),
            base_layers: vec![TileLayerConfig::default()],
            view: ViewConfig::default(),
            panels: PanelConfig::default(),
            controls: ControlConfig::default(),
        }
    }
}

impl MapConfig {
    /// Read and validate a JSON configuration file. Missing fields take defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("[config] Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable before any input is read.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.join.keys.is_empty(), "[config] join.keys must name at least one attribute");
        for (i, key) in self.join.keys.iter().enumerate() {
            ensure!(!self.join.keys[..i].contains(key), "[config] join key {key:?} is listed twice");
        }
        ensure!(!self.base_layers.is_empty(), "[config] at least one base layer is required");
        ensure!(self.view.zoom <= 22, "[config] view.zoom must be within 0..=22, got {}", self.view.zoom);
        if let Some([lat, lon]) = self.view.center {
            ensure!((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon),
                "[config] view.center must be [lat, lon] in degrees, got [{lat}, {lon}]");
        }
        self.source_crs()?;
        Ok(())
    }

    /// Resolve relative input and output paths against `base`.
    pub fn relative_to(self, base: &Path) -> Self {
        let resolve = |path: PathBuf| if path.is_relative() { base.join(path) } else { path };
        Self {
            geometry: resolve(self.geometry),
            attributes: resolve(self.attributes),
            output: resolve(self.output),
            ..self
        }
    }

    /// The declared source CRS, if any.
    pub fn source_crs(&self) -> Result<Option<Crs>> {
        self.crs.as_deref()
            .map(Crs::parse)
            .transpose()
            .context("[config] Invalid crs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let config: MapConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MapConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn parses_policies_and_overrides() {
        let config: MapConfig = serde_json::from_str(r#"{
            "join": {
                "keys": ["Group", "Sub_Group"],
                "unmatched": "keep",
                "overrides": [{ "target": "Group", "source": "Category" }]
            },
            "crs": "EPSG:32645"
        }"#).unwrap();

        assert_eq!(config.join.unmatched, UnmatchedPolicy::Keep);
        assert_eq!(config.join.keys, vec!["Group", "Sub_Group"]);
        assert_eq!(config.join.overrides[0].source, "Category");
        assert_eq!(config.source_crs().unwrap(), Some(Crs::Epsg(32645)));
    }

    #[test]
    fn demo_config_is_valid() {
        let config: MapConfig = serde_json::from_str(include_str!("../demos/power_projects.json")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.join.unmatched, UnmatchedPolicy::Keep);
        assert_eq!(config.join.columns.as_deref().map(<[String]>::len), Some(3));
        assert_eq!(config.panels.legend.as_deref(), Some("Legend.png"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<MapConfig>(r#"{ "zoom": 3 }"#).is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = MapConfig::default();
        config.join.keys.clear();
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.join.keys = vec!["Group".into(), "Group".into()];
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.crs = Some("NAD27".into());
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.view.center = Some([120.0, 10.0]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        fs::write(&path, r#"{ "output": "out.html", "view": { "zoom": 9 } }"#).unwrap();

        let config = MapConfig::from_path(&path).unwrap();
        assert_eq!(config.output, PathBuf::from("out.html"));
        assert_eq!(config.view.zoom, 9);
        assert!(config.view.scale_bar);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let config = MapConfig { output: "/tmp/out.html".into(), ..MapConfig::default() }
            .relative_to(Path::new("data"));
        assert_eq!(config.geometry, Path::new("data").join("AllGroup.shp"));
        assert_eq!(config.attributes, Path::new("data").join("LicenseHref.csv"));
        assert_eq!(config.output, PathBuf::from("/tmp/out.html"));
    }
}
