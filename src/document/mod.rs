//! The compiled map document: a typed model of everything on the page,
//! serialized once by the HTML renderer.

mod html;
mod popup;

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::{
    config::MapConfig,
    geom::geometry_to_geojson,
    search::SearchIndex,
    spatial::IndexedCollection,
    style::Style,
};

/// Corner a control is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position { TopLeft, TopRight, BottomLeft, BottomRight }

impl Position {
    /// Leaflet's name for the corner.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "topleft",
            Self::TopRight => "topright",
            Self::BottomLeft => "bottomleft",
            Self::BottomRight => "bottomright",
        }
    }
}

/// Initial view of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    /// `[lat, lon]` in degrees.
    pub center: [f64; 2],
    pub zoom: u8,
    pub scale_bar: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
}

/// One feature as drawn: lon/lat GeoJSON geometry, outline style, popup and tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub geometry: Value,
    pub style: Style,
    pub popup: String,
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub name: String,
    pub features: Vec<RenderedFeature>,
}

/// Name search over the dataset's own features, resolved entirely client-side.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchControl {
    pub placeholder: String,
    pub position: Position,
    pub index: SearchIndex,
}

/// Place-name search backed by an external geocoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderControl {
    pub placeholder: String,
    pub position: Position,
    pub add_marker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerControl {
    pub collapsed: bool,
}

/// Static content drawn over the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Title(String),
    Legend { src: String },
    /// Trusted HTML, inserted as-is.
    Footer { html: String },
}

/// The whole interactive map. Built once per run and never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    view: MapView,
    base_layers: Vec<TileLayer>,
    overlay: OverlayLayer,
    search: SearchControl,
    geocoder: GeocoderControl,
    layer_control: LayerControl,
    panels: Vec<Panel>,
}

impl Document {
    #[inline] pub fn title(&self) -> &str { &self.title }
    #[inline] pub fn view(&self) -> &MapView { &self.view }
    #[inline] pub fn base_layers(&self) -> &[TileLayer] { &self.base_layers }
    #[inline] pub fn overlay(&self) -> &OverlayLayer { &self.overlay }
    #[inline] pub fn search(&self) -> &SearchControl { &self.search }
    #[inline] pub fn geocoder(&self) -> &GeocoderControl { &self.geocoder }
    #[inline] pub fn layer_control(&self) -> &LayerControl { &self.layer_control }
    #[inline] pub fn panels(&self) -> &[Panel] { &self.panels }

    /// Render the document as a standalone HTML page.
    pub fn to_html(&self) -> Result<String> {
        let mut buffer = Vec::new();
        html::write_document(&mut buffer, self)?;
        String::from_utf8(buffer).context("[document] HTML output is not valid UTF-8")
    }

    /// SHA-256 of the rendered page, hex encoded. Equal inputs give equal digests.
    pub fn digest(&self) -> Result<String> {
        Ok(hex::encode(Sha256::digest(self.to_html()?.as_bytes())))
    }

    /// Write the rendered page to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("[document] Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        html::write_document(&mut writer, self)
            .and_then(|()| writer.flush().map_err(Into::into))
            .with_context(|| format!("[document] Failed to write {}", path.display()))
    }
}

/// Assemble the document from the indexed features and the search index.
pub fn compile(config: &MapConfig, indexed: &IndexedCollection, index: &SearchIndex) -> Result<Document> {
    let fields = &config.fields;
    let excluded = [fields.color.as_str(), fields.width.as_str()];

    let features = indexed.features().iter()
        .enumerate()
        .map(|(i, feature)| {
            let style = feature.style()
                .ok_or_else(|| anyhow!("[document] feature {i} has no resolved style"))?;
            Ok(RenderedFeature {
                geometry: geometry_to_geojson(feature.geometry()),
                style: style.clone(),
                popup: popup::popup_html(feature.attributes(), &excluded),
                tooltip: feature.attributes().get(&fields.name)
                    .and_then(|value| value.as_text())
                    .map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let center = match (config.view.center, indexed.center()) {
        (Some(center), _) => center,
        (None, Some(point)) => [point.y(), point.x()],
        (None, None) => {
            warn!("[document] no features to center on; using [0, 0]");
            [0.0, 0.0]
        }
    };

    let panels = config.panels.title.iter().cloned().map(Panel::Title)
        .chain(config.panels.legend.iter().map(|src| Panel::Legend { src: src.clone() }))
        .chain(config.panels.footer.iter().map(|html| Panel::Footer { html: html.clone() }))
        .collect();

    let document = Document {
        title: config.panels.title.clone().unwrap_or_else(|| config.controls.overlay_name.clone()),
        view: MapView { center, zoom: config.view.zoom, scale_bar: config.view.scale_bar },
        base_layers: config.base_layers.iter()
            .map(|layer| TileLayer {
                name: layer.name.clone(),
                url: layer.url.clone(),
                attribution: layer.attribution.clone(),
            })
            .collect(),
        overlay: OverlayLayer { name: config.controls.overlay_name.clone(), features },
        search: SearchControl {
            placeholder: config.controls.search_placeholder.clone(),
            position: Position::TopRight,
            index: index.clone(),
        },
        geocoder: GeocoderControl {
            placeholder: config.controls.geocoder_placeholder.clone(),
            position: Position::BottomRight,
            add_marker: true,
        },
        layer_control: LayerControl { collapsed: config.controls.layers_collapsed },
        panels,
    };

    info!(
        features = document.overlay.features.len(),
        searchable = document.search.index.len(),
        panels = document.panels.len(),
        "[document] compiled map document"
    );
    Ok(document)
}
