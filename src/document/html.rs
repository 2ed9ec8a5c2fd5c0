//! HTML rendering of a [`Document`] as a standalone Leaflet page.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};

use super::{Document, Panel, RenderedFeature, popup::escape_html};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const GEOCODER_CSS: &str = "https://unpkg.com/leaflet-control-geocoder@2.4.0/dist/Control.Geocoder.css";
const GEOCODER_JS: &str = "https://unpkg.com/leaflet-control-geocoder@2.4.0/dist/Control.Geocoder.js";

/// Serialize a value for inline `<script>` use. `</` is escaped so embedded
/// strings can never close the script element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// GeoJSON feature collection for the overlay, with render data in `properties`.
fn overlay_geojson(features: &[RenderedFeature]) -> Value {
    let features: Vec<Value> = features.iter()
        .map(|feature| json!({
            "type": "Feature",
            "geometry": feature.geometry,
            "properties": {
                "style": feature.style,
                "popup": feature.popup,
                "tooltip": feature.tooltip,
            },
        }))
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Write the complete page.
pub(crate) fn write_document<W: Write>(writer: &mut W, document: &Document) -> Result<()> {
    write_head(writer, document)?;
    write_panels(writer, document.panels())?;
    writeln!(writer, "<script>")?;
    write_map(writer, document)?;
    write_overlay(writer, document)?;
    write_search(writer, document)?;
    write_geocoder(writer, document)?;
    writeln!(writer, "</script>")?;
    writeln!(writer, "</body>")?;
    writeln!(writer, "</html>")?;
    Ok(())
}

/// Doctype, `<head>` with library links and styles, and the map container.
pub(crate) fn write_head<W: Write>(writer: &mut W, document: &Document) -> Result<()> {
    writeln!(writer, "<!DOCTYPE html>")?;
    writeln!(writer, "<html>")?;
    writeln!(writer, "<head>")?;
    writeln!(writer, r#"<meta charset="utf-8">"#)?;
    writeln!(writer, r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#)?;
    writeln!(writer, "<title>{}</title>", escape_html(document.title()))?;
    writeln!(writer, r#"<link rel="stylesheet" href="{LEAFLET_CSS}">"#)?;
    writeln!(writer, r#"<link rel="stylesheet" href="{GEOCODER_CSS}">"#)?;
    writeln!(writer, r#"<script src="{LEAFLET_JS}"></script>"#)?;
    writeln!(writer, r#"<script src="{GEOCODER_JS}"></script>"#)?;
    writeln!(writer, r##"<style>
    html, body {{ margin: 0; padding: 0; height: 100%; }}
    #map {{ position: absolute; top: 0; bottom: 0; left: 0; right: 0; }}
    .map-title {{
        position: fixed; top: 10px; left: 50%; transform: translateX(-50%);
        background-color: rgba(255, 255, 255, 0.7); padding: 10px 20px;
        font-size: 20px; font-weight: bold; border-radius: 5px;
        box-shadow: 2px 2px 5px rgba(0, 0, 0, 0.2); z-index: 9999;
    }}
    .map-footer {{
        position: fixed; bottom: 55px; right: 10px;
        background-color: rgba(255, 255, 255, 0.7); padding: 3px 5px;
        font-size: 12px; text-align: right; border-radius: 5px;
        box-shadow: 2px 2px 5px rgba(0, 0, 0, 0.2); z-index: 999;
    }}
    .map-footer a {{ color: #0073b1; text-decoration: none; }}
    .map-legend {{
        position: fixed; bottom: 40px; left: 10px;
        box-shadow: 2px 2px 5px rgba(0, 0, 0, 0.2); z-index: 9999;
    }}
    .map-legend img {{ width: 250px; opacity: 0.7; }}
    .feature-search input {{ width: 200px; padding: 4px 6px; font-size: 13px; }}
</style>"##)?;
    writeln!(writer, "</head>")?;
    writeln!(writer, "<body>")?;
    writeln!(writer, r#"<div id="map"></div>"#)?;
    Ok(())
}

/// Fixed-position title, legend and footer panels.
pub(crate) fn write_panels<W: Write>(writer: &mut W, panels: &[Panel]) -> Result<()> {
    for panel in panels {
        match panel {
            Panel::Title(text) =>
                writeln!(writer, r#"<div class="map-title">{}</div>"#, escape_html(text))?,
            Panel::Legend { src } =>
                writeln!(writer, r#"<div class="map-legend"><img src="{}" alt="Legend"></div>"#, escape_html(src))?,
            Panel::Footer { html } =>
                writeln!(writer, r#"<div class="map-footer">{html}</div>"#)?,
        }
    }
    Ok(())
}

/// The map object, scale bar and base layers. The first base layer is shown initially.
pub(crate) fn write_map<W: Write>(writer: &mut W, document: &Document) -> Result<()> {
    let view = document.view();
    writeln!(writer, "const map = L.map('map', {{ center: {}, zoom: {} }});",
        script_json(&view.center)?, view.zoom)?;
    if view.scale_bar {
        writeln!(writer, "L.control.scale().addTo(map);")?;
    }

    writeln!(writer, "const baseLayers = {{}};")?;
    for (i, layer) in document.base_layers().iter().enumerate() {
        writeln!(writer, "baseLayers[{}] = L.tileLayer({}, {{ attribution: {}, maxZoom: 20 }});",
            script_json(&layer.name)?, script_json(&layer.url)?, script_json(&layer.attribution)?)?;
        if i == 0 {
            writeln!(writer, "baseLayers[{}].addTo(map);", script_json(&layer.name)?)?;
        }
    }
    Ok(())
}

/// The feature overlay with per-feature style, popup and tooltip, plus the layer control.
pub(crate) fn write_overlay<W: Write>(writer: &mut W, document: &Document) -> Result<()> {
    let overlay = document.overlay();
    writeln!(writer, "const overlayData = {};", script_json(&overlay_geojson(&overlay.features))?)?;
    writeln!(writer, r#"const overlay = L.geoJSON(overlayData, {{
    style: (feature) => feature.properties.style,
    pointToLayer: (feature, latlng) => L.circleMarker(latlng, feature.properties.style),
    onEachFeature: (feature, layer) => {{
        layer.bindPopup(feature.properties.popup, {{ maxWidth: 300 }});
        if (feature.properties.tooltip) {{ layer.bindTooltip(feature.properties.tooltip); }}
    }}
}}).addTo(map);"#)?;
    writeln!(writer, "L.control.layers(baseLayers, {{ [{}]: overlay }}, {{ collapsed: {} }}).addTo(map);",
        script_json(&overlay.name)?, document.layer_control().collapsed)?;
    Ok(())
}

/// Name search over the overlay: an input bound to a datalist of names, zooming
/// to the chosen feature's bounds.
pub(crate) fn write_search<W: Write>(writer: &mut W, document: &Document) -> Result<()> {
    let search = document.search();
    writeln!(writer, "const searchTable = {};", script_json(&search.index.to_json_table()?)?)?;
    writeln!(writer, r#"const FeatureSearch = L.Control.extend({{
    onAdd: function () {{
        const container = L.DomUtil.create('div', 'feature-search leaflet-bar');
        const input = L.DomUtil.create('input', '', container);
        const list = L.DomUtil.create('datalist', '', container);
        list.id = 'feature-search-names';
        input.setAttribute('list', list.id);
        input.placeholder = this.options.placeholder;
        for (const name of Object.keys(searchTable)) {{
            const option = document.createElement('option');
            option.value = name;
            list.appendChild(option);
        }}
        L.DomEvent.disableClickPropagation(container);
        L.DomEvent.on(input, 'change', () => {{
            if (!Object.hasOwn(searchTable, input.value)) {{ return; }}
            const b = searchTable[input.value];
            map.fitBounds([[b[1], b[0]], [b[3], b[2]]], {{ maxZoom: 16 }});
        }});
        return container;
    }}
}});"#)?;
    writeln!(writer, "new FeatureSearch({{ position: '{}', placeholder: {} }}).addTo(map);",
        search.position.as_str(), script_json(&search.placeholder)?)?;
    Ok(())
}

/// Place-name geocoder backed by Nominatim.
pub(crate) fn write_geocoder<W: Write>(writer: &mut W, document: &Document) -> Result<()> {
    let geocoder = document.geocoder();
    writeln!(writer, "L.Control.geocoder({{ position: '{}', placeholder: {}, defaultMarkGeocode: {}, geocoder: L.Control.Geocoder.nominatim() }}).addTo(map);",
        geocoder.position.as_str(), script_json(&geocoder.placeholder)?, geocoder.add_marker)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        document::{
            GeocoderControl, LayerControl, MapView, OverlayLayer, Position, SearchControl, TileLayer,
        },
        geom::BoundingBox,
        search::SearchIndex,
        style::Style,
    };

    fn document(panels: Vec<Panel>) -> Document {
        let mut index = SearchIndex::new();
        index.insert("Plant-1", BoundingBox::new(85.0, 27.0, 86.0, 28.0));

        Document {
            title: "Power Plants".into(),
            view: MapView { center: [27.5, 85.5], zoom: 7, scale_bar: true },
            base_layers: vec![
                TileLayer { name: "Satellite".into(), url: "https://tiles/{z}/{x}/{y}".into(), attribution: "Tiles".into() },
                TileLayer { name: "Streets".into(), url: "https://streets/{z}/{x}/{y}".into(), attribution: "OSM".into() },
            ],
            overlay: OverlayLayer {
                name: "Projects".into(),
                features: vec![RenderedFeature {
                    geometry: json!({ "type": "Point", "coordinates": [85.5, 27.5] }),
                    style: Style::fallback(),
                    popup: "<div><b>Project:</b> Plant-1</script><br></div>".into(),
                    tooltip: Some("Plant-1".into()),
                }],
            },
            search: SearchControl { placeholder: "Search projects...".into(), position: Position::TopRight, index },
            geocoder: GeocoderControl { placeholder: "Search places...".into(), position: Position::BottomRight, add_marker: true },
            layer_control: LayerControl { collapsed: false },
            panels,
        }
    }

    fn render(document: &Document) -> String {
        let mut buffer = Vec::new();
        write_document(&mut buffer, document).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn page_has_every_control() {
        let html = render(&document(vec![]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Power Plants</title>"));
        assert!(html.contains("L.control.scale().addTo(map);"));
        assert!(html.contains(r#"baseLayers["Satellite"].addTo(map);"#));
        assert!(!html.contains(r#"baseLayers["Streets"].addTo(map);"#));
        assert!(html.contains("L.control.layers(baseLayers"));
        assert!(html.contains("new FeatureSearch({ position: 'topright'"));
        assert!(html.contains("L.Control.geocoder({ position: 'bottomright'"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn search_table_is_embedded() {
        let html = render(&document(vec![]));
        assert!(html.contains(r#"const searchTable = {"Plant-1":[85.0,27.0,86.0,28.0]};"#));
    }

    #[test]
    fn search_ignores_inherited_names() {
        let html = render(&document(vec![]));
        let guard = html.find("if (!Object.hasOwn(searchTable, input.value)) { return; }").unwrap();
        let lookup = html.find("const b = searchTable[input.value];").unwrap();
        assert!(guard < lookup);
    }

    #[test]
    fn embedded_json_cannot_close_the_script() {
        let html = render(&document(vec![]));
        let script = html.split("<script>\n").nth(1).unwrap();
        let body = script.split("\n</script>").next().unwrap();
        assert!(!body.contains("</"));
        assert!(body.contains(r"<\/script>"));
    }

    #[test]
    fn panels_are_rendered() {
        let html = render(&document(vec![
            Panel::Title("A & B".into()),
            Panel::Legend { src: "Legend.png".into() },
            Panel::Footer { html: "Made by <a href=\"#\">me</a>".into() },
        ]));
        assert!(html.contains(r#"<div class="map-title">A &amp; B</div>"#));
        assert!(html.contains(r#"<img src="Legend.png" alt="Legend">"#));
        assert!(html.contains(r##"<div class="map-footer">Made by <a href="#">me</a></div>"##));
    }

    #[test]
    fn scale_bar_is_optional() {
        let mut document = document(vec![]);
        document.view.scale_bar = false;
        assert!(!render(&document).contains("L.control.scale()"));
    }

    #[test]
    fn overlay_carries_render_properties() {
        let overlay = overlay_geojson(&document(vec![]).overlay.features);
        let properties = &overlay["features"][0]["properties"];
        assert_eq!(properties["style"]["dashArray"], "6 4");
        assert_eq!(properties["tooltip"], "Plant-1");
    }
}
