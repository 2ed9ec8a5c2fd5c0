//! Per-feature outline style.

use serde::Serialize;
use tracing::{info, warn};

use crate::{config::FieldConfig, feature::{Attributes, Feature, FeatureCollection}};

/// Stroke color used when a feature has no usable color.
pub const DEFAULT_STROKE_COLOR: &str = "#ff00ff";
/// Stroke width used when a feature has no usable width.
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;
/// Dash pattern marking defaulted features on the map.
pub const DEFAULT_DASH_ARRAY: &str = "6 4";

/// Resolved outline style. Serialized in the shape Leaflet's path options expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    #[serde(rename = "color")]
    pub stroke_color: String,
    #[serde(rename = "weight")]
    pub stroke_width: f64,
    #[serde(rename = "fill")]
    pub filled: bool,
    #[serde(rename = "dashArray", skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<&'static str>,
    /// True when the default style stood in for missing values.
    #[serde(skip)]
    pub defaulted: bool,
}

impl Style {
    /// The documented fallback style: dashed magenta outline.
    pub fn fallback() -> Self {
        Self {
            stroke_color: DEFAULT_STROKE_COLOR.into(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            filled: false,
            dash_array: Some(DEFAULT_DASH_ARRAY),
            defaulted: true,
        }
    }
}

/// Read the style straight from a feature's attributes. If the color or the
/// width is missing or invalid, the whole style falls back to [`Style::fallback`].
pub fn style_of(attributes: &Attributes, fields: &FieldConfig) -> Style {
    let color = attributes.get(&fields.color)
        .and_then(|value| value.as_text());
    let width = attributes.get(&fields.width)
        .and_then(|value| value.as_f64())
        .filter(|width| width.is_finite() && *width > 0.0);

    match (color, width) {
        (Some(color), Some(width)) => Style {
            stroke_color: color.to_string(),
            stroke_width: width,
            filled: false,
            dash_array: None,
            defaulted: false,
        },
        _ => Style::fallback(),
    }
}

/// Attach a style to every feature.
pub fn resolve(collection: FeatureCollection, fields: &FieldConfig) -> FeatureCollection {
    let (crs, features) = collection.into_parts();

    let mut defaulted = 0;
    let features: Vec<Feature> = features.into_iter()
        .map(|feature| {
            let style = style_of(feature.attributes(), fields);
            if style.defaulted {
                defaulted += 1;
                warn!(
                    name = %feature.attributes().get(&fields.name).map(|v| v.to_string()).unwrap_or_default(),
                    "[style] missing or invalid {}/{}; using default style", fields.color, fields.width
                );
            }
            feature.with_style(style)
        })
        .collect();

    info!(features = features.len(), defaulted, "[style] resolved feature styles");
    FeatureCollection::new(crs, features)
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, Point};

    use super::*;
    use crate::feature::AttrValue;

    fn attrs(color: AttrValue, width: AttrValue) -> Attributes {
        [("Color", color), ("Line_wt", width)].into_iter().collect()
    }

    #[test]
    fn reads_color_and_width() {
        let style = style_of(&attrs("red".into(), AttrValue::Number(2.0)), &FieldConfig::default());
        assert_eq!(style.stroke_color, "red");
        assert_eq!(style.stroke_width, 2.0);
        assert!(!style.filled);
        assert!(!style.defaulted);
    }

    #[test]
    fn numeric_text_width_is_accepted() {
        let style = style_of(&attrs("#00ff00".into(), " 1.5 ".into()), &FieldConfig::default());
        assert_eq!(style.stroke_width, 1.5);
    }

    #[test]
    fn missing_values_fall_back() {
        let fields = FieldConfig::default();
        for attributes in [
            attrs(AttrValue::Null, AttrValue::Number(2.0)),
            attrs("red".into(), AttrValue::Null),
            attrs("  ".into(), AttrValue::Number(2.0)),
            Attributes::new(),
        ] {
            assert_eq!(style_of(&attributes, &fields), Style::fallback());
        }
    }

    #[test]
    fn non_positive_width_falls_back() {
        let fields = FieldConfig::default();
        for width in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let style = style_of(&attrs("red".into(), AttrValue::Number(width)), &fields);
            assert!(style.defaulted);
            assert!(style.stroke_width > 0.0);
        }
    }

    #[test]
    fn resolve_styles_every_feature() {
        let features = vec![
            Feature::new(Geometry::Point(Point::new(0.0, 0.0)), attrs("red".into(), AttrValue::Number(2.0))),
            Feature::new(Geometry::Point(Point::new(1.0, 1.0)), Attributes::new()),
        ];
        let styled = resolve(FeatureCollection::new(None, features), &FieldConfig::default());

        assert!(styled.iter().all(|f| f.style().is_some_and(|s| s.stroke_width > 0.0)));
        assert!(styled.features()[1].style().unwrap().defaulted);
    }

    #[test]
    fn serializes_as_path_options() {
        let json = serde_json::to_value(Style::fallback()).unwrap();
        assert_eq!(json, serde_json::json!({ "color": "#ff00ff", "weight": 3.0, "fill": false, "dashArray": "6 4" }));
    }
}
