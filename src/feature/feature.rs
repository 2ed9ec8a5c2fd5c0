use geo::Geometry;

use crate::{feature::Attributes, geom::{BoundingBox, Crs}, style::Style};

/// A geometry with its joined attributes. Style and bounding box are filled in
/// by the later pipeline stages; each stage returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Geometry<f64>,
    attributes: Attributes,
    style: Option<Style>,
    bbox: Option<BoundingBox>,
}

impl Feature {
    pub(crate) fn new(geometry: Geometry<f64>, attributes: Attributes) -> Self {
        Self { geometry, attributes, style: None, bbox: None }
    }

    #[inline] pub fn geometry(&self) -> &Geometry<f64> { &self.geometry }

    #[inline] pub fn attributes(&self) -> &Attributes { &self.attributes }

    #[inline] pub fn style(&self) -> Option<&Style> { self.style.as_ref() }

    #[inline] pub fn bbox(&self) -> Option<&BoundingBox> { self.bbox.as_ref() }

    pub(crate) fn with_attributes(self, attributes: Attributes) -> Self {
        Self { attributes, ..self }
    }

    pub(crate) fn with_style(self, style: Style) -> Self {
        Self { style: Some(style), ..self }
    }

    /// Replace the geometry by its geographic counterpart and attach its bounds.
    pub(crate) fn with_geographic(self, geometry: Geometry<f64>, bbox: BoundingBox) -> Self {
        Self { geometry, bbox: Some(bbox), ..self }
    }
}

/// Ordered features sharing one coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    crs: Option<Crs>,
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub(crate) fn new(crs: Option<Crs>, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    #[inline] pub fn crs(&self) -> Option<&Crs> { self.crs.as_ref() }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> { self.features.iter() }

    pub(crate) fn into_parts(self) -> (Option<Crs>, Vec<Feature>) { (self.crs, self.features) }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter { self.features.iter() }
}
