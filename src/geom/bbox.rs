use geo::{BoundingRect, Coord, Geometry, Rect};
use serde::{Serialize, Serializer, ser::SerializeTuple};

/// An axis-aligned bounding box in geographic coordinates (degrees).
/// Always satisfies `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    rect: Rect<f64>,
}

impl BoundingBox {
    /// Build a box from two corners; swapped corners are normalized.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { rect: Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y }) }
    }

    /// Compute the minimal box enclosing a geometry, if it has any coordinates.
    pub fn of(geometry: &Geometry<f64>) -> Option<Self> {
        geometry.bounding_rect().map(|rect| Self { rect })
    }

    #[inline] pub fn min_x(&self) -> f64 { self.rect.min().x }
    #[inline] pub fn min_y(&self) -> f64 { self.rect.min().y }
    #[inline] pub fn max_x(&self) -> f64 { self.rect.max().x }
    #[inline] pub fn max_y(&self) -> f64 { self.rect.max().y }

    /// Get a reference to the bounding rectangle.
    #[inline] pub fn rect(&self) -> &Rect<f64> { &self.rect }

    /// Corners as `[min_x, min_y, max_x, max_y]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x(), self.min_y(), self.max_x(), self.max_y()]
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_x().min(other.min_x()),
            self.min_y().min(other.min_y()),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }

    /// Check the box lies within valid longitude/latitude ranges.
    pub fn is_geographic(&self) -> bool {
        (-180.0..=180.0).contains(&self.min_x()) && (-180.0..=180.0).contains(&self.max_x())
            && (-90.0..=90.0).contains(&self.min_y()) && (-90.0..=90.0).contains(&self.max_y())
    }
}

/// Serialized as `[min_x, min_y, max_x, max_y]`, the layout the client script expects.
impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        for value in self.to_array() { tuple.serialize_element(&value)? }
        tuple.end()
    }
}
