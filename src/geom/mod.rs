mod bbox;
mod convert;
mod geojson;
mod proj;

pub use bbox::BoundingBox;
pub use convert::geometry_kind;
pub(crate) use convert::shape_to_geometry;
pub(crate) use geojson::geometry_to_geojson;
pub use proj::{Crs, Reprojector};
