#![doc = "Static web map compiler: shapefile + CSV in, standalone Leaflet page out."]
mod geom;
mod feature;

pub mod config;
pub mod document;
pub mod io;
pub mod join;
pub mod pipeline;
pub mod search;
pub mod spatial;
pub mod style;

#[doc(inline)]
pub use config::{MapConfig, UnmatchedPolicy};

#[doc(inline)]
pub use document::Document;

#[doc(inline)]
pub use feature::{AttrValue, Attributes, Feature, FeatureCollection};

#[doc(inline)]
pub use geom::{BoundingBox, Crs, Reprojector, geometry_kind};

#[doc(inline)]
pub use search::SearchIndex;
