mod attributes;
mod feature;
mod value;

pub use attributes::Attributes;
pub use feature::{Feature, FeatureCollection};
pub use value::AttrValue;
