mod affine;
pub mod algorithm;
pub mod bbox;

pub use affine::Affine;
pub(crate) use bbox::BoundingBox;
