pub mod orient;
pub mod plan;
