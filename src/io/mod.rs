mod catalog;
mod plan;

pub use catalog::{parse_catalog, read_catalog, CatalogOptions, IdDecoder};
pub use plan::write_plan_json;
