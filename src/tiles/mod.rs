mod layer;
mod orient;
mod overlap;
pub mod registration;
mod tile;
mod tileset;

pub use layer::LayerRange;
pub use orient::LayerOrientation;
pub use overlap::frame_overlap;
pub use tile::{Tile, TileAux, TileDims, TileRecord};
pub use tileset::TileSet;
