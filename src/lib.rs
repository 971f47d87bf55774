#![doc = "Tile registry, overlap geometry and block job partitioning for EM mosaic alignment"]
pub mod blocks;
pub mod config;
pub mod error;
pub mod geom;
pub mod io;
pub mod pipeline;
pub mod tiles;

#[doc(inline)]
pub use blocks::{BlockJobs, BlockSet, JobPlan, JobSink, PairJob};

#[doc(inline)]
pub use config::PlanConfig;

#[doc(inline)]
pub use error::{GeomError, TileError};

#[doc(inline)]
pub use geom::Affine;

#[doc(inline)]
pub use pipeline::{plan, PlanSummary};

#[doc(inline)]
pub use tiles::{LayerOrientation, LayerRange, Tile, TileDims, TileRecord, TileSet};
