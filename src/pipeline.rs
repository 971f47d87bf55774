use anyhow::Result;
use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    blocks::{BlockSet, JobSink},
    config::PlanConfig,
    error::TileError,
    tiles::{LayerOrientation, LayerRange, TileSet},
};

/// Counts describing a finished plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub layers: usize,
    pub tiles: usize,
    pub jobs: usize,
    pub blocks: usize,
}

/// Partition every layer of `tiles` into block jobs and hand them to `sink` in ascending z.
///
/// The registry is put in canonical `(z, id)` order and its aux data rebuilt;
/// tile transforms are left untouched.
pub fn plan(tiles: &mut TileSet, config: &PlanConfig, sink: &mut impl JobSink) -> Result<PlanSummary> {
    config.validate()?;

    tiles.sort_by_layer_then_id();
    tiles.init_aux()?;

    let tiles = &*tiles;
    let layers = tiles.layers().collect::<Vec<_>>();

    let carved = if config.parallel {
        layers.par_iter().map(|&layer| BlockSet::carve(tiles, layer, config)).collect::<Result<Vec<_>, TileError>>()?
    } else {
        layers.iter().map(|&layer| BlockSet::carve(tiles, layer, config)).collect::<Result<Vec<_>, TileError>>()?
    };

    let mut summary = PlanSummary { layers: layers.len(), tiles: tiles.len(), ..Default::default() };
    for blocks in &carved {
        let jobs = blocks.block_jobs(tiles);
        summary.blocks += jobs.len();
        summary.jobs += jobs.iter().map(|b| b.jobs.len()).sum::<usize>();
        sink.emit_layer(blocks.z(), &jobs)?;
    }

    info!("[plan] {} layers, {} tiles, {} jobs in {} blocks",
        summary.layers, summary.tiles, summary.jobs, summary.blocks);
    Ok(summary)
}

/// Minimal-footprint orientation of every layer, in ascending z. Sorts the registry by layer.
pub fn orient_layers(tiles: &mut TileSet) -> Result<Vec<(LayerRange, LayerOrientation)>, TileError> {
    tiles.sort_by_layer_then_id();
    tiles.layers()
        .map(|layer| -> Result<_, TileError> { Ok((layer, tiles.compute_orientation(layer.range())?)) })
        .collect()
}
