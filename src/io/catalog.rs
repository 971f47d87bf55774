use std::{fs::File, io::{BufReader, Read}, path::Path};

use ahash::AHashSet;
use anyhow::{bail, Context, Result};
use log::{info, warn};
use regex::Regex;
use serde::Deserialize;

use crate::{
    config::PlanConfig,
    geom::Affine,
    tiles::{TileDims, TileRecord, TileSet},
};

/// Extracts a tile id from an image file name.
///
/// In the pattern, the letter `N` stands for the integer and every other
/// character is literal. A leading `/` anchors at the start of the file name,
/// so the pattern `/N` reads a name that begins with its id.
#[derive(Debug, Clone)]
pub struct IdDecoder {
    pattern: String,
    re: Regex,
}

impl IdDecoder {
    pub fn new(pattern: &str) -> Result<Self> {
        let Some((before, after)) = pattern.split_once('N') else {
            bail!("[IdDecoder] pattern '{pattern}' has no 'N' placeholder");
        };
        let source = format!("{}(-?[0-9]+){}", regex::escape(before), regex::escape(after));
        let re = Regex::new(&source).with_context(|| format!("Invalid id pattern: {pattern}"))?;
        Ok(Self { pattern: pattern.to_string(), re })
    }

    #[inline] pub fn pattern(&self) -> &str { &self.pattern }

    /// Decode the id from the file-name part of `path`.
    pub fn decode(&self, path: &str) -> Option<i64> {
        let name = path.rsplit('/').next().unwrap_or(path);
        let haystack = format!("/{name}");
        self.re.captures(&haystack)?.get(1)?.as_str().parse().ok()
    }
}

/// Ingestion settings: layer bounds, dimension overrides and the id decoder.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    pub z_min: Option<i32>,
    pub z_max: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub ids: Option<IdDecoder>, // Needed only for records without an id
}

impl CatalogOptions {
    /// Take the layer bounds from a plan config.
    pub fn from_config(config: &PlanConfig) -> Self {
        Self { z_min: config.z_min, z_max: config.z_max, ..Default::default() }
    }

    #[inline]
    fn accepts_layer(&self, z: i32) -> bool {
        self.z_min.is_none_or(|lo| z >= lo) && self.z_max.is_none_or(|hi| z <= hi)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    tiles: Vec<CatalogTile>,
}

#[derive(Debug, Deserialize)]
struct CatalogTile {
    #[serde(default)]
    id: Option<i64>,
    z: i32,
    path: String,
    transform: Affine,
}

/// Read a JSON tile catalog into a registry, in file order.
pub fn read_catalog(path: &Path, options: &CatalogOptions) -> Result<TileSet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to read tile catalog: {}", path.display()))?;
    let tiles = parse_catalog(BufReader::new(file), options)
        .with_context(|| format!("Invalid tile catalog: {}", path.display()))?;

    info!("[catalog] {} tiles in {} layers from {}", tiles.len(), layer_count(&tiles), path.display());
    Ok(tiles)
}

/// Parse a JSON tile catalog from any reader.
pub fn parse_catalog(reader: impl Read, options: &CatalogOptions) -> Result<TileSet> {
    let catalog: CatalogFile = serde_json::from_reader(reader).context("Failed to parse catalog JSON")?;

    let width = options.width.or(catalog.width);
    let height = options.height.or(catalog.height);
    let (Some(width), Some(height)) = (width, height) else {
        bail!("[catalog] tile dimensions missing; set width/height in the catalog or on the command line");
    };
    let dims = TileDims::new(width, height);
    dims.check()?;

    let mut set = TileSet::new(dims);
    let mut seen = AHashSet::new();
    let mut skipped = 0;

    for (k, tile) in catalog.tiles.into_iter().enumerate() {
        if !options.accepts_layer(tile.z) { skipped += 1; continue }

        let id = match tile.id {
            Some(id) => id,
            None => {
                let Some(ids) = &options.ids else {
                    bail!("[catalog] tile {k} ({}) has no id and no id pattern is set", tile.path);
                };
                ids.decode(&tile.path).with_context(|| {
                    format!("Tile {k}: no id matching '{}' in {}", ids.pattern(), tile.path)
                })?
            }
        };

        if !seen.insert((tile.z, id)) {
            bail!("[catalog] duplicate tile id {id} in layer {} ({})", tile.z, tile.path);
        }

        set.push(TileRecord { id, z: tile.z, path: tile.path, transform: tile.transform });
    }

    if skipped > 0 { info!("[catalog] skipped {skipped} tiles outside the layer range") }
    if set.is_empty() { warn!("[catalog] no tiles selected") }

    Ok(set)
}

fn layer_count(tiles: &TileSet) -> usize {
    tiles.tiles().iter().map(|t| t.z).collect::<AHashSet<_>>().len()
}
