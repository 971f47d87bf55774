use std::{fs::File, io::BufReader, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Parameters for building a job plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// A tile pair becomes a job when its overlap fraction exceeds this.
    #[serde(default = "default_min_overlap")]
    pub min_overlap: f64,

    /// Tiles per block; each block side holds about `sqrt(block_size)` tiles.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Blocks with fewer jobs than this are merged into a neighbour.
    #[serde(default = "default_low_count")]
    pub low_count: usize,

    /// Lowest layer to ingest (inclusive).
    #[serde(default)]
    pub z_min: Option<i32>,

    /// Highest layer to ingest (inclusive).
    #[serde(default)]
    pub z_max: Option<i32>,

    /// Per-pair alignment executable named in each job.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Extra arguments appended to each job's invocation.
    #[serde(default)]
    pub flags: Vec<String>,

    /// Partition layers and pair scans on the rayon thread pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_min_overlap() -> f64 { 0.02 }

fn default_block_size() -> usize { 60 }

fn default_low_count() -> usize { 12 }

fn default_executable() -> String { "ptest".to_string() }

fn default_true() -> bool { true }

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            min_overlap: default_min_overlap(),
            block_size: default_block_size(),
            low_count: default_low_count(),
            z_min: None,
            z_max: None,
            executable: default_executable(),
            flags: Vec::new(),
            parallel: default_true(),
        }
    }
}

impl PlanConfig {
    /// Read a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_overlap.is_finite() && self.min_overlap >= 0.0,
            "[PlanConfig] min_overlap must be a non-negative number, got {}", self.min_overlap
        );
        ensure!(self.block_size > 0, "[PlanConfig] block_size must be positive");
        if let (Some(lo), Some(hi)) = (self.z_min, self.z_max) {
            ensure!(lo <= hi, "[PlanConfig] z_min ({lo}) exceeds z_max ({hi})");
        }
        Ok(())
    }

    /// Check whether layer `z` lies within the configured bounds.
    #[inline]
    pub fn accepts_layer(&self, z: i32) -> bool {
        self.z_min.is_none_or(|lo| z >= lo) && self.z_max.is_none_or(|hi| z <= hi)
    }

    /// Number of tiles along each side of a block.
    #[inline]
    pub fn tiles_per_side(&self) -> usize {
        ((self.block_size as f64).sqrt().round() as usize).max(1)
    }
}
