use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::tiles::TileSet;
use super::BlockSet;

/// One pairwise alignment job, named by tile identity rather than registry index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairJob {
    pub a_id: i64,
    pub a_z: i32,
    pub b_z: i32,
    pub b_id: i64,
}

impl PairJob {
    /// Command line for the per-pair executable: `exe az/aid@bz/bid flags..`.
    pub fn invocation(&self, executable: &str, flags: &[String]) -> String {
        let mut cmd = format!("{executable} {}/{}@{}/{}", self.a_z, self.a_id, self.b_z, self.b_id);
        for flag in flags {
            cmd.push(' ');
            cmd.push_str(flag);
        }
        cmd
    }

    /// Output the job produces, relative to its block directory.
    #[inline]
    pub fn target(&self) -> String {
        format!("{}/{}.{}.map.tif", self.a_id, self.b_z, self.b_id)
    }
}

/// The jobs of one non-empty block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockJobs {
    pub ix: usize,
    pub iy: usize,
    pub jobs: Vec<PairJob>,
}

impl BlockJobs {
    /// Directory name for a same-layer block.
    #[inline] pub fn dir_name(&self) -> String { format!("S{}_{}", self.ix, self.iy) }
}

/// Receives each layer's partition, in ascending layer order.
pub trait JobSink {
    fn emit_layer(&mut self, z: i32, blocks: &[BlockJobs]) -> Result<()>;
}

impl BlockSet {
    /// Non-empty blocks with their pairs resolved to tile identities.
    pub fn block_jobs(&self, tiles: &TileSet) -> Vec<BlockJobs> {
        self.non_empty_blocks()
            .map(|(ix, iy, pairs)| BlockJobs {
                ix,
                iy,
                jobs: pairs.iter().map(|&(a, b)| {
                    let (a, b) = (tiles.tile(a), tiles.tile(b));
                    PairJob { a_id: a.id, a_z: a.z, b_z: b.z, b_id: b.id }
                }).collect(),
            })
            .collect()
    }
}

/// A planned job as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedJob {
    #[serde(flatten)]
    pub pair: PairJob,
    pub target: String,
    pub invocation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedBlock {
    pub ix: usize,
    pub iy: usize,
    pub dir: String,
    pub jobs: Vec<PlannedJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLayer {
    pub z: i32,
    pub blocks: Vec<PlannedBlock>,
}

/// The whole job plan, collected layer by layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPlan {
    pub executable: String,
    pub flags: Vec<String>,
    pub layers: Vec<PlannedLayer>,
}

impl JobPlan {
    pub fn new(executable: impl Into<String>, flags: Vec<String>) -> Self {
        Self { executable: executable.into(), flags, layers: Vec::new() }
    }

    /// Total number of jobs across all layers.
    pub fn total_jobs(&self) -> usize {
        self.layers.iter().flat_map(|l| &l.blocks).map(|b| b.jobs.len()).sum()
    }
}

impl JobSink for JobPlan {
    fn emit_layer(&mut self, z: i32, blocks: &[BlockJobs]) -> Result<()> {
        let blocks = blocks.iter().map(|block| PlannedBlock {
            ix: block.ix,
            iy: block.iy,
            dir: block.dir_name(),
            jobs: block.jobs.iter().map(|&pair| PlannedJob {
                pair,
                target: pair.target(),
                invocation: pair.invocation(&self.executable, &self.flags),
            }).collect(),
        }).collect();

        self.layers.push(PlannedLayer { z, blocks });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: PairJob = PairJob { a_id: 17, a_z: 3, b_z: 3, b_id: 22 };

    #[test]
    fn invocation_and_target() {
        assert_eq!(JOB.invocation("ptest", &[]), "ptest 3/17@3/22");
        assert_eq!(
            JOB.invocation("ptest", &["-nf".to_string(), "-SCALE=0.5".to_string()]),
            "ptest 3/17@3/22 -nf -SCALE=0.5"
        );
        assert_eq!(JOB.target(), "17/3.22.map.tif");
    }

    #[test]
    fn plan_collects_layers() {
        let mut plan = JobPlan::new("align", vec!["-v".to_string()]);
        plan.emit_layer(3, &[BlockJobs { ix: 1, iy: 0, jobs: vec![JOB] }]).unwrap();
        plan.emit_layer(4, &[]).unwrap();

        assert_eq!(plan.layers.len(), 2);
        assert_eq!(plan.total_jobs(), 1);
        let block = &plan.layers[0].blocks[0];
        assert_eq!(block.dir, "S1_0");
        assert_eq!(block.jobs[0].invocation, "align 3/17@3/22 -v");

        let json = serde_json::to_value(&plan).unwrap();
        let job = &json["layers"][0]["blocks"][0]["jobs"][0];
        assert_eq!(job["a_id"], 17);
        assert_eq!(job["b_id"], 22);
        assert_eq!(job["target"], "17/3.22.map.tif");
    }
}
