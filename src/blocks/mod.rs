mod blockset;
mod emit;

pub use blockset::{BlockSet, Grid};
pub use emit::{BlockJobs, JobPlan, JobSink, PairJob, PlannedBlock, PlannedJob, PlannedLayer};
