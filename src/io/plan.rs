use std::{fs, io::{self, BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use log::info;
use tempfile::NamedTempFile;

use crate::blocks::JobPlan;

/// Write the plan as pretty JSON to `path`, or to stdout when `path` is `-`.
///
/// Files are written to a temporary sibling and renamed into place, so a failed
/// run never leaves a truncated plan behind.
pub fn write_plan_json(path: &Path, plan: &JobPlan) -> Result<()> {
    if path == Path::new("-") {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, plan).context("Failed to write plan to stdout")?;
        writeln!(out)?;
        return Ok(());
    }

    // The temp file must share the plan's directory for the rename to stay atomic.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create plan directory {}", dir.display()))?;

    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, plan)
            .with_context(|| format!("Failed to write plan {}", path.display()))?;
        writer.flush()?;
    }
    tmp.as_file().sync_all().ok(); // best-effort fsync
    tmp.persist(path)
        .with_context(|| format!("Failed to move plan into place at {}", path.display()))?;

    info!("[plan] wrote {} jobs to {}", plan.total_jobs(), path.display());
    Ok(())
}
