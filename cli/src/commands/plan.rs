use anyhow::Result;
use log::info;
use tileset::{
    io::{read_catalog, write_plan_json, CatalogOptions, IdDecoder},
    JobPlan, PlanConfig,
};

use crate::cli::{CatalogArgs, PlanArgs};

/// Build catalog options from the shared flags and the config's layer bounds.
pub fn catalog_options(args: &CatalogArgs, config: &PlanConfig) -> Result<CatalogOptions> {
    Ok(CatalogOptions {
        width: args.width,
        height: args.height,
        ids: Some(IdDecoder::new(&args.id_pattern)?),
        ..CatalogOptions::from_config(config)
    })
}

pub fn run(_cli: &crate::cli::Cli, args: &PlanArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PlanConfig::from_json_file(path)?,
        None => PlanConfig::default(),
    };
    if let Some(v) = args.min_overlap { config.min_overlap = v }
    if let Some(v) = args.block_size { config.block_size = v }
    if let Some(z) = args.z_min { config.z_min = Some(z) }
    if let Some(z) = args.z_max { config.z_max = Some(z) }
    if let Some(exe) = &args.executable { config.executable = exe.clone() }
    if args.serial { config.parallel = false }
    config.validate()?;

    let out_path = args.output.clone().unwrap_or("./plan.json".into());

    info!("[plan] loading tiles from {}", args.catalog.catalog.display());
    let mut tiles = read_catalog(&args.catalog.catalog, &catalog_options(&args.catalog, &config)?)?;

    let mut plan = JobPlan::new(config.executable.clone(), config.flags.clone());
    let summary = tileset::plan(&mut tiles, &config, &mut plan)?;

    write_plan_json(&out_path, &plan)?;
    info!("[plan] {} jobs in {} blocks over {} layers -> {}",
        summary.jobs, summary.blocks, summary.layers, out_path.display());

    Ok(())
}
