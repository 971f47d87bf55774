use anyhow::{bail, Result};
use serde_json::json;
use tileset::{io::read_catalog, pipeline::orient_layers, PlanConfig};

use crate::{cli::OrientArgs, commands::plan::catalog_options};

pub fn run(_cli: &crate::cli::Cli, args: &OrientArgs) -> Result<()> {
    let config = PlanConfig { z_min: args.z, z_max: args.z, ..Default::default() };
    let mut tiles = read_catalog(&args.catalog.catalog, &catalog_options(&args.catalog, &config)?)?;
    if tiles.is_empty() {
        bail!("[orient] no tiles in {}", args.catalog.catalog.display());
    }

    let layers = orient_layers(&mut tiles)?.into_iter()
        .map(|(layer, o)| {
            let center = o.center();
            json!({
                "z": layer.z,
                "tiles": layer.len(),
                "center": [center.x, center.y],
                "width": o.width(),
                "height": o.height(),
                "degrees": o.degrees(),
            })
        })
        .collect::<Vec<_>>();

    println!("{}", serde_json::to_string_pretty(&layers)?);
    Ok(())
}
