use std::path::PathBuf;

/// Tile-pair job planning for EM mosaic alignment
#[derive(clap::Parser, Debug)]
#[command(name = "tileset", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Partition overlapping tile pairs into block jobs and write the plan as JSON
    Plan(PlanArgs),

    /// Print each layer's minimal oriented bounding box as JSON
    Orient(OrientArgs),
}

/// Options shared by every command that reads a tile catalog.
#[derive(clap::Args, Debug)]
pub struct CatalogArgs {
    /// JSON tile catalog
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub catalog: PathBuf,

    /// Tile width in pixels, overriding the catalog
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Tile height in pixels, overriding the catalog
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// File-name pattern for tiles without an id; 'N' marks the integer
    #[arg(short = 'p', long, default_value = "/N")]
    pub id_pattern: String,
}

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Output plan file, "-" for stdout; defaults to "./plan.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// JSON config file; flags below override its fields
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Minimum overlap fraction for a tile pair to become a job
    #[arg(long)]
    pub min_overlap: Option<f64>,

    /// Tiles per block
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Lowest layer to include
    #[arg(long, allow_negative_numbers = true)]
    pub z_min: Option<i32>,

    /// Highest layer to include
    #[arg(long, allow_negative_numbers = true)]
    pub z_max: Option<i32>,

    /// Per-pair alignment executable
    #[arg(long = "exe")]
    pub executable: Option<String>,

    /// Run on a single thread
    #[arg(long)]
    pub serial: bool,
}

#[derive(clap::Args, Debug)]
pub struct OrientArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Report only this layer
    #[arg(short, long, allow_negative_numbers = true)]
    pub z: Option<i32>,
}
