mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{orient, plan};

/// Log level from the `-v` count; `RUST_LOG` takes precedence.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Plan(args) => plan::run(&cli, args),
        Commands::Orient(args) => orient::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
