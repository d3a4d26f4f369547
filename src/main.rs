use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use tableau::{AppConfig, DemoKind, SeededRandom};

/// Small wgpu scene demos.
#[derive(Debug, Parser)]
#[command(name = "tableau", version, about)]
struct Cli {
    /// Which scene to open
    #[arg(value_enum)]
    demo: DemoKind,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Directory that texture and model paths are relative to
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// TrueType/OpenType font for the overlay text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Seed for randomized layouts and lantern flicker (random when omitted)
    #[arg(long)]
    seed: Option<u32>,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let seed = cli
        .seed
        .unwrap_or_else(|| SeededRandom::from_time().next_u32());
    let demo = cli.demo.create(seed);
    log::info!("seed {seed}");

    let config = AppConfig::new()
        .title(format!("Tableau - {}", demo.title()))
        .size(cli.width, cli.height)
        .assets(cli.assets)
        .font(cli.font)
        .seed(seed);

    if let Err(err) = tableau::run(config, demo) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
