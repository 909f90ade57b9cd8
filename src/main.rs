//! # Floorplan Command Line Entry Point
//!
//! Generates one layout and prints it as ASCII or JSON.

use clap::Parser;
use floorplan::{
    FloorplanError, FloorplanGenerator, FloorplanResult, GenerationConfig, Generator, MapLayout,
};
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Command line arguments for the floorplan generator.
#[derive(Parser, Debug)]
#[command(name = "floorplan")]
#[command(about = "Deterministic BSP floorplan generator")]
#[command(version)]
struct Args {
    /// Random seed; overrides the seed in --config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map width in tiles; overrides the width in --config
    #[arg(long)]
    width: Option<u32>,

    /// Map height in tiles; overrides the height in --config
    #[arg(long)]
    height: Option<u32>,

    /// JSON generation config; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the whole layout as JSON instead of an ASCII map
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> FloorplanResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;
    info!("Starting floorplan v{}", floorplan::VERSION);

    let config = load_config(&args)?;
    let mut rng = floorplan::generation::utils::create_rng(&config);
    let layout = FloorplanGenerator::new().generate(&config, &mut rng)?;

    if args.json {
        println!("{}", layout.to_json()?);
    } else {
        print_summary(&layout);
    }
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> FloorplanResult<()> {
    let level: LevelFilter = log_level.parse().map_err(|_| {
        FloorplanError::InvalidConfig(format!("unknown log level '{log_level}'"))
    })?;

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
    Ok(())
}

/// Builds the generation config from an optional file plus flag overrides.
fn load_config(args: &Args) -> FloorplanResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => GenerationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    Ok(config)
}

fn print_summary(layout: &MapLayout) {
    print!("{}", layout.grid);
    println!(
        "seed {} | {}x{} | {} rooms | {} corridors",
        layout.seed,
        layout.width,
        layout.height,
        layout.rooms.len(),
        layout.corridors.len()
    );

    let report = &layout.report;
    if report.is_clean() && report.warnings.is_empty() {
        println!("validation: clean");
        return;
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}
