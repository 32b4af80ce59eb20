mod viewer;

use ballpit_core::diagnostics::format_config_error;
use ballpit_core::{run_headless, ConfigError, SimulationConfig};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ballpit")]
#[command(about = "Ballpit - sphere-packing particle toy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step an ensemble headlessly and report its final state
    Run {
        /// JSON config file; defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of frames to simulate
        #[arg(long, default_value_t = 600)]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Seed for initial placement and radii
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Print the full final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open an interactive window; the config file is reloaded on change
    View {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            config,
            frames,
            dt,
            seed,
            json,
        } => run(config.as_deref(), frames, dt, seed, json),
        Commands::View { config, seed } => viewer::open(config, seed),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    config: Option<&Path>,
    frames: u32,
    dt: f32,
    seed: u64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let result = run_headless(&config, frames, dt, seed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let stats = &result.stats;
    println!("particles = {}", result.positions.len());
    println!("frames = {}", result.frames);
    println!("elapsed = {:.3}", result.elapsed);
    println!(
        "centroid = ({:.4}, {:.4}, {:.4})",
        stats.centroid.x, stats.centroid.y, stats.centroid.z
    );
    println!("lowest = {:.4}", stats.lowest);
    println!("mean_speed = {:.6}", stats.mean_speed);
    println!("max_overlap = {:.6}", stats.max_overlap);

    Ok(())
}

/// Read a config file, or fall back to defaults
pub(crate) fn load_config(path: Option<&Path>) -> Result<SimulationConfig, String> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let source = fs::read_to_string(path)
        .map_err(|e| format_config_error(&ConfigError::Io(e), ""))?;
    SimulationConfig::from_json_str(&source).map_err(|e| format_config_error(&e, &source))
}
