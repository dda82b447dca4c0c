//! Rig CLI - inspect rig assets and preview poses
//!
//! # Commands
//!
//! - `rig inspect` - Decode one skeleton, mesh or animation file and print it
//! - `rig pose` - Load a model, attach clips and print the skinning matrices for one frame
//! - `rig play` - Drive the playback clock over a clip and print its progress
//!
//! # Usage
//!
//! ```bash
//! rig inspect hero.skel
//! rig inspect blob.bin --kind animation
//! rig pose --skeleton hero.skel --mesh hero.mesh --anim walk.anim --clip walk --frame 3 --blend 0.5
//! rig play --skeleton hero.skel --mesh hero.mesh --anim walk.anim --seconds 2
//! ```
//!
//! Every command reads `config.toml` from the platform config directory, or
//! the file given with `--config`.

mod assets;
mod inspect;
mod play;
mod pose;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Rig CLI - inspect rig assets and preview poses
#[derive(Parser)]
#[command(name = "rig")]
#[command(about = "Inspect skeleton, mesh and animation assets")]
#[command(version)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one asset file and print its contents
    Inspect(inspect::InspectArgs),

    /// Print the skinning matrices of a model for one frame
    Pose(pose::PoseArgs),

    /// Play a clip for a while and print playback progress
    Play(play::PlayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = assets::load_config(cli.config.as_deref())?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .init();

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args, &config),
        Commands::Pose(args) => pose::execute(args, &config),
        Commands::Play(args) => play::execute(args, &config),
    }
}
