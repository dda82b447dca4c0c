//! Play command - drive the playback clock over one clip

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rig_formats::name::normalize_str;
use rig_pose::{AnimationClock, Config, Model};

use crate::assets::load_model;

/// Arguments for the play command
#[derive(Args)]
pub struct PlayArgs {
    /// Skeleton file
    #[arg(long)]
    pub skeleton: PathBuf,

    /// Mesh file
    #[arg(long)]
    pub mesh: PathBuf,

    /// Animation file to play (clip name = file stem)
    #[arg(long)]
    pub anim: PathBuf,

    /// How long to play, in seconds
    #[arg(long, default_value_t = 1.0)]
    pub seconds: f32,

    /// Simulated tick length, in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub tick: f32,
}

/// Execute the play command
pub fn execute(args: PlayArgs, config: &Config) -> Result<()> {
    let model = load_model(&args.skeleton, &args.mesh, std::slice::from_ref(&args.anim), config)?;
    let clip = args
        .anim
        .file_stem()
        .map(|stem| normalize_str(&stem.to_string_lossy()))
        .context("Animation path has no file name")?;
    print!("{}", simulate(&model, &clip, args.seconds, args.tick, config)?);
    Ok(())
}

/// Tick the clock for `seconds`, posing every tick and logging each new frame
pub fn simulate(model: &Model, clip: &str, seconds: f32, tick: f32, config: &Config) -> Result<String> {
    if !tick.is_finite() || tick <= 0.0 {
        anyhow::bail!("Tick length must be positive (got {})", tick);
    }
    if let Some(error) = model.failure(clip) {
        anyhow::bail!("Cannot play '{}': {}", clip, error);
    }
    let resolved = model
        .pose()
        .clip(clip)
        .with_context(|| format!("Clip '{}' is not attached", clip))?;

    let mut clock = AnimationClock::new(&config.playback);
    clock.play_clip(resolved);

    let mut out = String::new();
    writeln!(
        out,
        "playing {}: {} frames @ {} fps",
        clip,
        clock.frame_count(),
        clock.frames_per_second()
    )?;

    let ticks = (seconds / tick).ceil().max(0.0) as usize;
    let mut last_frame = None;
    for _ in 0..ticks {
        clock.advance(tick);
        let state = clock.playback_state();
        model.bone_transforms(&state)?;
        if last_frame != Some(state.frame) {
            writeln!(
                out,
                "  frame {:4} blend {:.2} {:5.1}%",
                state.frame,
                state.blend,
                clock.percent_complete() * 100.0
            )?;
            last_frame = Some(state.frame);
        }
    }
    writeln!(out, "done after {} ticks", ticks)?;
    Ok(out)
}
