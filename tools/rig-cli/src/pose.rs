//! Pose command - print the skinning matrices of one frame

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rig_pose::{BoneMatrix3x4, Config, Model, PlaybackState};

use crate::assets::load_model;

/// Arguments for the pose command
#[derive(Args)]
pub struct PoseArgs {
    /// Skeleton file
    #[arg(long)]
    pub skeleton: PathBuf,

    /// Mesh file
    #[arg(long)]
    pub mesh: PathBuf,

    /// Animation files to attach (clip name = file stem)
    #[arg(long = "anim")]
    pub anims: Vec<PathBuf>,

    /// Clip to pose; bind pose when omitted
    #[arg(long)]
    pub clip: Option<String>,

    /// Frame index (wraps around the clip)
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Blend toward the next frame (0.0-1.0)
    #[arg(long, default_value_t = 0.0)]
    pub blend: f32,
}

/// Execute the pose command
pub fn execute(args: PoseArgs, config: &Config) -> Result<()> {
    let model = load_model(&args.skeleton, &args.mesh, &args.anims, config)?;
    let state = PlaybackState {
        clip: args.clip,
        frame: args.frame,
        blend: args.blend,
    };
    print!("{}", render_pose(&model, &state)?);
    Ok(())
}

/// One row block per skeleton bone, in the GPU's 3x4 row-major layout
pub fn render_pose(model: &Model, state: &PlaybackState) -> Result<String> {
    let mut palette = Vec::new();
    model
        .write_gpu_matrices(state, &mut palette)
        .with_context(|| match &state.clip {
            Some(clip) => format!("Cannot pose clip '{}'", clip),
            None => "Cannot pose bind pose".to_string(),
        })?;

    let mut out = String::new();
    match &state.clip {
        Some(clip) => writeln!(out, "{} frame {} blend {:.3}", clip, state.frame, state.blend)?,
        None => writeln!(out, "bind pose")?,
    }
    for (bone, matrix) in model.skeleton().bones.iter().zip(&palette) {
        writeln!(out, "  [{:3}] {}", bone.index, bone.name)?;
        write_matrix(&mut out, matrix)?;
    }
    Ok(out)
}

fn write_matrix(out: &mut String, m: &BoneMatrix3x4) -> std::fmt::Result {
    for row in [m.row0, m.row1, m.row2] {
        writeln!(
            out,
            "        {:9.4} {:9.4} {:9.4} {:9.4}",
            row[0], row[1], row[2], row[3]
        )?;
    }
    Ok(())
}
