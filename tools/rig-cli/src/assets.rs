//! File-backed asset buffers and config loading

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use rig_formats::NamedBuffer;
use rig_pose::{Config, Model, config};

/// An asset file read fully into memory
#[derive(Debug, Clone)]
pub struct FileBuffer {
    name: String,
    data: Vec<u8>,
}

impl FileBuffer {
    /// Read `path`, naming the buffer after the file stem
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, data })
    }
}

impl NamedBuffer for FileBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &[u8] {
        &self.data
    }
}

/// What a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssetKind {
    Skeleton,
    Mesh,
    Animation,
}

impl AssetKind {
    /// Guess from the file extension (.skel, .mesh, .anim)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "skel" | "skeleton" => Some(Self::Skeleton),
            "mesh" => Some(Self::Mesh),
            "anim" | "animation" => Some(Self::Animation),
            _ => None,
        }
    }
}

/// Explicit `--config` must load; otherwise fall back to the platform file or defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(config::load()),
    }
}

/// Load a model and attach every clip, printing one line per clip
pub fn load_model(
    skeleton: &Path,
    mesh: &Path,
    anims: &[PathBuf],
    config: &Config,
) -> Result<Model> {
    let skeleton_buffer = FileBuffer::read(skeleton)?;
    let mesh_buffer = FileBuffer::read(mesh)?;
    let mut model = Model::load(&skeleton_buffer, &mesh_buffer, &config.decode)
        .context("Failed to load model")?;

    for path in anims {
        let report = model.attach_animation(&FileBuffer::read(path)?);
        match &report.issue {
            None => println!(
                "  clip {}: {} bones animated, {} dropped",
                report.clip,
                report.matched,
                report.dropped.len()
            ),
            Some(issue) => println!("  clip {}: {}", report.clip, issue),
        }
    }
    Ok(model)
}
