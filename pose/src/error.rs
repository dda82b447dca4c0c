//! Error types for pose building, model loading and configuration

use std::path::PathBuf;

use rig_formats::{BoneIdentity, FormatError, PlaybackLimitation};
use thiserror::Error;

/// Why an animation clip cannot (or only partially can) be played
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoseError {
    /// No animated bone matched the skeleton; the clip is kept and poses as identity
    #[error("animation '{clip}' matched no skeleton bones")]
    UnresolvedAnimation { clip: String },

    /// The clip decoded fine but its data cannot be mapped onto a skeleton
    #[error("animation '{clip}' cannot be played: {reason}")]
    KnownLimitation {
        clip: String,
        reason: PlaybackLimitation,
    },

    #[error("animation '{clip}' bone {bone} has {actual} frames, expected {expected}")]
    FrameCountMismatch {
        clip: String,
        bone: BoneIdentity,
        expected: usize,
        actual: usize,
    },

    #[error("no animation named '{0}' is attached")]
    UnknownClip(String),

    #[error("failed to decode animation '{clip}': {source}")]
    Decode {
        clip: String,
        #[source]
        source: FormatError,
    },
}

impl PoseError {
    /// Non-fatal outcomes leave the clip attached (identity pose)
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnresolvedAnimation { .. })
    }
}

/// A model cannot exist without its skeleton and mesh
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to decode skeleton '{asset}': {source}")]
    Skeleton {
        asset: String,
        #[source]
        source: FormatError,
    },

    #[error("failed to decode mesh '{asset}': {source}")]
    Mesh {
        asset: String,
        #[source]
        source: FormatError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
