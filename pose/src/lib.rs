//! Rig Pose: skeletal reconciliation and playback
//!
//! Turns decoded assets from `rig-formats` into per-bone skinning matrices.
//!
//! # Modules
//!
//! - [`builder`] - Matches clips to a skeleton and resolves skin matrices
//! - [`config`] - TOML configuration (decode limits, playback, logging)
//!
//! # Usage
//!
//! ```ignore
//! use rig_pose::{AnimationClock, Model, PlaybackState};
//!
//! let mut model = Model::load(&skeleton_buffer, &mesh_buffer, &config.decode)?;
//! let report = model.attach_animation(&walk_buffer);
//!
//! let mut clock = AnimationClock::new(&config.playback);
//! clock.play_clip(model.pose().clip("walk").unwrap());
//! clock.advance(dt);
//! let matrices = model.bone_transforms(&clock.playback_state())?;
//! ```

pub mod builder;
mod clock;
pub mod config;
mod error;
mod matrix;
mod model;
mod pose;
mod resolver;

pub use builder::{ClipReport, PoseBuilder};
pub use clock::AnimationClock;
pub use config::Config;
pub use error::{ConfigError, ModelError, PoseError};
pub use matrix::{BoneMatrix3x4, as_bytes};
pub use model::Model;
pub use pose::{PlaybackState, ResolvedClip, ResolvedPose, ResolvedTrack};
pub use resolver::BoneResolver;
