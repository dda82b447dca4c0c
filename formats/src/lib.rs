//! Rig Formats: decoders for versioned skeleton, mesh and animation assets
//!
//! Every decoder is a pure function over an in-memory buffer. Buffers come
//! from the archive layer through [`NamedBuffer`]; nothing here touches the
//! filesystem.
//!
//! # Modules
//!
//! - [`cursor`] - Bounds-checked little-endian reader used by all decoders
//! - [`skeleton`] - Bone hierarchy and bind pose (legacy v1/v2, indexed v0)
//! - [`mesh`] - Skinned vertices, indices and material ranges (v1, v2)
//! - [`animation`] - Keyframe clips (direct v0-v3, indexed v4)
//!
//! # Results
//!
//! Decoders return `Result<Decoded<T>, FormatError>`. A failure never carries
//! a partial structure; non-fatal findings ride along in
//! [`Decoded::diagnostics`] for the caller to report.
//!
//! # Usage
//!
//! ```ignore
//! use rig_formats::{decode_skeleton, decode_mesh};
//!
//! let skeleton = decode_skeleton(&skeleton_bytes)?;
//! skeleton.diagnostics.emit("hero.skel");
//! let mesh = decode_mesh(&mesh_bytes)?.into_value();
//! ```

pub mod animation;
pub mod cursor;
pub mod diagnostics;
mod error;
mod limits;
pub mod mesh;
pub mod name;
pub mod skeleton;
mod source;
mod transform;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use animation::{
    AnimatedBone, AnimationClip, AnimationFormat, BoneIdentity, PlaybackLimitation,
    decode_animation, decode_animation_with,
};
pub use cursor::BinaryCursor;
pub use diagnostics::{Decoded, Diagnostic, Diagnostics, Severity};
pub use error::{AssetKind, FormatError};
pub use limits::DecodeLimits;
pub use mesh::{MaterialRange, Mesh, Vertex, decode_mesh, decode_mesh_with};
pub use name::normalize_name;
pub use skeleton::{
    Bone, BoneRemap, RemapDirection, Skeleton, SkeletonFormat, decode_skeleton,
    decode_skeleton_with,
};
pub use source::{MemoryBuffer, NamedBuffer};
pub use transform::BoneTransform;
