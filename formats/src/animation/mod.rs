//! Animation clip decoding
//!
//! Two structurally different families share the version field at 0x08:
//! - v0-v3 ([`direct`]): bone-major keyframes with names
//! - v4 ([`indexed`]): frame-major lookups into shared pools, hashed bone ids
//!
//! Both produce a bone-major [`AnimationClip`] whose keyframes are
//! parent-relative.

mod direct;
mod indexed;
mod types;

#[cfg(test)]
mod tests;

pub use indexed::LOOKUP_RECORD_SIZE;
pub use types::{
    AnimatedBone, AnimationClip, AnimationFormat, BoneIdentity, PlaybackLimitation,
};

use crate::cursor::BinaryCursor;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::{AssetKind, FormatError};
use crate::limits::DecodeLimits;
use crate::name::normalize_str;

/// Size of one direct keyframe (rotation + position)
pub const DIRECT_KEYFRAME_SIZE: usize = 28;

/// Highest version using the direct layout
pub const LAST_DIRECT_VERSION: u32 = 3;

/// The indexed, frame-major version
pub const INDEXED_VERSION: u32 = 4;

/// Decode an animation buffer with default limits
pub fn decode_animation(name: &str, data: &[u8]) -> Result<Decoded<AnimationClip>, FormatError> {
    decode_animation_with(name, data, &DecodeLimits::default())
}

/// Decode an animation buffer, dispatching on the version field
pub fn decode_animation_with(
    name: &str,
    data: &[u8],
    limits: &DecodeLimits,
) -> Result<Decoded<AnimationClip>, FormatError> {
    let mut cursor = BinaryCursor::new(data);
    let id = cursor.read_array::<8>()?;
    let version = cursor.read_u32()?;
    let name = normalize_str(name);
    tracing::trace!("animation '{}': version {}", name, version);

    match version {
        0..=LAST_DIRECT_VERSION => direct::decode(&mut cursor, name, id, version, limits),
        INDEXED_VERSION => indexed::decode(&mut cursor, name, id, limits),
        other => Err(FormatError::UnsupportedVersion {
            kind: AssetKind::Animation,
            version: other as i64,
        }),
    }
}

fn check_duplicate_identities(bones: &[AnimatedBone], diagnostics: &mut Diagnostics) {
    let mut seen = hashbrown::HashSet::new();
    for bone in bones {
        if !seen.insert(&bone.identity) {
            diagnostics.warn(format!("bone {} animated more than once", bone.identity));
        }
    }
}
