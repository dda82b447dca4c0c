//! Direct animation layout (v0-v3)
//!
//! # Layout
//! ```text
//! 0x00: id [u8; 8]
//! 0x08: version u32
//! 0x0C: magic u32
//! 0x10: bone_count u32
//! 0x14: frame_count u32
//! 0x18: fps u32
//! 0x1C: bones (bone_count ×)
//!         name [u8; 32], reserved u32,
//!         frames (frame_count × 28 bytes): rotation [f32; 4] (xyzw), position [f32; 3]
//! ```

use super::DIRECT_KEYFRAME_SIZE;
use super::types::{AnimatedBone, AnimationClip, AnimationFormat, BoneIdentity};
use crate::cursor::BinaryCursor;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::FormatError;
use crate::limits::DecodeLimits;
use crate::name::normalize_name;
use crate::transform::{BoneTransform, sanitize_rotation};

const NAME_SIZE: usize = 32;

pub(super) fn decode(
    cursor: &mut BinaryCursor<'_>,
    name: String,
    id: [u8; 8],
    version: u32,
    limits: &DecodeLimits,
) -> Result<Decoded<AnimationClip>, FormatError> {
    let mut diagnostics = Diagnostics::new();

    let magic = cursor.read_u32()?;
    let bone_count = limits.check_bones(cursor.read_u32()?)?;
    let frame_count = limits.check_frames(cursor.read_u32()?)?;
    let fps = cursor.read_u32()?;

    let mut bones = Vec::with_capacity(cursor.capacity_for(bone_count, NAME_SIZE + 4));
    for bone_index in 0..bone_count {
        let bone_name = normalize_name(cursor.read_fixed_chars(NAME_SIZE)?);
        let reserved = cursor.read_u32()?;
        let mut frames = Vec::with_capacity(cursor.capacity_for(frame_count, DIRECT_KEYFRAME_SIZE));
        for frame in 0..frame_count {
            let rotation = sanitize_rotation(
                cursor.read_quat()?,
                || format!("bone {} ('{}') frame {}", bone_index, bone_name, frame),
                &mut diagnostics,
            );
            let translation = cursor.read_vec3()?;
            frames.push(BoneTransform::new(rotation, translation));
        }
        bones.push(AnimatedBone {
            identity: BoneIdentity::Name(bone_name),
            frames,
            reserved,
        });
    }

    if fps == 0 {
        diagnostics.warn("clip stores 0 frames per second");
    }
    if frame_count == 0 {
        diagnostics.warn("clip has no frames");
    }
    if cursor.remaining() > 0 {
        diagnostics.info(format!(
            "{} trailing bytes after animation",
            cursor.remaining()
        ));
    }
    super::check_duplicate_identities(&bones, &mut diagnostics);

    Ok(Decoded::new(
        AnimationClip {
            name,
            format: AnimationFormat::Direct { id, version, magic },
            frames_per_second: fps as f32,
            frame_count,
            bones,
            limitation: None,
        },
        diagnostics,
    ))
}
