//! Indexed animation layout (v4)
//!
//! # Layout
//! ```text
//! 0x00: id [u8; 8]
//! 0x08: version u32 (4)
//! 0x0C: bone_count u32
//! 0x10: frame_count u32
//! 0x14: seconds_per_frame f32
//! 0x18: position_offset u32
//! 0x1C: position_count u32
//! 0x20: orientation_offset u32
//! 0x24: orientation_count u32
//! 0x28: lookup_offset u32
//! ```
//!
//! Positions (`[f32; 3]`) and orientations (`[f32; 4]`, xyzw) are shared
//! pools. The lookup section is frame-major, `frame_count × bone_count`
//! records of 12 bytes:
//! `bone_id u32, position_index u16, reserved u16, orientation_index u16, reserved u16`.
//! The first frame introduces every bone id; later frames must only name
//! ids already seen.
//!
//! Clips in this layout parse completely but are flagged
//! [`PlaybackLimitation::IndexedBoneRemap`].

use glam::{Quat, Vec3};
use hashbrown::HashMap;

use super::types::{
    AnimatedBone, AnimationClip, AnimationFormat, BoneIdentity, PlaybackLimitation,
};
use crate::cursor::BinaryCursor;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::FormatError;
use crate::limits::DecodeLimits;
use crate::transform::{BoneTransform, sanitize_rotation};

/// Size of one lookup record in bytes
pub const LOOKUP_RECORD_SIZE: usize = 12;

struct Lookup {
    bone_id: u32,
    position: u16,
    orientation: u16,
    reserved: [u16; 2],
}

impl Lookup {
    fn read(cursor: &mut BinaryCursor<'_>) -> Result<Self, FormatError> {
        let bone_id = cursor.read_u32()?;
        let position = cursor.read_u16()?;
        let reserved_a = cursor.read_u16()?;
        let orientation = cursor.read_u16()?;
        let reserved_b = cursor.read_u16()?;
        Ok(Self {
            bone_id,
            position,
            orientation,
            reserved: [reserved_a, reserved_b],
        })
    }
}

/// Shared value pools the lookups index into
struct Pools {
    positions: Vec<Vec3>,
    orientations: Vec<Quat>,
}

impl Pools {
    fn resolve(&self, lookup: &Lookup, frame: usize) -> Result<BoneTransform, FormatError> {
        let translation = *self
            .positions
            .get(lookup.position as usize)
            .ok_or_else(|| {
                FormatError::malformed(format!(
                    "frame {} bone 0x{:08X}: position index {} outside pool of {}",
                    frame,
                    lookup.bone_id,
                    lookup.position,
                    self.positions.len()
                ))
            })?;
        let rotation = *self
            .orientations
            .get(lookup.orientation as usize)
            .ok_or_else(|| {
                FormatError::malformed(format!(
                    "frame {} bone 0x{:08X}: orientation index {} outside pool of {}",
                    frame,
                    lookup.bone_id,
                    lookup.orientation,
                    self.orientations.len()
                ))
            })?;
        Ok(BoneTransform::new(rotation, translation))
    }
}

/// Frames per second from the stored frame duration
pub(crate) fn fps_from_seconds_per_frame(seconds_per_frame: f32) -> Option<f32> {
    if seconds_per_frame.is_finite() && seconds_per_frame > 0.0 {
        Some((1.0 / seconds_per_frame).round())
    } else {
        None
    }
}

pub(super) fn decode(
    cursor: &mut BinaryCursor<'_>,
    name: String,
    id: [u8; 8],
    limits: &DecodeLimits,
) -> Result<Decoded<AnimationClip>, FormatError> {
    let mut diagnostics = Diagnostics::new();

    let bone_count = limits.check_bones(cursor.read_u32()?)?;
    let frame_count = limits.check_frames(cursor.read_u32()?)?;
    let seconds_per_frame = cursor.read_f32()?;
    let position_offset = cursor.read_u32()? as usize;
    let position_count = limits.check_vertices(cursor.read_u32()?, "position pool size")?;
    let orientation_offset = cursor.read_u32()? as usize;
    let orientation_count = limits.check_vertices(cursor.read_u32()?, "orientation pool size")?;
    let lookup_offset = cursor.read_u32()? as usize;

    let frames_per_second = fps_from_seconds_per_frame(seconds_per_frame).unwrap_or_else(|| {
        diagnostics.warn(format!(
            "invalid seconds per frame {}; clip fps set to 0",
            seconds_per_frame
        ));
        0.0
    });

    tracing::trace!(
        "animation v4: {} bones × {} frames, pools {}/{}",
        bone_count,
        frame_count,
        position_count,
        orientation_count
    );

    cursor.seek(position_offset)?;
    let mut positions = Vec::with_capacity(cursor.capacity_for(position_count, 12));
    for _ in 0..position_count {
        positions.push(cursor.read_vec3()?);
    }

    cursor.seek(orientation_offset)?;
    let mut orientations = Vec::with_capacity(cursor.capacity_for(orientation_count, 16));
    for index in 0..orientation_count {
        let q = cursor.read_quat()?;
        orientations.push(sanitize_rotation(
            q,
            || format!("orientation pool entry {}", index),
            &mut diagnostics,
        ));
    }
    let pools = Pools {
        positions,
        orientations,
    };

    cursor.seek(lookup_offset)?;
    let lookup_capacity =
        cursor.capacity_for(bone_count.saturating_mul(frame_count), LOOKUP_RECORD_SIZE);
    let frame_capacity = lookup_capacity / bone_count.max(1);
    let mut bones: Vec<AnimatedBone> = Vec::with_capacity(lookup_capacity.min(bone_count));
    let mut by_id: HashMap<u32, usize> = HashMap::with_capacity(lookup_capacity.min(bone_count));
    let mut lookup_reserved = Vec::with_capacity(lookup_capacity);

    if frame_count > 0 {
        // First frame: one record per bone establishes the bone set
        for _ in 0..bone_count {
            let lookup = Lookup::read(cursor)?;
            lookup_reserved.push(lookup.reserved);
            let transform = pools.resolve(&lookup, 0)?;
            if by_id.contains_key(&lookup.bone_id) {
                diagnostics.warn(format!(
                    "bone id 0x{:08X} appears twice in the first frame; duplicate ignored",
                    lookup.bone_id
                ));
                continue;
            }
            by_id.insert(lookup.bone_id, bones.len());
            let mut frames = Vec::with_capacity(frame_capacity.max(1));
            frames.push(transform);
            bones.push(AnimatedBone {
                identity: BoneIdentity::Hash(lookup.bone_id),
                frames,
                reserved: 0,
            });
        }

        // Remaining frames, frame-major, resolved against the known ids
        for frame in 1..frame_count {
            for _ in 0..bone_count {
                let lookup = Lookup::read(cursor)?;
                lookup_reserved.push(lookup.reserved);
                let slot = *by_id.get(&lookup.bone_id).ok_or_else(|| {
                    FormatError::malformed(format!(
                        "frame {} names bone id 0x{:08X} not present in the first frame",
                        frame, lookup.bone_id
                    ))
                })?;
                let transform = pools.resolve(&lookup, frame)?;
                bones[slot].frames.push(transform);
            }
        }
    } else {
        diagnostics.warn("clip has no frames");
    }

    for bone in &bones {
        if bone.frames.len() != frame_count {
            diagnostics.warn(format!(
                "bone {} has {} frames, expected {}",
                bone.identity,
                bone.frames.len(),
                frame_count
            ));
        }
    }
    if cursor.remaining() > 0 {
        diagnostics.info(format!(
            "{} bytes after the lookup section",
            cursor.remaining()
        ));
    }

    Ok(Decoded::new(
        AnimationClip {
            name,
            format: AnimationFormat::Indexed {
                id,
                seconds_per_frame,
                position_pool_len: pools.positions.len(),
                orientation_pool_len: pools.orientations.len(),
                lookup_reserved,
            },
            frames_per_second,
            frame_count,
            bones,
            limitation: Some(PlaybackLimitation::IndexedBoneRemap),
        },
        diagnostics,
    ))
}
