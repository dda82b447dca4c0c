//! Indexed skeleton layout (v0)
//!
//! # Layout
//! ```text
//! 0x00: id [u8; 8]
//! 0x08: version u32 (0)
//! 0x0C: bone_count u32
//! 0x10: bone_offset u32
//! 0x14: pair_count u32
//! 0x18: pair_offset u32
//! 0x1C: anim_index_count u32
//! 0x20: anim_index_offset u32
//! 0x24: string_offset u32
//! 0x28: string_size u32
//! 0x2C: reserved [u32; 5]
//! ```
//!
//! Sections live wherever the header says and are read by seeking:
//! - bones: 48-byte records `rotation [f32; 4], position [f32; 3], parent i32, padding [u32; 4]`
//!   holding parent-relative transforms
//! - pairs: `animation_bone_id u32, skeleton_slot u32`
//! - animation indices: `u32` each, kept opaque
//! - strings: one NUL-terminated name per bone, each run padded to 4 bytes

use hashbrown::HashMap;

use super::types::{Bone, BoneRemap, RemapDirection, Skeleton, SkeletonFormat};
use super::{INDEXED_BONE_RECORD_SIZE, check_duplicate_names, parse_parent};
use crate::cursor::BinaryCursor;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::FormatError;
use crate::limits::DecodeLimits;
use crate::name::normalize_name;
use crate::transform::{BoneTransform, sanitize_rotation};

struct Header {
    bone_count: usize,
    bone_offset: usize,
    pair_count: usize,
    pair_offset: usize,
    anim_index_count: usize,
    anim_index_offset: usize,
    string_offset: usize,
    string_size: usize,
    reserved: [u32; 5],
}

impl Header {
    fn read(cursor: &mut BinaryCursor<'_>, limits: &DecodeLimits) -> Result<Self, FormatError> {
        let bone_count = limits.check_bones(cursor.read_u32()?)?;
        let bone_offset = cursor.read_u32()? as usize;
        let pair_count = limits.check_bones(cursor.read_u32()?)?;
        let pair_offset = cursor.read_u32()? as usize;
        let anim_index_count = limits.check_vertices(cursor.read_u32()?, "animation index count")?;
        let anim_index_offset = cursor.read_u32()? as usize;
        let string_offset = cursor.read_u32()? as usize;
        let string_size = cursor.read_u32()? as usize;
        let mut reserved = [0u32; 5];
        for value in reserved.iter_mut() {
            *value = cursor.read_u32()?;
        }
        Ok(Self {
            bone_count,
            bone_offset,
            pair_count,
            pair_offset,
            anim_index_count,
            anim_index_offset,
            string_offset,
            string_size,
            reserved,
        })
    }
}

pub(super) fn decode(
    cursor: &mut BinaryCursor<'_>,
    id: [u8; 8],
    limits: &DecodeLimits,
) -> Result<Decoded<Skeleton>, FormatError> {
    let mut diagnostics = Diagnostics::new();
    let header = Header::read(cursor, limits)?;
    let n = header.bone_count;

    // Bone records
    tracing::trace!("skeleton v0: {} bones at 0x{:X}", n, header.bone_offset);
    cursor.seek(header.bone_offset)?;
    let capacity = cursor.capacity_for(n, INDEXED_BONE_RECORD_SIZE);
    let mut locals = Vec::with_capacity(capacity);
    let mut parents = Vec::with_capacity(capacity);
    let mut bone_padding = Vec::with_capacity(capacity);
    for index in 0..n {
        let start = cursor.position();
        let rotation = sanitize_rotation(
            cursor.read_quat()?,
            || format!("bone {}", index),
            &mut diagnostics,
        );
        let translation = cursor.read_vec3()?;
        parents.push(parse_parent(cursor.read_i32()?, index, n)?);
        let mut padding = [0u32; 4];
        for value in padding.iter_mut() {
            *value = cursor.read_u32()?;
        }
        debug_assert_eq!(cursor.position() - start, INDEXED_BONE_RECORD_SIZE);
        bone_padding.push(padding);
        locals.push(BoneTransform::new(rotation, translation));
    }

    let remap = read_pairs(cursor, &header, &mut diagnostics)?;

    cursor.seek(header.anim_index_offset)?;
    let mut animation_indices = Vec::with_capacity(cursor.capacity_for(header.anim_index_count, 4));
    for _ in 0..header.anim_index_count {
        animation_indices.push(cursor.read_u32()?);
    }

    let names = read_names(cursor, &header)?;

    // Parent-relative -> absolute, parents first
    let order = super::types::topological_order(&parents)?;
    let mut binds = vec![BoneTransform::IDENTITY; n];
    for &i in &order {
        binds[i] = match parents[i] {
            Some(p) => locals[i].compose(&binds[p]),
            None => locals[i],
        };
    }

    let bones: Vec<Bone> = names
        .into_iter()
        .enumerate()
        .map(|(index, name)| Bone {
            index,
            name,
            parent: parents[index],
            local: locals[index],
            bind: binds[index],
            inverse_scale: 1.0,
        })
        .collect();
    check_duplicate_names(&bones, &mut diagnostics);

    let skeleton = Skeleton::new(
        SkeletonFormat::Indexed {
            id,
            reserved: header.reserved,
            animation_indices,
            bone_padding,
        },
        bones,
        Some(remap),
    )?;
    Ok(Decoded::new(skeleton, diagnostics))
}

/// Animation bone id -> skeleton slot pairs
fn read_pairs(
    cursor: &mut BinaryCursor<'_>,
    header: &Header,
    diagnostics: &mut Diagnostics,
) -> Result<BoneRemap, FormatError> {
    cursor.seek(header.pair_offset)?;
    let mut table = HashMap::with_capacity(cursor.capacity_for(header.pair_count, 8));
    for pair in 0..header.pair_count {
        let animation_id = cursor.read_u32()?;
        let slot = cursor.read_u32()?;
        if slot as usize >= header.bone_count {
            diagnostics.warn(format!(
                "remap pair {} maps id 0x{:08X} to bone {} (bone count {}); ignored",
                pair, animation_id, slot, header.bone_count
            ));
            continue;
        }
        if table.contains_key(&animation_id) {
            diagnostics.warn(format!(
                "remap pair {} repeats id 0x{:08X}; first mapping kept",
                pair, animation_id
            ));
            continue;
        }
        table.insert(animation_id, slot);
    }
    Ok(BoneRemap::new(RemapDirection::AnimationToSkeleton, table))
}

/// One name per bone, each a NUL-terminated run padded to a 4-byte boundary
/// measured from the start of the string block.
fn read_names(cursor: &mut BinaryCursor<'_>, header: &Header) -> Result<Vec<String>, FormatError> {
    let start = header.string_offset;
    let end = start
        .checked_add(header.string_size)
        .filter(|&end| end <= cursor.len())
        .ok_or(FormatError::OutOfBounds {
            offset: start,
            len: header.string_size,
            buffer_len: cursor.len(),
        })?;

    cursor.seek(start)?;
    let mut names = Vec::with_capacity(cursor.capacity_for(header.bone_count, 1));
    for index in 0..header.bone_count {
        let run_start = cursor.position();
        loop {
            if cursor.position() >= end {
                return Err(FormatError::malformed(format!(
                    "name of bone {} runs past the string block",
                    index
                )));
            }
            if cursor.read_u8()? == 0 {
                break;
            }
        }
        let run_end = cursor.position();
        let name_bytes = cursor_slice(cursor, run_start, run_end)?;
        names.push(normalize_name(name_bytes));

        let consumed = run_end - start;
        let aligned = start + consumed.div_ceil(4) * 4;
        cursor.seek(aligned.min(end))?;
    }
    Ok(names)
}

/// Re-read an already-validated byte range
fn cursor_slice<'a>(
    cursor: &BinaryCursor<'a>,
    from: usize,
    to: usize,
) -> Result<&'a [u8], FormatError> {
    let mut view = cursor.clone();
    view.seek(from)?;
    view.read_bytes(to - from)
}
