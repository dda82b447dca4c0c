//! Legacy skeleton layout (v1, v2)
//!
//! # Layout
//! ```text
//! 0x00: id [u8; 8]
//! 0x08: version u32
//! 0x0C: designer_id u32
//! 0x10: bone_count u32
//! 0x14: bones (bone_count × 96 bytes)
//!       name [u8; 32], parent i32, scale f32, matrix [f32; 12]
//! v2:   bone_id_count u32, bone_ids [u32; bone_id_count]
//! ```
//!
//! The matrix is four 3-float columns (x axis, y axis, z axis, translation)
//! holding the bone's absolute bind transform.

use hashbrown::HashMap;

use super::types::{Bone, BoneRemap, RemapDirection, Skeleton, SkeletonFormat};
use super::{LEGACY_BONE_RECORD_SIZE, check_duplicate_names, parse_parent};
use crate::cursor::BinaryCursor;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::FormatError;
use crate::limits::DecodeLimits;
use crate::name::normalize_name;
use crate::transform::BoneTransform;

const NAME_SIZE: usize = 32;

/// Version that appends the vertex palette bone-id table
const VERSION_WITH_ID_TABLE: u32 = 2;

pub(super) fn decode(
    cursor: &mut BinaryCursor<'_>,
    id: [u8; 8],
    version: u32,
    limits: &DecodeLimits,
) -> Result<Decoded<Skeleton>, FormatError> {
    let mut diagnostics = Diagnostics::new();

    let designer_id = cursor.read_u32()?;
    let bone_count = limits.check_bones(cursor.read_u32()?)?;

    // Parents are resolved after all records are read since a parent may
    // appear later in the file.
    let mut records = Vec::with_capacity(cursor.capacity_for(bone_count, LEGACY_BONE_RECORD_SIZE));
    for index in 0..bone_count {
        let name = normalize_name(cursor.read_fixed_chars(NAME_SIZE)?);
        let parent = parse_parent(cursor.read_i32()?, index, bone_count)?;
        let scale = cursor.read_f32()?;
        let mut matrix = [0.0f32; 12];
        for value in matrix.iter_mut() {
            *value = cursor.read_f32()?;
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(FormatError::malformed(format!(
                "bone {} ('{}') has a non-finite bind matrix",
                index, name
            )));
        }
        records.push((name, parent, scale, BoneTransform::from_columns_3x4(&matrix)));
    }

    let bones: Vec<Bone> = records
        .iter()
        .enumerate()
        .map(|(index, (name, parent, scale, bind))| {
            let local = match parent {
                Some(p) => bind.compose(&records[*p].3.inverse()),
                None => *bind,
            };
            Bone {
                index,
                name: name.clone(),
                parent: *parent,
                local,
                bind: *bind,
                inverse_scale: *scale,
            }
        })
        .collect();

    let remap = if version == VERSION_WITH_ID_TABLE {
        Some(read_id_table(cursor, bone_count, limits, &mut diagnostics)?)
    } else {
        None
    };

    if cursor.remaining() > 0 {
        diagnostics.info(format!(
            "{} trailing bytes after legacy skeleton",
            cursor.remaining()
        ));
    }
    check_duplicate_names(&bones, &mut diagnostics);

    let skeleton = Skeleton::new(
        SkeletonFormat::Legacy {
            id,
            version,
            designer_id,
        },
        bones,
        remap,
    )?;
    Ok(Decoded::new(skeleton, diagnostics))
}

/// Read the vertex palette table: entry `i` names the skeleton slot used by
/// vertex bone index `i`.
fn read_id_table(
    cursor: &mut BinaryCursor<'_>,
    bone_count: usize,
    limits: &DecodeLimits,
    diagnostics: &mut Diagnostics,
) -> Result<BoneRemap, FormatError> {
    let count = limits.check_bones(cursor.read_u32()?)?;
    let mut table = HashMap::with_capacity(cursor.capacity_for(count, 4));
    for slot in 0..count {
        let bone = cursor.read_u32()?;
        if bone as usize >= bone_count {
            diagnostics.warn(format!(
                "bone id table entry {} names bone {} (bone count {}); vertices using it fall back to the root",
                slot, bone, bone_count
            ));
        }
        table.insert(slot as u32, bone);
    }
    Ok(BoneRemap::new(RemapDirection::VertexToSkeleton, table))
}
