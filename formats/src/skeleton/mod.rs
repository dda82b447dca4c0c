//! Skeleton decoding (bone hierarchy + bind pose)
//!
//! # Common prefix
//! ```text
//! 0x00: id [u8; 8]
//! 0x08: version u32   - 1/2 = legacy flat records, 0 = indexed sections
//! ```
//!
//! Both layouts are normalized to the same [`Skeleton`]: names lower-cased,
//! bind transforms absolute, parent links validated.

mod indexed;
mod legacy;
mod types;


pub use types::{Bone, BoneRemap, RemapDirection, Skeleton, SkeletonFormat};

use crate::cursor::BinaryCursor;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::{AssetKind, FormatError};
use crate::limits::DecodeLimits;

/// Size of one legacy bone record (name + parent + scale + 3×4 matrix)
pub const LEGACY_BONE_RECORD_SIZE: usize = 96;

/// Size of the indexed (v0) header
pub const INDEXED_HEADER_SIZE: usize = 64;

/// Size of one indexed (v0) bone record
pub const INDEXED_BONE_RECORD_SIZE: usize = 48;

/// Decode a skeleton buffer with default limits
pub fn decode_skeleton(data: &[u8]) -> Result<Decoded<Skeleton>, FormatError> {
    decode_skeleton_with(data, &DecodeLimits::default())
}

/// Decode a skeleton buffer, dispatching on the version field
pub fn decode_skeleton_with(
    data: &[u8],
    limits: &DecodeLimits,
) -> Result<Decoded<Skeleton>, FormatError> {
    let mut cursor = BinaryCursor::new(data);
    let id = cursor.read_array::<8>()?;
    let version = cursor.read_u32()?;
    tracing::trace!("skeleton: version {} ({} bytes)", version, data.len());

    match version {
        0 => indexed::decode(&mut cursor, id, limits),
        1 | 2 => legacy::decode(&mut cursor, id, version, limits),
        other => Err(FormatError::UnsupportedVersion {
            kind: AssetKind::Skeleton,
            version: other as i64,
        }),
    }
}

/// Warn about names that appear more than once; name matching picks the first.
fn check_duplicate_names(bones: &[Bone], diagnostics: &mut Diagnostics) {
    let mut seen = hashbrown::HashSet::new();
    for bone in bones {
        if !bone.name.is_empty() && !seen.insert(bone.name.as_str()) {
            diagnostics.warn(format!(
                "duplicate bone name '{}' at slot {}",
                bone.name, bone.index
            ));
        }
    }
}

/// Parent field in the on-disk convention: -1 is root, anything else must be a slot.
fn parse_parent(raw: i32, index: usize, bone_count: usize) -> Result<Option<usize>, FormatError> {
    match raw {
        -1 => Ok(None),
        p if p >= 0 && (p as usize) < bone_count => Ok(Some(p as usize)),
        p => Err(FormatError::malformed(format!(
            "bone {} has parent index {} (bone count {})",
            index, p, bone_count
        ))),
    }
}
