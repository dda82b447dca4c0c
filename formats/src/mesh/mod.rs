//! Mesh decoding (skinned vertices, indices, material ranges)
//!
//! # Layout
//! ```text
//! 0x00: magic i32
//! 0x04: version i16          - 1 or 2
//! 0x06: object_count i16
//! 0x08: material_count i32
//!       materials (material_count × 80 bytes)
//!         name [u8; 64], start_vertex i32, vertex_count i32, start_index i32, index_count i32
//!       index_count i32
//!       vertex_count i32
//!       indices (index_count × u16)
//!       vertices (vertex_count × 52 bytes)
//!         position [f32; 3], bone_index [u8; 4], bone_weight [f32; 4], normal [f32; 3], uv [f32; 2]
//! v2:   trailer [i32; 3]
//! ```
//!
//! Bone weights are passed through as stored; nothing renormalizes them here.


use glam::{Vec2, Vec3};

use crate::cursor::BinaryCursor;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::{AssetKind, FormatError};
use crate::limits::DecodeLimits;
use crate::name::c_string;

/// Size of one vertex record in bytes
pub const VERTEX_RECORD_SIZE: usize = 52;

/// Size of one material header in bytes
pub const MATERIAL_RECORD_SIZE: usize = 80;

const MATERIAL_NAME_SIZE: usize = 64;

/// Influences per vertex
pub const BONES_PER_VERTEX: usize = 4;

/// A skinned vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Skeleton bone slots (after any remap applied by the pose layer)
    pub bone_indices: [u32; BONES_PER_VERTEX],
    pub bone_weights: [f32; BONES_PER_VERTEX],
}

impl Vertex {
    pub fn weight_sum(&self) -> f32 {
        self.bone_weights.iter().sum()
    }
}

/// A submesh range sharing one material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRange {
    pub name: String,
    pub start_vertex: u32,
    pub vertex_count: u32,
    pub start_index: u32,
    pub index_count: u32,
}

/// Decoded mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub version: i16,
    /// Leading magic, kept as read
    pub magic: i32,
    pub object_count: i16,
    pub materials: Vec<MaterialRange>,
    pub indices: Vec<u16>,
    pub vertices: Vec<Vertex>,
    /// Three trailing values present in version 2, meaning unknown
    pub trailer: Option<[i32; 3]>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Decode a mesh buffer with default limits
pub fn decode_mesh(data: &[u8]) -> Result<Decoded<Mesh>, FormatError> {
    decode_mesh_with(data, &DecodeLimits::default())
}

/// Decode a mesh buffer
pub fn decode_mesh_with(data: &[u8], limits: &DecodeLimits) -> Result<Decoded<Mesh>, FormatError> {
    let mut cursor = BinaryCursor::new(data);
    let mut diagnostics = Diagnostics::new();

    let magic = cursor.read_i32()?;
    let version = cursor.read_i16()?;
    let object_count = cursor.read_i16()?;
    if !matches!(version, 1 | 2) {
        return Err(FormatError::UnsupportedVersion {
            kind: AssetKind::Mesh,
            version: version as i64,
        });
    }
    tracing::trace!("mesh: version {} ({} bytes)", version, data.len());

    let material_count = read_count(&mut cursor, "material count", limits)?;
    let mut materials =
        Vec::with_capacity(cursor.capacity_for(material_count, MATERIAL_RECORD_SIZE));
    for _ in 0..material_count {
        let name = c_string(cursor.read_fixed_chars(MATERIAL_NAME_SIZE)?);
        let start_vertex = read_count(&mut cursor, "material start vertex", limits)? as u32;
        let vertex_count = read_count(&mut cursor, "material vertex count", limits)? as u32;
        let start_index = read_count(&mut cursor, "material start index", limits)? as u32;
        let index_count = read_count(&mut cursor, "material index count", limits)? as u32;
        materials.push(MaterialRange {
            name,
            start_vertex,
            vertex_count,
            start_index,
            index_count,
        });
    }

    let index_count = read_count(&mut cursor, "index count", limits)?;
    let vertex_count = read_count(&mut cursor, "vertex count", limits)?;

    let mut indices = Vec::with_capacity(cursor.capacity_for(index_count, 2));
    for _ in 0..index_count {
        indices.push(cursor.read_u16()?);
    }

    let mut vertices = Vec::with_capacity(cursor.capacity_for(vertex_count, VERTEX_RECORD_SIZE));
    for _ in 0..vertex_count {
        vertices.push(read_vertex(&mut cursor)?);
    }

    let trailer = if version == 2 {
        Some([cursor.read_i32()?, cursor.read_i32()?, cursor.read_i32()?])
    } else {
        None
    };

    check_references(&materials, &indices, vertex_count, &mut diagnostics);
    if index_count % 3 != 0 {
        diagnostics.warn(format!(
            "index count {} is not a multiple of 3",
            index_count
        ));
    }
    if cursor.remaining() > 0 {
        diagnostics.info(format!("{} trailing bytes after mesh", cursor.remaining()));
    }

    Ok(Decoded::new(
        Mesh {
            version,
            magic,
            object_count,
            materials,
            indices,
            vertices,
            trailer,
        },
        diagnostics,
    ))
}

fn read_count(
    cursor: &mut BinaryCursor<'_>,
    what: &str,
    limits: &DecodeLimits,
) -> Result<usize, FormatError> {
    let raw = cursor.read_i32()?;
    if raw < 0 {
        return Err(FormatError::malformed(format!("negative {} {}", what, raw)));
    }
    limits.check_vertices(raw as u32, what)
}

fn read_vertex(cursor: &mut BinaryCursor<'_>) -> Result<Vertex, FormatError> {
    let position = cursor.read_vec3()?;
    let mut bone_indices = [0u32; BONES_PER_VERTEX];
    for slot in bone_indices.iter_mut() {
        *slot = cursor.read_u8()? as u32;
    }
    let mut bone_weights = [0.0f32; BONES_PER_VERTEX];
    for weight in bone_weights.iter_mut() {
        *weight = cursor.read_f32()?;
    }
    let normal = cursor.read_vec3()?;
    let uv = cursor.read_vec2()?;
    Ok(Vertex {
        position,
        normal,
        uv,
        bone_indices,
        bone_weights,
    })
}

/// Out-of-range indices and material ranges degrade rendering but are not fatal.
fn check_references(
    materials: &[MaterialRange],
    indices: &[u16],
    vertex_count: usize,
    diagnostics: &mut Diagnostics,
) {
    if let Some((pos, &index)) = indices
        .iter()
        .enumerate()
        .find(|(_, i)| **i as usize >= vertex_count)
    {
        let total = indices
            .iter()
            .filter(|i| **i as usize >= vertex_count)
            .count();
        diagnostics.warn(format!(
            "{} indices exceed vertex count {} (first: index[{}] = {})",
            total, vertex_count, pos, index
        ));
    }

    for material in materials {
        let vertex_end = material.start_vertex as u64 + material.vertex_count as u64;
        let index_end = material.start_index as u64 + material.index_count as u64;
        if vertex_end > vertex_count as u64 || index_end > indices.len() as u64 {
            diagnostics.warn(format!(
                "material '{}' range exceeds mesh buffers (vertices {}..{} of {}, indices {}..{} of {})",
                material.name,
                material.start_vertex,
                vertex_end,
                vertex_count,
                material.start_index,
                index_end,
                indices.len()
            ));
        }
    }
}
