//! In-memory buffer builders for tests
//!
//! Only compiled for this crate's tests or with the `test-fixtures` feature.
//! Layouts mirror the decoders' module docs.

use glam::{Quat, Vec2, Vec3};

/// Little-endian byte sink
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    pub bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.bytes.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn vec2(&mut self, v: Vec2) -> &mut Self {
        self.f32(v.x).f32(v.y)
    }

    pub fn vec3(&mut self, v: Vec3) -> &mut Self {
        self.f32(v.x).f32(v.y).f32(v.z)
    }

    pub fn quat(&mut self, q: Quat) -> &mut Self {
        self.f32(q.x).f32(q.y).f32(q.z).f32(q.w)
    }

    /// Fixed-width NUL-padded name
    pub fn name(&mut self, name: &str, width: usize) -> &mut Self {
        let mut block = vec![0u8; width];
        let n = name.len().min(width);
        block[..n].copy_from_slice(&name.as_bytes()[..n]);
        self.bytes.extend_from_slice(&block);
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Overwrite a u32 written earlier (for back-patching offsets)
    pub fn patch_u32(&mut self, at: usize, v: u32) {
        self.bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    pub fn finish(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// 3×4 column block for a rotation + translation
pub fn columns_3x4(rotation: Quat, translation: Vec3) -> [f32; 12] {
    let m = glam::Mat3::from_quat(rotation);
    let mut out = [0.0f32; 12];
    out[0..3].copy_from_slice(&m.x_axis.to_array());
    out[3..6].copy_from_slice(&m.y_axis.to_array());
    out[6..9].copy_from_slice(&m.z_axis.to_array());
    out[9..12].copy_from_slice(&translation.to_array());
    out
}

/// Bone description shared by the skeleton builders
#[derive(Debug, Clone)]
pub struct BoneSpec {
    pub name: String,
    pub parent: i32,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl BoneSpec {
    pub fn new(name: &str, parent: i32, translation: Vec3) -> Self {
        Self {
            name: name.to_string(),
            parent,
            rotation: Quat::IDENTITY,
            translation,
        }
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Legacy (v1/v2) skeleton; transforms in `bones` are absolute.
pub fn legacy_skeleton(version: u32, bones: &[BoneSpec], id_table: Option<&[u32]>) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.raw(b"SKELETON").u32(version).u32(0xDE51).u32(bones.len() as u32);
    for bone in bones {
        w.name(&bone.name, 32).i32(bone.parent).f32(1.0);
        for v in columns_3x4(bone.rotation, bone.translation) {
            w.f32(v);
        }
    }
    if let Some(ids) = id_table {
        w.u32(ids.len() as u32);
        for &id in ids {
            w.u32(id);
        }
    }
    w.finish()
}

/// Indexed (v0) skeleton; transforms in `bones` are parent-relative.
///
/// Sections are written in reverse order (strings first) so the decoder
/// has to follow the header offsets.
pub fn indexed_skeleton(bones: &[BoneSpec], pairs: &[(u32, u32)], anim_indices: &[u32]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.raw(b"SKELIDX0").u32(0);
    let header_fields = w.len();
    for _ in 0..13 {
        w.u32(0);
    }
    assert_eq!(w.len(), 64);

    let string_offset = w.len();
    for bone in bones {
        w.raw(bone.name.as_bytes()).u8(0);
        while (w.len() - string_offset) % 4 != 0 {
            w.u8(0);
        }
    }
    let string_size = w.len() - string_offset;

    let anim_index_offset = w.len();
    for &v in anim_indices {
        w.u32(v);
    }

    let pair_offset = w.len();
    for &(id, slot) in pairs {
        w.u32(id).u32(slot);
    }

    let bone_offset = w.len();
    for bone in bones {
        w.quat(bone.rotation)
            .vec3(bone.translation)
            .i32(bone.parent)
            .u32(0xAAAA_0001)
            .u32(0)
            .u32(0)
            .u32(0);
    }

    let fields = [
        bones.len(),
        bone_offset,
        pairs.len(),
        pair_offset,
        anim_indices.len(),
        anim_index_offset,
        string_offset,
        string_size,
    ];
    for (i, v) in fields.iter().enumerate() {
        w.patch_u32(header_fields + i * 4, *v as u32);
    }
    w.finish()
}

/// Vertex description for the mesh builder
#[derive(Debug, Clone, Copy)]
pub struct VertexSpec {
    pub position: Vec3,
    pub bone_indices: [u8; 4],
    pub bone_weights: [f32; 4],
    pub normal: Vec3,
    pub uv: Vec2,
}

impl VertexSpec {
    pub fn rigid(position: Vec3, bone: u8) -> Self {
        Self {
            position,
            bone_indices: [bone, 0, 0, 0],
            bone_weights: [1.0, 0.0, 0.0, 0.0],
            normal: Vec3::Y,
            uv: Vec2::ZERO,
        }
    }
}

/// Material range: name, start vertex, vertex count, start index, index count
pub type MaterialSpec<'a> = (&'a str, i32, i32, i32, i32);

pub fn mesh(
    version: i16,
    materials: &[MaterialSpec<'_>],
    indices: &[u16],
    vertices: &[VertexSpec],
    trailer: [i32; 3],
) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.i32(0x4853_454D).i16(version).i16(1).i32(materials.len() as i32);
    for &(name, sv, vc, si, ic) in materials {
        w.name(name, 64).i32(sv).i32(vc).i32(si).i32(ic);
    }
    w.i32(indices.len() as i32).i32(vertices.len() as i32);
    for &i in indices {
        w.u16(i);
    }
    for v in vertices {
        w.vec3(v.position);
        for b in v.bone_indices {
            w.u8(b);
        }
        for wt in v.bone_weights {
            w.f32(wt);
        }
        w.vec3(v.normal).vec2(v.uv);
    }
    if version == 2 {
        for t in trailer {
            w.i32(t);
        }
    }
    w.finish()
}

/// Bone-major animation (v0-v3); keyframes are parent-relative.
pub fn direct_animation(version: u32, fps: u32, frame_count: u32, bones: &[(&str, Vec<(Quat, Vec3)>)]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.raw(b"ANIMATIO")
        .u32(version)
        .u32(0x4D49_4E41)
        .u32(bones.len() as u32)
        .u32(frame_count)
        .u32(fps);
    for (name, frames) in bones {
        w.name(name, 32).u32(0);
        for (q, p) in frames {
            w.quat(*q).vec3(*p);
        }
    }
    w.finish()
}

/// One lookup record of the indexed (v4) animation
#[derive(Debug, Clone, Copy)]
pub struct LookupSpec {
    pub bone_id: u32,
    pub position: u16,
    pub orientation: u16,
}

/// Indexed, frame-major animation (v4). `lookups` holds `frame_count * bone_count`
/// records, frame-major.
pub fn indexed_animation(
    bone_count: u32,
    frame_count: u32,
    seconds_per_frame: f32,
    positions: &[Vec3],
    orientations: &[Quat],
    lookups: &[LookupSpec],
) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.raw(b"ANIMIDX4").u32(4).u32(bone_count).u32(frame_count).f32(seconds_per_frame);
    let offsets_at = w.len();
    for _ in 0..5 {
        w.u32(0);
    }

    let position_offset = w.len();
    for &p in positions {
        w.vec3(p);
    }
    let orientation_offset = w.len();
    for &q in orientations {
        w.quat(q);
    }
    let lookup_offset = w.len();
    for l in lookups {
        w.u32(l.bone_id).u16(l.position).u16(0).u16(l.orientation).u16(0);
    }

    let fields = [
        position_offset,
        positions.len(),
        orientation_offset,
        orientations.len(),
        lookup_offset,
    ];
    for (i, v) in fields.iter().enumerate() {
        w.patch_u32(offsets_at + i * 4, *v as u32);
    }
    w.finish()
}
