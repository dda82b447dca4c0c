//! GPU-ready bone matrices

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// 3x4 affine bone matrix (row-major storage, POD type)
///
/// Stores the top 3 rows of a 4x4 affine matrix; the implicit 4th row is
/// [0, 0, 0, 1]. Each row is [Xx, Xy, Xz, Tx] etc. 48 bytes, suitable for a
/// storage buffer upload via [`as_bytes`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BoneMatrix3x4 {
    /// First row: [m00, m01, m02, tx]
    pub row0: [f32; 4],
    /// Second row: [m10, m11, m12, ty]
    pub row1: [f32; 4],
    /// Third row: [m20, m21, m22, tz]
    pub row2: [f32; 4],
}

impl BoneMatrix3x4 {
    /// Identity bone matrix (no transformation)
    pub const IDENTITY: Self = Self {
        row0: [1.0, 0.0, 0.0, 0.0],
        row1: [0.0, 1.0, 0.0, 0.0],
        row2: [0.0, 0.0, 1.0, 0.0],
    };

    /// Drop the projective row of an affine matrix
    pub fn from_mat4(m: &Mat4) -> Self {
        Self {
            row0: m.row(0).to_array(),
            row1: m.row(1).to_array(),
            row2: m.row(2).to_array(),
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols(
            Vec4::new(self.row0[0], self.row1[0], self.row2[0], 0.0),
            Vec4::new(self.row0[1], self.row1[1], self.row2[1], 0.0),
            Vec4::new(self.row0[2], self.row1[2], self.row2[2], 0.0),
            Vec4::new(self.row0[3], self.row1[3], self.row2[3], 1.0),
        )
    }

    /// Flat f32 array (row-major)
    pub fn to_array(&self) -> [f32; 12] {
        bytemuck::cast(*self)
    }
}

impl From<Mat4> for BoneMatrix3x4 {
    fn from(m: Mat4) -> Self {
        Self::from_mat4(&m)
    }
}

/// View a matrix palette as raw bytes for upload
pub fn as_bytes(matrices: &[BoneMatrix3x4]) -> &[u8] {
    bytemuck::cast_slice(matrices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_identity() {
        assert_eq!(BoneMatrix3x4::from_mat4(&Mat4::IDENTITY), BoneMatrix3x4::IDENTITY);
        assert_eq!(BoneMatrix3x4::IDENTITY.to_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation_in_last_column() {
        let m = BoneMatrix3x4::from_mat4(&Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(m.row0[3], 1.0);
        assert_eq!(m.row1[3], 2.0);
        assert_eq!(m.row2[3], 3.0);
    }

    #[test]
    fn test_round_trip_affine() {
        let m = Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.7),
            Vec3::new(-4.0, 0.5, 9.0),
        );
        assert!(BoneMatrix3x4::from_mat4(&m).to_mat4().abs_diff_eq(m, 1e-6));
    }

    #[test]
    fn test_byte_layout() {
        assert_eq!(std::mem::size_of::<BoneMatrix3x4>(), 48);
        let palette = [BoneMatrix3x4::IDENTITY; 2];
        let bytes = as_bytes(&palette);
        assert_eq!(bytes.len(), 96);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(BoneMatrix3x4::IDENTITY.to_array()[5], 1.0);
    }
}
