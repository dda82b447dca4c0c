//! Rigid bone transform (rotation then translation)

use glam::{Mat3, Mat4, Quat, Vec3};

/// Orientation + position pair used for bind poses and keyframes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BoneTransform {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Build from a 3×4 block stored as four 3-float columns
    /// (x axis, y axis, z axis, translation).
    ///
    /// Any scale baked into the axes is discarded; the rotation is
    /// re-normalized.
    pub fn from_columns_3x4(m: &[f32; 12]) -> Self {
        let x = Vec3::new(m[0], m[1], m[2]).normalize_or(Vec3::X);
        let y = Vec3::new(m[3], m[4], m[5]).normalize_or(Vec3::Y);
        let z = Vec3::new(m[6], m[7], m[8]).normalize_or(Vec3::Z);
        let rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
        Self {
            rotation,
            translation: Vec3::new(m[9], m[10], m[11]),
        }
    }

    /// Affine matrix: rotate, then translate
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// `parent ⊗ self`: express a parent-relative transform in the parent's space
    pub fn compose(&self, parent: &BoneTransform) -> BoneTransform {
        BoneTransform {
            rotation: (parent.rotation * self.rotation).normalize(),
            translation: parent.translation + parent.rotation * self.translation,
        }
    }

    pub fn inverse(&self) -> BoneTransform {
        let rotation = self.rotation.inverse();
        BoneTransform {
            rotation,
            translation: -(rotation * self.translation),
        }
    }
}

/// Normalize a stored quaternion, falling back to identity for zero-length
/// or non-finite data.
pub(crate) fn sanitize_rotation(
    q: Quat,
    context: impl FnOnce() -> String,
    diagnostics: &mut crate::diagnostics::Diagnostics,
) -> Quat {
    let len = q.length();
    if !len.is_finite() || len < 1e-6 {
        diagnostics.warn(format!(
            "{}: degenerate rotation replaced with identity",
            context()
        ));
        return Quat::IDENTITY;
    }
    q / len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn test_sanitize_rotation() {
        let mut diags = crate::diagnostics::Diagnostics::new();
        let q = sanitize_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 2.0), || "k".into(), &mut diags);
        assert_eq!(q, Quat::IDENTITY);
        assert!(diags.is_empty());

        let q = sanitize_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0), || "k".into(), &mut diags);
        assert_eq!(q, Quat::IDENTITY);
        assert!(diags.has_warnings());
    }

    #[test]
    fn test_identity_matrix() {
        assert_eq!(BoneTransform::IDENTITY.to_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn test_compose_matches_matrix_product() {
        let parent = BoneTransform::new(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(5.0, 0.0, 0.0),
        );
        let child = BoneTransform::new(Quat::from_rotation_x(0.3), Vec3::new(0.0, 3.0, 0.0));
        let composed = child.compose(&parent);
        assert!(approx(composed.to_mat4(), parent.to_mat4() * child.to_mat4()));
    }

    #[test]
    fn test_inverse() {
        let t = BoneTransform::new(Quat::from_rotation_y(1.1), Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(t.to_mat4() * t.inverse().to_mat4(), Mat4::IDENTITY));
        assert!(approx(t.inverse().to_mat4(), t.to_mat4().inverse()));
    }

    #[test]
    fn test_from_columns_translation() {
        let m = [
            1.0, 0.0, 0.0, // x axis
            0.0, 1.0, 0.0, // y axis
            0.0, 0.0, 1.0, // z axis
            4.0, 5.0, 6.0, // translation
        ];
        let t = BoneTransform::from_columns_3x4(&m);
        assert_eq!(t.translation, Vec3::new(4.0, 5.0, 6.0));
        assert!(t.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_from_columns_rotation() {
        let r = Mat3::from_rotation_z(0.7);
        let mut m = [0.0f32; 12];
        m[0..3].copy_from_slice(&r.x_axis.to_array());
        m[3..6].copy_from_slice(&r.y_axis.to_array());
        m[6..9].copy_from_slice(&r.z_axis.to_array());
        let t = BoneTransform::from_columns_3x4(&m);
        let expected = Quat::from_rotation_z(0.7);
        assert!(t.rotation.dot(expected).abs() > 0.9999);
    }
}
