use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local bone transform: translation, rotation and non-uniform scale (TRS).
///
/// Matrices are composed as `T * R * S`. The rotation is expected to be a unit
/// quaternion; every operation here that produces a rotation renormalizes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    #[must_use]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// Decomposes an affine matrix. Shear is lost.
    #[must_use]
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Rotation from Euler angles in radians (XYZ order).
    #[must_use]
    pub fn with_rotation_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
        self
    }

    /// Local matrix `T * R * S`.
    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Interpolates towards `other`: lerp for translation and scale, slerp for
    /// rotation followed by renormalization.
    #[must_use]
    pub fn lerp(&self, other: &Self, alpha: f32) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, alpha),
            rotation: self.rotation.slerp(other.rotation, alpha).normalize(),
            scale: self.scale.lerp(other.scale, alpha),
        }
    }

    /// Additive difference `self - reference`.
    ///
    /// Translation is subtracted, rotation becomes the relative rotation
    /// `self * reference⁻¹`, scale becomes the ratio `self / reference`, so
    /// that [`Transform::IDENTITY`] is the "no change" additive.
    #[must_use]
    pub fn difference(&self, reference: &Self) -> Self {
        Self {
            translation: self.translation - reference.translation,
            rotation: (self.rotation * reference.rotation.inverse()).normalize(),
            scale: self.scale / reference.scale,
        }
    }

    /// Applies `self` as an additive transform on top of `target`.
    ///
    /// Inverse of [`Transform::difference`]:
    /// `source.difference(reference).apply_to(reference) == source`.
    #[must_use]
    pub fn apply_to(&self, target: &Self) -> Self {
        Self {
            translation: target.translation + self.translation,
            rotation: (self.rotation * target.rotation).normalize(),
            scale: target.scale * self.scale,
        }
    }

    /// Returns `true` if every component is within `epsilon` of `other`.
    ///
    /// Rotations are compared up to sign (`q` and `-q` are the same rotation).
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
            && (self.rotation.abs_diff_eq(other.rotation, epsilon)
                || self.rotation.abs_diff_eq(-other.rotation, epsilon))
    }
}
