//! Transform algebra for skeletal rig evaluation.
//!
//! Provides [`Transform3D`], a translation/rotation/scale transform with the
//! composition operations rig solvers need (expressing transforms relative to
//! other frames, inverting, and per-frame blending), plus the [`Lerp`] trait
//! used by all sightline blending code.
//!
//! # Spaces
//!
//! Rig code works with two spaces:
//! - **bone space**: a bone's transform relative to its immediate parent
//! - **component space**: a bone's transform relative to the skeleton root,
//!   obtained by composing bone-space transforms up the parent chain
//!
//! [`Transform3D::compose`] moves a transform one level up (child expressed in
//! its parent's frame); [`Transform3D::relative_to`] moves it back down.

use glam::{Mat4, Quat, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Lerp Trait
// ============================================================================

/// Trait for types that support linear interpolation.
///
/// - `t = 0.0` returns `self`
/// - `t = 1.0` returns `other`
/// - Values outside `[0, 1]` extrapolate
pub trait Lerp {
    /// Linearly interpolates from `self` to `other` by factor `t`.
    fn lerp_to(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp_to(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp_to(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

impl Lerp for Quat {
    /// Normalized lerp, taking the shortest arc.
    #[inline]
    fn lerp_to(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

impl Lerp for Transform3D {
    #[inline]
    fn lerp_to(&self, other: &Self, t: f32) -> Self {
        self.blend(other, t)
    }
}

// ============================================================================
// Transform3D
// ============================================================================

/// A 3D transform (translation, rotation, scale).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform3D {
    /// Position offset.
    pub translation: Vec3,
    /// Rotation quaternion.
    pub rotation: Quat,
    /// Scale factors per axis.
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform3D {
    /// Identity transform (no translation, rotation, or scale).
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a new transform.
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Creates a transform from rotation and translation with unit scale.
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Creates a transform with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Creates a transform with only rotation.
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Converts to a 4x4 matrix (TRS order).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Creates a transform from a 4x4 matrix.
    ///
    /// Note: This assumes the matrix contains only TRS transformations (no shear).
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Expresses `self` (a transform in child space) in `parent`'s space.
    ///
    /// `a.compose(&b)` applies `a` first, then `b`: the result transforms a
    /// point by `b(a(p))`. Composing a bone-space transform with its parent's
    /// component-space transform yields the bone's component-space transform.
    pub fn compose(&self, parent: &Transform3D) -> Transform3D {
        Transform3D {
            translation: parent.translation
                + parent.rotation * (parent.scale * self.translation),
            rotation: parent.rotation * self.rotation,
            scale: parent.scale * self.scale,
        }
    }

    /// Expresses `self` relative to `base`.
    ///
    /// Inverse of [`compose`](Self::compose):
    /// `a.relative_to(&b).compose(&b) == a`.
    pub fn relative_to(&self, base: &Transform3D) -> Transform3D {
        self.compose(&base.inverse())
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Transform3D {
        let inv_rotation = self.rotation.inverse();
        let inv_scale = Vec3::ONE / self.scale;
        let inv_translation = inv_rotation * (-self.translation * inv_scale);
        Transform3D {
            translation: inv_translation,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }

    /// Transforms a point.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Transforms a vector (ignores translation, applies scale).
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    /// Blends toward `other` by `alpha`.
    ///
    /// Translation and scale lerp; rotation uses normalized lerp along the
    /// shortest arc, the cheap per-frame pose blend. `alpha = 0` returns
    /// `self`, `alpha = 1` returns `other`, out-of-range values extrapolate.
    pub fn blend(&self, other: &Transform3D, alpha: f32) -> Transform3D {
        Transform3D {
            translation: self.translation.lerp(other.translation, alpha),
            rotation: self.rotation.lerp(other.rotation, alpha),
            scale: self.scale.lerp(other.scale, alpha),
        }
    }
}

impl From<Transform3D> for Mat4 {
    fn from(t: Transform3D) -> Self {
        t.to_matrix()
    }
}

impl From<Mat4> for Transform3D {
    fn from(m: Mat4) -> Self {
        Transform3D::from_matrix(m)
    }
}
