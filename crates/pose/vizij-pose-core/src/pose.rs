//! Bone pose (translation / rotation / non-uniform scale) and the quaternion
//! helpers shared by the blend and root-motion paths.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A bone transform. Depending on where it lives this is local (relative to the
/// parent bone), bone-to-root, or a weighted accumulator mid-blend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BonePose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BonePose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BonePose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Parent-then-child composition: `self` is the parent, `child` is expressed
    /// in the parent's space. The result is the child expressed in the space the
    /// parent is expressed in.
    #[inline]
    pub fn mul_pose(&self, child: &BonePose) -> BonePose {
        BonePose {
            translation: self.translation + self.rotation * (self.scale * child.translation),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    /// Normalize the rotation in place; a zero-length rotation becomes identity.
    #[inline]
    pub fn normalize_rotation(&mut self) {
        self.rotation = normalize_or_identity(self.rotation);
    }
}

/// Normalize a quaternion, falling back to identity for a zero-length input.
#[inline]
pub fn normalize_or_identity(q: Quat) -> Quat {
    let len2 = q.length_squared();
    if len2 > 0.0 {
        q * len2.sqrt().recip()
    } else {
        Quat::IDENTITY
    }
}

/// Add `q * weight` to `acc` componentwise. Not a unit rotation until normalized.
#[inline]
pub fn accumulate_quat(acc: Quat, q: Quat, weight: f32) -> Quat {
    acc + q * weight
}

/// Full quaternion inverse (`conj(q) / |q|^2`). Unlike [`Quat::inverse`] this is
/// correct for the non-unit quaternions produced by weighted accumulation.
#[inline]
pub fn inverse_quat(q: Quat) -> Quat {
    let len2 = q.length_squared();
    if len2 > 0.0 {
        q.conjugate() * len2.recip()
    } else {
        Quat::IDENTITY
    }
}

/// The rotation `d` such that `d * from == to`.
#[inline]
pub fn delta_rotation(from: Quat, to: Quat) -> Quat {
    to * inverse_quat(from)
}
