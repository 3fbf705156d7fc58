//! Weighted pose blending primitive shared by every sampler path.
//!
//! Translation and scale are stored pre-multiplied by weight and accumulate
//! additively. Rotation accumulates as a weighted quaternion sum; the sum is only
//! a rotation after normalization, which the caller performs when (and only when)
//! more than one contribution was added.

use crate::clip::PoseClip;
use crate::pose::{accumulate_quat, BonePose};

/// Start an accumulator from the first contributing pose.
#[inline]
pub fn seed_weighted(pose: BonePose, weight: f32) -> BonePose {
    BonePose {
        translation: pose.translation * weight,
        rotation: pose.rotation * weight,
        scale: pose.scale * weight,
    }
}

/// Blend one more contribution into an existing accumulator, in place.
#[inline]
pub fn accumulate_weighted(acc: &mut BonePose, pose: BonePose, weight: f32) {
    acc.translation += pose.translation * weight;
    acc.rotation = accumulate_quat(acc.rotation, pose.rotation, weight);
    acc.scale += pose.scale * weight;
}

/// Seed: sample `clip` at `bone` / `normalized_time` and weight it.
#[inline]
pub fn seed_bone(bone: usize, clip: &dyn PoseClip, normalized_time: f32, weight: f32) -> BonePose {
    seed_weighted(clip.sample_bone(bone, normalized_time), weight)
}

/// Accumulate: sample `clip` at `bone` / `normalized_time` and blend it into `acc`.
#[inline]
pub fn accumulate_bone(
    acc: &mut BonePose,
    bone: usize,
    clip: &dyn PoseClip,
    normalized_time: f32,
    weight: f32,
) {
    accumulate_weighted(acc, clip.sample_bone(bone, normalized_time), weight);
}
