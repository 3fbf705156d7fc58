//! Root motion: frame-over-frame delta of the root bone (bone 0).
//!
//! Only samplers whose time moved forward this frame take part, so a clip that
//! wrapped past its loop point never produces a jump back to its start pose.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::blend::{accumulate_bone, seed_bone};
use crate::config::PoseConfig;
use crate::pose::delta_rotation;
use crate::sampler::{first_index, ClipSampler};

pub const ROOT_BONE: usize = 0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootDelta {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for RootDelta {
    fn default() -> Self {
        Self::ZERO
    }
}

impl RootDelta {
    pub const ZERO: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Move a world transform by this delta.
    #[inline]
    pub fn apply_to(&self, translation: &mut Vec3, rotation: &mut Quat) {
        *translation += self.translation;
        *rotation = self.rotation * *rotation;
    }
}

/// Blend the root bone at both the current and previous times over the
/// samplers that advanced, and return the difference.
pub fn extract_root_delta(samplers: &[ClipSampler], cfg: &PoseConfig) -> RootDelta {
    let include = |s: &ClipSampler| s.contributes_to_delta(cfg);
    let Some(start) = first_index(samplers, include) else {
        return RootDelta::ZERO;
    };

    let first = &samplers[start];
    let clip = first.clip.as_ref();
    let mut current = seed_bone(ROOT_BONE, clip, first.normalized_time, first.weight);
    let mut previous = seed_bone(ROOT_BONE, clip, first.previous_normalized_time, first.weight);

    for sampler in samplers[start + 1..].iter().filter(|s| include(*s)) {
        let clip = sampler.clip.as_ref();
        accumulate_bone(&mut current, ROOT_BONE, clip, sampler.normalized_time, sampler.weight);
        accumulate_bone(
            &mut previous,
            ROOT_BONE,
            clip,
            sampler.previous_normalized_time,
            sampler.weight,
        );
    }

    RootDelta {
        translation: current.translation - previous.translation,
        rotation: delta_rotation(previous.rotation, current.rotation),
    }
}
