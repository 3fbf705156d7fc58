//! Flat (one item per bone) pose sampling.

use crate::blend::{accumulate_bone, seed_bone};
use crate::config::PoseConfig;
use crate::pose::BonePose;
use crate::sampler::{first_index, ClipSampler};

/// Blend every active sampler of the owning instance at `bone_index`.
///
/// Returns `None` when nothing is active so the caller keeps its current
/// transform. Multi-sampler rotations are written as accumulated, without
/// renormalization; see [`crate::buffer::sample_bone_buffer`] for the path that
/// does renormalize.
pub fn sample_flat_bone(
    samplers: &[ClipSampler],
    bone_index: usize,
    cfg: &PoseConfig,
) -> Option<BonePose> {
    let start = first_index(samplers, |s| s.is_active(cfg))?;
    let first = &samplers[start];
    let mut pose = seed_bone(bone_index, first.clip.as_ref(), first.normalized_time, first.weight);

    for sampler in samplers[start + 1..].iter().filter(|s| s.is_active(cfg)) {
        accumulate_bone(
            &mut pose,
            bone_index,
            sampler.clip.as_ref(),
            sampler.normalized_time,
            sampler.weight,
        );
    }
    Some(pose)
}
