//! Hierarchical sampling into a per-instance bone buffer.
//!
//! The buffer is used in two phases within one frame:
//! 1. local poses: every active sampler is blended into it bone by bone
//! 2. bone-to-root poses: the hierarchy walk overwrites each entry in place
//!
//! Between frames the buffer always holds bone-to-root poses.

use log::trace;

use crate::blend::{accumulate_weighted, seed_weighted};
use crate::clip::PoseClip;
use crate::config::PoseConfig;
use crate::hierarchy::SkeletonHierarchy;
use crate::pose::BonePose;
use crate::sampler::ClipSampler;

/// Blends whole-skeleton clip samples into a borrowed bone buffer.
#[derive(Debug)]
pub struct BufferPoseBlender<'a> {
    poses: &'a mut [BonePose],
    sampled: usize,
}

impl<'a> BufferPoseBlender<'a> {
    pub fn new(poses: &'a mut [BonePose]) -> Self {
        Self { poses, sampled: 0 }
    }

    /// Number of clips blended so far.
    #[inline]
    pub fn sampled(&self) -> usize {
        self.sampled
    }

    /// Blend a full-skeleton sample of `clip`. The first call seeds every bone it
    /// touches; later calls accumulate. Bones past the buffer end are ignored.
    pub fn sample_clip(&mut self, clip: &dyn PoseClip, normalized_time: f32, weight: f32) {
        let seeding = self.sampled == 0;
        let poses = &mut *self.poses;
        let mut skipped = 0usize;
        clip.sample_pose(normalized_time, &mut |bone, pose| {
            let Some(slot) = poses.get_mut(bone) else {
                skipped += 1;
                return;
            };
            if seeding {
                *slot = seed_weighted(pose, weight);
            } else {
                accumulate_weighted(slot, pose, weight);
            }
        });
        if skipped > 0 {
            trace!("clip {clip:?} carried {skipped} bones outside the buffer");
        }
        self.sampled += 1;
    }

    /// Renormalize every bone's accumulated rotation.
    pub fn normalize_rotations(&mut self) {
        for pose in self.poses.iter_mut() {
            pose.normalize_rotation();
        }
    }

    /// Turn local poses into bone-to-root poses, parent first.
    pub fn apply_hierarchy_and_finish(self, hierarchy: &SkeletonHierarchy) {
        apply_hierarchy(self.poses, hierarchy);
    }
}

/// Compose each bone with its already-resolved parent, writing back in place.
pub fn apply_hierarchy(poses: &mut [BonePose], hierarchy: &SkeletonHierarchy) {
    let count = poses.len().min(hierarchy.bone_count());
    for bone in 1..count {
        if let Some(parent) = hierarchy.parent(bone) {
            poses[bone] = poses[parent].mul_pose(&poses[bone]);
        }
    }
}

/// Hierarchical pose sampler for one instance. Returns the number of active
/// samplers. With none active the buffer is left exactly as it was.
pub fn sample_bone_buffer(
    samplers: &[ClipSampler],
    hierarchy: &SkeletonHierarchy,
    poses: &mut [BonePose],
    cfg: &PoseConfig,
) -> usize {
    let mut blender = BufferPoseBlender::new(poses);
    for sampler in samplers.iter().filter(|s| s.is_active(cfg)) {
        blender.sample_clip(sampler.clip.as_ref(), sampler.normalized_time, sampler.weight);
    }

    let active = blender.sampled();
    if active == 0 {
        return 0;
    }
    if active > 1 {
        blender.normalize_rotations();
    }
    blender.apply_hierarchy_and_finish(hierarchy);
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn hierarchy_walk_composes_grandchildren() {
        let hierarchy = SkeletonHierarchy::new(vec![None, Some(0), Some(1)]).unwrap();
        let step = BonePose::from_translation_rotation(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
        );
        let mut poses = vec![BonePose::IDENTITY, step, step];
        apply_hierarchy(&mut poses, &hierarchy);

        assert_eq!(poses[0], BonePose::IDENTITY);
        assert!(poses[1].translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        // second step is rotated a quarter turn by its parent: +y becomes -x
        assert!(poses[2]
            .translation
            .abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-5));
        assert!(poses[2]
            .rotation
            .abs_diff_eq(Quat::from_rotation_z(std::f32::consts::PI), 1e-5));
    }
}
