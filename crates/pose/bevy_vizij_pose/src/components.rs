use std::sync::Arc;

use bevy::prelude::*;
use vizij_pose_core::{BonePose, ClipSampler, SkeletonHierarchy};

/// Ordered sampler list of a skeleton entity, written by the state machine.
#[derive(Component, Debug, Clone, Default)]
pub struct ClipSamplers(pub Vec<ClipSampler>);

/// Playback speed used by the built-in time advance (defaults to 1).
#[derive(Component, Debug, Clone, Copy)]
pub struct PlaybackSpeed(pub f32);

/// Shared hierarchy of a skeleton asset. Clone the `Arc`, never the table.
#[derive(Component, Debug, Clone)]
pub struct SkeletonHierarchyRef(pub Arc<SkeletonHierarchy>);

/// Hierarchical skeleton buffer: bone-to-root poses between frames.
#[derive(Component, Debug, Clone, Default)]
pub struct BoneToRootBuffer(pub Vec<BonePose>);

impl BoneToRootBuffer {
    pub fn identity(bone_count: usize) -> Self {
        Self(vec![BonePose::IDENTITY; bone_count])
    }
}

/// Index of a flat bone within the clips' bone ordering.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneIndex(pub usize);

/// Skeleton entity whose sampler list drives this bone (lookup only).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneOwningSkeleton(pub Entity);

#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct RootDeltaTranslation(pub Vec3);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RootDeltaRotation(pub Quat);

impl Default for RootDeltaRotation {
    fn default() -> Self {
        Self(Quat::IDENTITY)
    }
}

#[derive(Bundle, Default)]
pub struct RootMotionBundle {
    pub translation: RootDeltaTranslation,
    pub rotation: RootDeltaRotation,
}

/// Marker: apply this entity's own root delta to its `Transform`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ApplyRootMotion;

/// Follow the root delta computed on `source` without sampling anything.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRootMotion {
    pub source: Entity,
}
