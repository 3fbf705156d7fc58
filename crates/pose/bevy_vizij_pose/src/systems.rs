use bevy::log::error;
use bevy::prelude::*;

use crate::components::{
    ApplyRootMotion, BoneIndex, BoneOwningSkeleton, BoneToRootBuffer, ClipSamplers, PlaybackSpeed,
    RootDeltaRotation, RootDeltaTranslation, SkeletonHierarchyRef, TransferRootMotion,
};
use crate::resources::PoseSettings;
use vizij_pose_core::{extract_root_delta, sample_bone_buffer, sample_flat_bone, RootDelta};

/// Built-in time step: rotate previous time and move every sampler forward.
pub fn advance_samplers_system(
    time: Res<Time>,
    mut skeletons: Query<(&mut ClipSamplers, Option<&PlaybackSpeed>)>,
) {
    let dt = time.delta_seconds();
    skeletons.par_iter_mut().for_each(|(mut samplers, speed)| {
        let speed = speed.map_or(1.0, |s| s.0);
        for sampler in samplers.0.iter_mut() {
            sampler.advance_seconds(dt, speed);
        }
    });
}

/// Blend all active samplers into each skeleton's buffer and resolve bone-to-root poses.
pub fn sample_hierarchical_system(
    settings: Res<PoseSettings>,
    mut skeletons: Query<(&ClipSamplers, &SkeletonHierarchyRef, &mut BoneToRootBuffer)>,
) {
    let cfg = &settings.0;
    skeletons
        .par_iter_mut()
        .for_each(|(samplers, hierarchy, mut buffer)| {
            sample_bone_buffer(&samplers.0, &hierarchy.0, &mut buffer.0, cfg);
        });
}

/// Pose each flat bone from its owning skeleton's sampler list.
pub fn sample_flat_bones_system(
    settings: Res<PoseSettings>,
    skeletons: Query<&ClipSamplers>,
    mut bones: Query<(Entity, &BoneIndex, &BoneOwningSkeleton, &mut Transform)>,
) {
    let cfg = &settings.0;
    bones
        .par_iter_mut()
        .for_each(|(entity, index, owner, mut transform)| {
            let Ok(samplers) = skeletons.get(owner.0) else {
                error!("bone {entity:?} references skeleton {:?} without ClipSamplers", owner.0);
                return;
            };
            if let Some(pose) = sample_flat_bone(&samplers.0, index.0, cfg) {
                transform.translation = pose.translation;
                transform.rotation = pose.rotation;
                transform.scale = pose.scale;
            }
        });
}

/// Recompute each skeleton's root delta from the samplers that advanced this frame.
pub fn extract_root_deltas_system(
    settings: Res<PoseSettings>,
    mut skeletons: Query<(&ClipSamplers, &mut RootDeltaTranslation, &mut RootDeltaRotation)>,
) {
    let cfg = &settings.0;
    skeletons
        .par_iter_mut()
        .for_each(|(samplers, mut translation, mut rotation)| {
            let delta = extract_root_delta(&samplers.0, cfg);
            translation.0 = delta.translation;
            rotation.0 = delta.rotation;
        });
}

pub fn apply_root_deltas_system(
    mut skeletons: Query<
        (&RootDeltaTranslation, &RootDeltaRotation, &mut Transform),
        With<ApplyRootMotion>,
    >,
) {
    skeletons
        .par_iter_mut()
        .for_each(|(translation, rotation, mut transform)| {
            let delta = RootDelta {
                translation: translation.0,
                rotation: rotation.0,
            };
            let transform = &mut *transform;
            delta.apply_to(&mut transform.translation, &mut transform.rotation);
        });
}

/// Copy the source skeleton's delta onto dependents that track it.
pub fn transfer_root_deltas_system(
    sources: Query<(&RootDeltaTranslation, &RootDeltaRotation)>,
    mut dependents: Query<(Entity, &TransferRootMotion, &mut Transform)>,
) {
    dependents
        .par_iter_mut()
        .for_each(|(entity, transfer, mut transform)| {
            let Ok((translation, rotation)) = sources.get(transfer.source) else {
                error!(
                    "entity {entity:?} transfers root motion from {:?} which has no root delta",
                    transfer.source
                );
                return;
            };
            let delta = RootDelta {
                translation: translation.0,
                rotation: rotation.0,
            };
            let transform = &mut *transform;
            delta.apply_to(&mut transform.translation, &mut transform.rotation);
        });
}
