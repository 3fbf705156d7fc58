use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub mod components;
pub mod resources;
pub mod systems;

pub use components::{
    ApplyRootMotion, BoneIndex, BoneOwningSkeleton, BoneToRootBuffer, ClipSamplers, PlaybackSpeed,
    RootDeltaRotation, RootDeltaTranslation, RootMotionBundle, SkeletonHierarchyRef,
    TransferRootMotion,
};
pub use resources::PoseSettings;

/// Frame stages, run in this order in `PostUpdate` ahead of transform propagation.
/// State machines that drive [`ClipSamplers`] should run in (or before) `AdvanceState`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PoseSystems {
    AdvanceState,
    SampleHierarchical,
    SampleFlat,
    ExtractRootDeltas,
    ApplyRootDeltas,
}

pub struct VizijPosePlugin {
    /// Step sampler time from `Time` each frame. Disable when a state machine
    /// owns time advancement.
    pub advance_samplers: bool,
}

impl Default for VizijPosePlugin {
    fn default() -> Self {
        Self {
            advance_samplers: true,
        }
    }
}

impl Plugin for VizijPosePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PoseSettings>()
            .configure_sets(
                PostUpdate,
                (
                    PoseSystems::AdvanceState,
                    PoseSystems::SampleHierarchical,
                    PoseSystems::SampleFlat,
                    PoseSystems::ExtractRootDeltas,
                    PoseSystems::ApplyRootDeltas,
                )
                    .chain()
                    .before(TransformSystem::TransformPropagate),
            )
            .add_systems(
                PostUpdate,
                (
                    systems::sample_hierarchical_system.in_set(PoseSystems::SampleHierarchical),
                    systems::sample_flat_bones_system.in_set(PoseSystems::SampleFlat),
                    systems::extract_root_deltas_system.in_set(PoseSystems::ExtractRootDeltas),
                    systems::apply_root_deltas_system.in_set(PoseSystems::ApplyRootDeltas),
                    systems::transfer_root_deltas_system.in_set(PoseSystems::ApplyRootDeltas),
                ),
            );

        if self.advance_samplers {
            app.add_systems(
                PostUpdate,
                systems::advance_samplers_system.in_set(PoseSystems::AdvanceState),
            );
        }
    }
}
