//! Vizij Pose Core (engine-agnostic)
//!
//! Skeletal pose blending for skeleton instances driven by an ordered list of
//! weighted clip samplers, plus loop-safe root-motion extraction.
//!
//! Frame stages, in order:
//! 1. state advance (external; [`ClipSampler::advance_seconds`] is provided as a helper)
//! 2. hierarchical pose sampling into a bone-to-root buffer ([`buffer`])
//! 3. flat pose sampling, one bone per item ([`flat`])
//! 4. root delta extraction ([`root_motion::extract_root_delta`])
//! 5. root delta application onto the owning instance
//! 6. root delta propagation onto dependents
//!
//! [`PoseWorld::run_frame`] drives stages 2-6 over a central instance table.
//! Adapters (Bevy) can call the per-stage functions directly.

pub mod blend;
pub mod buffer;
pub mod clip;
pub mod config;
pub mod error;
pub mod flat;
pub mod hierarchy;
pub mod ids;
pub mod keyframes;
pub mod pose;
pub mod root_motion;
pub mod sampler;
pub mod world;

// Re-exports for consumers (adapters)
pub use blend::{accumulate_bone, accumulate_weighted, seed_bone, seed_weighted};
pub use buffer::{sample_bone_buffer, BufferPoseBlender};
pub use clip::{ClipRef, PoseClip};
pub use config::PoseConfig;
pub use error::PoseError;
pub use flat::sample_flat_bone;
pub use hierarchy::{HierarchyCache, SkeletonHierarchy};
pub use ids::{BoneId, DependentId, InstanceId, SkeletonAssetId};
pub use keyframes::{BoneTrack, Key, KeyframeClip};
pub use pose::BonePose;
pub use root_motion::{extract_root_delta, RootDelta};
pub use sampler::ClipSampler;
pub use world::{
    FlatBone, FrameStats, InstanceCfg, PoseWorld, RootMotionDependent, SkeletonInstance,
    WorldTransform,
};

pub use glam::{Quat, Vec3};
