//! Clip contract consumed by the samplers.
//!
//! Clips are immutable, externally owned and shared across instances; the core
//! only ever reads them. Both entry points must be reentrant.

use std::fmt::Debug;
use std::sync::Arc;

use crate::pose::BonePose;

pub trait PoseClip: Send + Sync + Debug {
    /// Number of bones this clip carries poses for.
    fn bone_count(&self) -> usize;

    /// Clip length in seconds, used to map elapsed time onto normalized time.
    fn duration_seconds(&self) -> f32;

    /// Local pose of `bone` at `normalized_time` in [0,1).
    fn sample_bone(&self, bone: usize, normalized_time: f32) -> BonePose;

    /// Full-skeleton sampling: `visit` is called once per bone the clip
    /// animates, with the bone index and its local pose.
    fn sample_pose(&self, normalized_time: f32, visit: &mut dyn FnMut(usize, BonePose)) {
        for bone in 0..self.bone_count() {
            visit(bone, self.sample_bone(bone, normalized_time));
        }
    }
}

/// Shared clip reference held by samplers.
pub type ClipRef = Arc<dyn PoseClip>;
