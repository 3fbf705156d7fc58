use bevy::prelude::*;
use vizij_pose_core::PoseConfig;

/// Blend tolerances shared by every pose system.
#[derive(Resource, Debug, Clone, Default)]
pub struct PoseSettings(pub PoseConfig);
