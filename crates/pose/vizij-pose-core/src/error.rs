//! Error type for table registration, hierarchy building and clip loading.
//!
//! Frame stages themselves never fail; malformed weights or times simply
//! propagate through the math.

use thiserror::Error;

use crate::ids::InstanceId;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("unknown skeleton instance {0:?}")]
    UnknownInstance(InstanceId),

    #[error("skeleton hierarchy has no bones")]
    EmptyHierarchy,

    #[error("root bone must not have a parent (found parent {parent})")]
    RootHasParent { parent: usize },

    #[error("bone {bone} has no parent; only bone 0 may be a root")]
    ExtraRoot { bone: usize },

    #[error("bone {bone} has parent {parent}; parents must precede their children")]
    ParentOutOfOrder { bone: usize, parent: usize },

    #[error("bone buffer holds {actual} poses but the hierarchy has {expected} bones")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("invalid clip '{clip}': {reason}")]
    InvalidClip { clip: String, reason: String },

    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}
