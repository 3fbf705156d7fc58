//! Core configuration for vizij-pose-core.

use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// Configuration for blend tolerances and table sizing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseConfig {
    /// Weights with an absolute value below this are treated as zero.
    pub weight_epsilon: f32,

    /// Lower bound on items per parallel batch (only used with the `parallel` feature).
    pub min_batch_len: usize,

    /// Initial capacity hints for the instance table.
    pub capacity_instances: usize,
    pub capacity_bones: usize,
    pub capacity_dependents: usize,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            weight_epsilon: 1e-6,
            min_batch_len: 16,
            capacity_instances: 64,
            capacity_bones: 256,
            capacity_dependents: 16,
        }
    }
}

impl PoseConfig {
    /// Parse a config from JSON; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, PoseError> {
        Ok(serde_json::from_str(json)?)
    }

    #[inline]
    pub fn is_zero_weight(&self, weight: f32) -> bool {
        weight.abs() < self.weight_epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PoseConfig::from_json(r#"{ "min_batch_len": 4 }"#).unwrap();
        assert_eq!(cfg.min_batch_len, 4);
        assert_eq!(cfg.weight_epsilon, PoseConfig::default().weight_epsilon);
    }

    #[test]
    fn zero_weight_uses_epsilon() {
        let cfg = PoseConfig::default();
        assert!(cfg.is_zero_weight(0.0));
        assert!(cfg.is_zero_weight(-1e-9));
        assert!(!cfg.is_zero_weight(0.01));
    }
}
