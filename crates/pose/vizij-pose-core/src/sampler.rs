//! Clip samplers: one weighted, time-positioned clip contribution.
//!
//! Samplers are produced by the state machine in blend order; the core reads
//! them and only ever touches `previous_normalized_time` via [`ClipSampler::advance_seconds`].

use crate::clip::ClipRef;
use crate::config::PoseConfig;

#[derive(Clone, Debug)]
pub struct ClipSampler {
    pub clip: ClipRef,
    /// Blend weight in [0,1]; weights of one list need not sum to 1.
    pub weight: f32,
    /// Current normalized time in [0,1).
    pub normalized_time: f32,
    /// Normalized time of the previous frame in [0,1).
    pub previous_normalized_time: f32,
}

impl ClipSampler {
    pub fn new(clip: ClipRef, weight: f32, normalized_time: f32) -> Self {
        Self {
            clip,
            weight,
            normalized_time,
            previous_normalized_time: normalized_time,
        }
    }

    pub fn with_previous_time(mut self, previous_normalized_time: f32) -> Self {
        self.previous_normalized_time = previous_normalized_time;
        self
    }

    /// Contributes to pose sampling.
    #[inline]
    pub fn is_active(&self, cfg: &PoseConfig) -> bool {
        !cfg.is_zero_weight(self.weight)
    }

    /// Time moved forward this frame. A sampler that did not advance is taken to
    /// have wrapped past its loop point.
    #[inline]
    pub fn advanced(&self) -> bool {
        self.normalized_time - self.previous_normalized_time > 0.0
    }

    /// Contributes to root delta extraction: active and not wrapped.
    #[inline]
    pub fn contributes_to_delta(&self, cfg: &PoseConfig) -> bool {
        self.is_active(cfg) && self.advanced()
    }

    /// Time step for callers without a full state machine: rotate the current
    /// time into the previous slot and move forward by `dt * speed` seconds,
    /// wrapping into [0,1).
    pub fn advance_seconds(&mut self, dt: f32, speed: f32) {
        self.previous_normalized_time = self.normalized_time;
        let duration = self.clip.duration_seconds();
        if duration <= 0.0 {
            return;
        }
        let t = (self.normalized_time + dt * speed / duration).rem_euclid(1.0);
        // rem_euclid rounds tiny negative inputs up to exactly 1.0
        self.normalized_time = if t >= 1.0 { 0.0 } else { t };
    }
}

/// Index of the first sampler matching `include`, in list order.
#[inline]
pub fn first_index(
    samplers: &[ClipSampler],
    include: impl Fn(&ClipSampler) -> bool,
) -> Option<usize> {
    samplers.iter().position(include)
}
