//! PoseWorld: central instance table and the per-frame stage runner.
//!
//! Methods:
//! - new, add_instance / add_buffered_instance, add_bone, add_dependent (topology)
//! - samplers_mut / set_samplers (per-frame input from the state machine)
//! - advance (time step helper), run_frame (sampling -> root delta -> apply/propagate)
//!
//! Topology only changes through `&mut self` registration calls, so every
//! back-reference (bone -> owner, dependent -> source) is checked once on insert
//! and stays valid for the duration of a frame.

use std::sync::Arc;

use glam::{Quat, Vec3};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::buffer::sample_bone_buffer;
use crate::config::PoseConfig;
use crate::error::PoseError;
use crate::flat::sample_flat_bone;
use crate::hierarchy::{HierarchyCache, SkeletonHierarchy};
use crate::ids::{BoneId, DependentId, IdAllocator, InstanceId, SkeletonAssetId};
use crate::pose::BonePose;
use crate::root_motion::{extract_root_delta, RootDelta};
use crate::sampler::ClipSampler;

/// World placement of an instance or dependent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl WorldTransform {
    #[inline]
    pub fn apply_root_delta(&mut self, delta: &RootDelta) {
        delta.apply_to(&mut self.translation, &mut self.rotation);
    }
}

/// Configuration for adding an instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstanceCfg {
    /// Apply the computed root delta onto `world` each frame.
    pub apply_root_motion: bool,
    pub world: WorldTransform,
}

impl Default for InstanceCfg {
    fn default() -> Self {
        Self {
            apply_root_motion: true,
            world: WorldTransform::default(),
        }
    }
}

/// Bone-to-root buffer plus the shared hierarchy it is resolved against.
#[derive(Debug)]
pub struct BoneBuffer {
    pub hierarchy: Arc<SkeletonHierarchy>,
    pub poses: Vec<BonePose>,
}

/// A skeleton instance: owner of a sampler list.
#[derive(Debug)]
pub struct SkeletonInstance {
    pub id: InstanceId,
    pub samplers: Vec<ClipSampler>,
    /// Present for the hierarchical form; flat skeletons keep their bones in the bone table.
    pub buffer: Option<BoneBuffer>,
    pub root_delta: RootDelta,
    pub apply_root_motion: bool,
    pub world: WorldTransform,
}

impl SkeletonInstance {
    /// Bone-to-root poses of the hierarchical form.
    pub fn bone_to_root(&self) -> Option<&[BonePose]> {
        self.buffer.as_ref().map(|b| b.poses.as_slice())
    }
}

/// One bone of a flat skeleton.
#[derive(Debug)]
pub struct FlatBone {
    pub id: BoneId,
    /// Position within the clips' bone ordering.
    pub bone_index: usize,
    /// Instance owning the sampler list (lookup only, not ownership).
    pub owner: InstanceId,
    pub pose: BonePose,
}

/// Follows another instance's root motion without sampling anything itself.
#[derive(Debug)]
pub struct RootMotionDependent {
    pub id: DependentId,
    pub source: InstanceId,
    pub world: WorldTransform,
}

/// Per-frame counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    pub instances: usize,
    pub buffered_instances_posed: usize,
    pub flat_bones_posed: usize,
    pub root_motion_applied: usize,
    pub dependents_moved: usize,
}

#[derive(Debug)]
pub struct PoseWorld {
    cfg: PoseConfig,
    ids: IdAllocator,
    hierarchies: HierarchyCache,
    instances: Vec<SkeletonInstance>,
    bones: Vec<FlatBone>,
    dependents: Vec<RootMotionDependent>,
}

impl Default for PoseWorld {
    fn default() -> Self {
        Self::new(PoseConfig::default())
    }
}

impl PoseWorld {
    pub fn new(cfg: PoseConfig) -> Self {
        Self {
            ids: IdAllocator::new(),
            hierarchies: HierarchyCache::new(),
            instances: Vec::with_capacity(cfg.capacity_instances),
            bones: Vec::with_capacity(cfg.capacity_bones),
            dependents: Vec::with_capacity(cfg.capacity_dependents),
            cfg,
        }
    }

    pub fn config(&self) -> &PoseConfig {
        &self.cfg
    }

    /// Fetch (or build once) the shared hierarchy for a skeleton asset.
    pub fn hierarchy(
        &mut self,
        asset: SkeletonAssetId,
        parents: impl FnOnce() -> Vec<Option<usize>>,
    ) -> Result<Arc<SkeletonHierarchy>, PoseError> {
        self.hierarchies.get_or_insert(asset, parents)
    }

    /// Add a flat-form instance (its bones are added with [`PoseWorld::add_bone`]).
    pub fn add_instance(&mut self, cfg: InstanceCfg) -> InstanceId {
        self.push_instance(cfg, None)
    }

    /// Add a hierarchical instance. The buffer starts at the identity pose.
    pub fn add_buffered_instance(
        &mut self,
        hierarchy: Arc<SkeletonHierarchy>,
        cfg: InstanceCfg,
    ) -> InstanceId {
        let poses = vec![BonePose::IDENTITY; hierarchy.bone_count()];
        self.push_instance(cfg, Some(BoneBuffer { hierarchy, poses }))
    }

    /// Add a hierarchical instance with an initial bone-to-root buffer.
    pub fn add_buffered_instance_with_poses(
        &mut self,
        hierarchy: Arc<SkeletonHierarchy>,
        poses: Vec<BonePose>,
        cfg: InstanceCfg,
    ) -> Result<InstanceId, PoseError> {
        if poses.len() != hierarchy.bone_count() {
            return Err(PoseError::BufferSizeMismatch {
                expected: hierarchy.bone_count(),
                actual: poses.len(),
            });
        }
        Ok(self.push_instance(cfg, Some(BoneBuffer { hierarchy, poses })))
    }

    fn push_instance(&mut self, cfg: InstanceCfg, buffer: Option<BoneBuffer>) -> InstanceId {
        let id = self.ids.alloc_instance();
        self.instances.push(SkeletonInstance {
            id,
            samplers: Vec::new(),
            buffer,
            root_delta: RootDelta::ZERO,
            apply_root_motion: cfg.apply_root_motion,
            world: cfg.world,
        });
        id
    }

    /// Add one bone of a flat skeleton owned by `owner`.
    pub fn add_bone(
        &mut self,
        owner: InstanceId,
        bone_index: usize,
        pose: BonePose,
    ) -> Result<BoneId, PoseError> {
        self.check_instance(owner)?;
        let id = self.ids.alloc_bone();
        self.bones.push(FlatBone {
            id,
            bone_index,
            owner,
            pose,
        });
        Ok(id)
    }

    /// Add a dependent that follows `source`'s root motion.
    pub fn add_dependent(
        &mut self,
        source: InstanceId,
        world: WorldTransform,
    ) -> Result<DependentId, PoseError> {
        self.check_instance(source)?;
        let id = self.ids.alloc_dependent();
        self.dependents.push(RootMotionDependent { id, source, world });
        Ok(id)
    }

    fn check_instance(&self, id: InstanceId) -> Result<(), PoseError> {
        if id.index() < self.instances.len() {
            Ok(())
        } else {
            Err(PoseError::UnknownInstance(id))
        }
    }

    pub fn instance(&self, id: InstanceId) -> Option<&SkeletonInstance> {
        self.instances.get(id.index())
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut SkeletonInstance> {
        self.instances.get_mut(id.index())
    }

    pub fn bone(&self, id: BoneId) -> Option<&FlatBone> {
        self.bones.get(id.index())
    }

    pub fn dependent(&self, id: DependentId) -> Option<&RootMotionDependent> {
        self.dependents.get(id.index())
    }

    pub fn samplers_mut(&mut self, id: InstanceId) -> Option<&mut Vec<ClipSampler>> {
        self.instances.get_mut(id.index()).map(|i| &mut i.samplers)
    }

    /// Replace an instance's sampler list for the coming frame.
    pub fn set_samplers(
        &mut self,
        id: InstanceId,
        samplers: Vec<ClipSampler>,
    ) -> Result<(), PoseError> {
        let inst = self
            .instances
            .get_mut(id.index())
            .ok_or(PoseError::UnknownInstance(id))?;
        inst.samplers = samplers;
        Ok(())
    }

    /// State advance helper: step every sampler by `dt` seconds at unit speed.
    pub fn advance(&mut self, dt: f32) {
        let advance = |inst: &mut SkeletonInstance| {
            for sampler in inst.samplers.iter_mut() {
                sampler.advance_seconds(dt, 1.0);
            }
        };
        for_each_mut(&mut self.instances, self.cfg.min_batch_len, advance);
    }

    /// Run stages 2-6 for every item in the table.
    pub fn run_frame(&mut self) -> FrameStats {
        let cfg = &self.cfg;
        let batch = cfg.min_batch_len;

        // Hierarchical sampling writes only the instance's own buffer.
        for_each_mut(&mut self.instances, batch, |inst| {
            if let Some(buffer) = inst.buffer.as_mut() {
                sample_bone_buffer(&inst.samplers, &buffer.hierarchy, &mut buffer.poses, cfg);
            }
        });
        let buffered_instances_posed = self
            .instances
            .iter()
            .filter(|i| i.buffer.is_some() && i.samplers.iter().any(|s| s.is_active(cfg)))
            .count();
        trace!("hierarchical sampling done for {} instances", self.instances.len());

        // Flat sampling reads sampler lists of other instances; the hierarchical
        // pass above has fully completed.
        let instances = &self.instances;
        for_each_mut(&mut self.bones, batch, |bone| {
            let owner = &instances[bone.owner.index()];
            if let Some(pose) = sample_flat_bone(&owner.samplers, bone.bone_index, cfg) {
                bone.pose = pose;
            }
        });
        let flat_bones_posed = self
            .bones
            .iter()
            .filter(|b| instances[b.owner.index()].samplers.iter().any(|s| s.is_active(cfg)))
            .count();
        trace!("flat sampling done for {} bones", self.bones.len());

        for_each_mut(&mut self.instances, batch, |inst| {
            inst.root_delta = extract_root_delta(&inst.samplers, cfg);
        });

        for_each_mut(&mut self.instances, batch, |inst| {
            if inst.apply_root_motion {
                inst.world.apply_root_delta(&inst.root_delta);
            }
        });
        let root_motion_applied = self.instances.iter().filter(|i| i.apply_root_motion).count();

        let instances = &self.instances;
        for_each_mut(&mut self.dependents, batch, |dep| {
            let delta = instances[dep.source.index()].root_delta;
            dep.world.apply_root_delta(&delta);
        });

        let stats = FrameStats {
            instances: self.instances.len(),
            buffered_instances_posed,
            flat_bones_posed,
            root_motion_applied,
            dependents_moved: self.dependents.len(),
        };
        debug!("pose frame: {stats:?}");
        stats
    }
}

#[cfg(feature = "parallel")]
fn for_each_mut<T, F>(items: &mut [T], min_batch_len: usize, f: F)
where
    T: Send,
    F: Fn(&mut T) + Send + Sync,
{
    use rayon::prelude::*;
    items
        .par_iter_mut()
        .with_min_len(min_batch_len.max(1))
        .for_each(f);
}

#[cfg(not(feature = "parallel"))]
fn for_each_mut<T, F>(items: &mut [T], _min_batch_len: usize, f: F)
where
    F: Fn(&mut T),
{
    items.iter_mut().for_each(f);
}
