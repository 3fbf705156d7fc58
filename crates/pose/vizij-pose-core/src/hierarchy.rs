//! Shared, read-only skeleton hierarchy descriptors.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::PoseError;
use crate::ids::SkeletonAssetId;

/// Parent table for one skeleton asset. Bone 0 is the root; every other bone's
/// parent precedes it, so a single forward walk resolves the whole chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<usize>>", into = "Vec<Option<usize>>")]
pub struct SkeletonHierarchy {
    parents: Vec<Option<usize>>,
}

impl SkeletonHierarchy {
    pub fn new(parents: Vec<Option<usize>>) -> Result<Self, PoseError> {
        match parents.first() {
            None => return Err(PoseError::EmptyHierarchy),
            Some(Some(parent)) => return Err(PoseError::RootHasParent { parent: *parent }),
            Some(None) => {}
        }
        for (bone, parent) in parents.iter().enumerate().skip(1) {
            match *parent {
                None => return Err(PoseError::ExtraRoot { bone }),
                Some(parent) if parent >= bone => {
                    return Err(PoseError::ParentOutOfOrder { bone, parent })
                }
                Some(_) => {}
            }
        }
        Ok(Self { parents })
    }

    #[inline]
    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    #[inline]
    pub fn parent(&self, bone: usize) -> Option<usize> {
        self.parents.get(bone).copied().flatten()
    }

    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }
}

impl TryFrom<Vec<Option<usize>>> for SkeletonHierarchy {
    type Error = PoseError;

    fn try_from(parents: Vec<Option<usize>>) -> Result<Self, Self::Error> {
        SkeletonHierarchy::new(parents)
    }
}

impl From<SkeletonHierarchy> for Vec<Option<usize>> {
    fn from(hierarchy: SkeletonHierarchy) -> Self {
        hierarchy.parents
    }
}

/// Hierarchies keyed by skeleton asset; instances of one asset share one `Arc`.
#[derive(Debug, Default)]
pub struct HierarchyCache {
    map: HashMap<SkeletonAssetId, Arc<SkeletonHierarchy>>,
}

impl HierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached hierarchy for `asset`, building it from `parents` on first use.
    /// A cached entry wins; `parents` is only read on a miss.
    pub fn get_or_insert(
        &mut self,
        asset: SkeletonAssetId,
        parents: impl FnOnce() -> Vec<Option<usize>>,
    ) -> Result<Arc<SkeletonHierarchy>, PoseError> {
        if let Some(existing) = self.map.get(&asset) {
            return Ok(Arc::clone(existing));
        }
        let hierarchy = Arc::new(SkeletonHierarchy::new(parents())?);
        self.map.insert(asset, Arc::clone(&hierarchy));
        Ok(hierarchy)
    }

    pub fn get(&self, asset: SkeletonAssetId) -> Option<Arc<SkeletonHierarchy>> {
        self.map.get(&asset).cloned()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
