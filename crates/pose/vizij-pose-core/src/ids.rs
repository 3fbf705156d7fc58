//! Identifiers and simple allocators for table entries.

use serde::{Deserialize, Serialize};

/// Handle to a skeleton instance (the owner of a sampler list).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

/// Handle to a flat bone entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BoneId(pub u32);

/// Handle to a root-motion dependent.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DependentId(pub u32);

/// Identity of a skeleton asset; instances of the same asset share one hierarchy.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SkeletonAssetId(pub u64);

impl InstanceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BoneId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl DependentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic allocator for InstanceId, BoneId, and DependentId.
/// Ids are dense and double as indices into the table's storage.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_instance: u32,
    next_bone: u32,
    next_dependent: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_instance(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        id
    }

    #[inline]
    pub fn alloc_bone(&mut self) -> BoneId {
        let id = BoneId(self.next_bone);
        self.next_bone += 1;
        id
    }

    #[inline]
    pub fn alloc_dependent(&mut self) -> DependentId {
        let id = DependentId(self.next_dependent);
        self.next_dependent += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_instance(), InstanceId(0));
        assert_eq!(alloc.alloc_instance(), InstanceId(1));
        assert_eq!(alloc.alloc_bone(), BoneId(0));
        assert_eq!(alloc.alloc_bone(), BoneId(1));
        assert_eq!(alloc.alloc_dependent(), DependentId(0));
        assert_eq!(alloc.alloc_instance().index(), 2);
    }
}
