//! Bone identity resolution
//!
//! Animated bones name their skeleton bone in one of three ways
//! ([`BoneIdentity`]). The resolver turns all of them into a skeleton slot
//! using tables built once per skeleton.

use hashbrown::HashMap;
use rig_formats::name::normalize_str;
use rig_formats::{BoneIdentity, Skeleton};

#[derive(Debug, Clone, Default)]
pub struct BoneResolver {
    names: HashMap<String, usize>,
    animation_ids: HashMap<u32, usize>,
    bone_count: usize,
}

impl BoneResolver {
    pub fn new(skeleton: &Skeleton) -> Self {
        let bone_count = skeleton.bone_count();

        // First bone wins on duplicate names
        let mut names = HashMap::with_capacity(bone_count);
        for bone in &skeleton.bones {
            if !bone.name.is_empty() {
                names.entry(bone.name.clone()).or_insert(bone.index);
            }
        }

        let animation_ids = skeleton
            .animation_remap()
            .map(|remap| {
                remap
                    .iter()
                    .filter(|&(_, slot)| (slot as usize) < bone_count)
                    .map(|(id, slot)| (id, slot as usize))
                    .collect::<HashMap<u32, usize>>()
            })
            .unwrap_or_default();

        Self {
            names,
            animation_ids,
            bone_count,
        }
    }

    /// Skeleton slot driven by `identity`, if any
    pub fn resolve(&self, identity: &BoneIdentity) -> Option<usize> {
        match identity {
            BoneIdentity::Name(name) => self
                .names
                .get(name)
                .or_else(|| self.names.get(&normalize_str(name)))
                .copied(),
            BoneIdentity::Index(index) => {
                let index = *index as usize;
                (index < self.bone_count).then_some(index)
            }
            BoneIdentity::Hash(id) => self.animation_ids.get(id).copied(),
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }
}
