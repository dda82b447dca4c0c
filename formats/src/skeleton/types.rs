//! Skeleton data types

use hashbrown::HashMap;

use crate::error::FormatError;
use crate::transform::BoneTransform;

/// One bone of a decoded skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Slot in [`Skeleton::bones`] (on-disk order)
    pub index: usize,
    /// Normalized (NUL-truncated, lower-case) name
    pub name: String,
    /// Parent slot, `None` for roots
    pub parent: Option<usize>,
    /// Transform relative to the parent (equal to `bind` for roots)
    pub local: BoneTransform,
    /// Absolute bind-pose transform
    pub bind: BoneTransform,
    /// Scale value carried by legacy records (1.0 elsewhere); not applied
    pub inverse_scale: f32,
}

impl Bone {
    /// Parent index in the on-disk convention (-1 for roots)
    pub fn parent_index(&self) -> i32 {
        self.parent.map_or(-1, |p| p as i32)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Which way a remap table translates bone numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapDirection {
    /// Mesh vertex palette slot -> skeleton bone slot (legacy v2 bone-id table)
    VertexToSkeleton,
    /// Hashed animation bone id -> skeleton bone slot (indexed v0 pair block)
    AnimationToSkeleton,
}

/// Bone numbering cross-reference carried by some skeleton versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoneRemap {
    direction: RemapDirection,
    table: HashMap<u32, u32>,
}

impl BoneRemap {
    pub fn new(direction: RemapDirection, table: HashMap<u32, u32>) -> Self {
        Self { direction, table }
    }

    pub fn direction(&self) -> RemapDirection {
        self.direction
    }

    pub fn get(&self, key: u32) -> Option<u32> {
        self.table.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.table.iter().map(|(&k, &v)| (k, v))
    }
}

/// Version-specific header fields kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub enum SkeletonFormat {
    /// v1/v2: flat records with absolute 3×4 matrices
    Legacy {
        id: [u8; 8],
        version: u32,
        designer_id: u32,
    },
    /// v0: offset-addressed sections with parent-relative transforms
    Indexed {
        id: [u8; 8],
        reserved: [u32; 5],
        /// Contents of the animation-index block, not interpreted
        animation_indices: Vec<u32>,
        /// Trailing 16 bytes of each bone record, not interpreted
        bone_padding: Vec<[u32; 4]>,
    },
}

impl SkeletonFormat {
    pub fn version(&self) -> u32 {
        match self {
            Self::Legacy { version, .. } => *version,
            Self::Indexed { .. } => 0,
        }
    }
}

/// Decoded bone hierarchy with bind pose
///
/// Bones stay in on-disk order, which does not guarantee parents come first;
/// [`Skeleton::evaluation_order`] gives a parent-first walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub format: SkeletonFormat,
    pub bones: Vec<Bone>,
    pub remap: Option<BoneRemap>,
    order: Vec<usize>,
}

impl Skeleton {
    /// Assemble a skeleton, validating parent links and computing the
    /// evaluation order.
    pub fn new(
        format: SkeletonFormat,
        bones: Vec<Bone>,
        remap: Option<BoneRemap>,
    ) -> Result<Self, FormatError> {
        let parents: Vec<Option<usize>> = bones.iter().map(|b| b.parent).collect();
        let order = topological_order(&parents)?;
        Ok(Self {
            format,
            bones,
            remap,
            order,
        })
    }

    pub fn version(&self) -> u32 {
        self.format.version()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Bone slots ordered so every parent precedes its children.
    /// Ties keep on-disk order.
    pub fn evaluation_order(&self) -> &[usize] {
        &self.order
    }

    /// Linear lookup by normalized name
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        let key = crate::name::normalize_str(name);
        self.bones.iter().position(|b| b.name == key)
    }

    /// Remap table translating mesh vertex palette slots, if this version has one
    pub fn vertex_remap(&self) -> Option<&BoneRemap> {
        self.remap
            .as_ref()
            .filter(|r| r.direction() == RemapDirection::VertexToSkeleton)
    }

    /// Remap table translating hashed animation bone ids, if this version has one
    pub fn animation_remap(&self) -> Option<&BoneRemap> {
        self.remap
            .as_ref()
            .filter(|r| r.direction() == RemapDirection::AnimationToSkeleton)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    InChain,
    Done,
}

/// Parent-first ordering of a parent table.
///
/// Walks each bone's ancestor chain once; a chain that loops back on itself
/// is a malformed reference.
pub(crate) fn topological_order(parents: &[Option<usize>]) -> Result<Vec<usize>, FormatError> {
    let n = parents.len();
    let mut state = vec![Visit::New; n];
    let mut order = Vec::with_capacity(n);
    let mut chain = Vec::new();

    for start in 0..n {
        let mut current = Some(start);
        while let Some(i) = current {
            if i >= n {
                return Err(FormatError::malformed(format!(
                    "parent index {} out of range (bone count {})",
                    i, n
                )));
            }
            match state[i] {
                Visit::Done => break,
                Visit::InChain => {
                    return Err(FormatError::malformed(format!(
                        "bone {} is part of a parent cycle",
                        i
                    )));
                }
                Visit::New => {
                    state[i] = Visit::InChain;
                    chain.push(i);
                    current = parents[i];
                }
            }
        }
        while let Some(i) = chain.pop() {
            state[i] = Visit::Done;
            order.push(i);
        }
    }

    Ok(order)
}
