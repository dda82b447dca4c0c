//! Animation data types

use std::fmt;

use crate::transform::BoneTransform;

/// How an animated bone names the skeleton bone it drives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoneIdentity {
    /// Normalized bone name
    Name(String),
    /// Direct skeleton slot
    Index(u32),
    /// Hashed id, cross-referenced through the skeleton's animation remap table
    Hash(u32),
}

impl fmt::Display for BoneIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "'{}'", name),
            Self::Index(index) => write!(f, "#{}", index),
            Self::Hash(hash) => write!(f, "0x{:08X}", hash),
        }
    }
}

/// Keyframes for one bone, bone-major (one entry per frame)
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedBone {
    pub identity: BoneIdentity,
    /// Parent-relative transform per frame
    pub frames: Vec<BoneTransform>,
    /// Per-bone reserved word of the direct layout (0 for indexed clips)
    pub reserved: u32,
}

/// Version-specific header fields kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationFormat {
    /// v0-v3: bone-major, one full transform per bone per frame
    Direct { id: [u8; 8], version: u32, magic: u32 },
    /// v4: frame-major lookups into shared position/orientation pools
    Indexed {
        id: [u8; 8],
        seconds_per_frame: f32,
        position_pool_len: usize,
        orientation_pool_len: usize,
        /// The two reserved shorts of every lookup record, in file order
        lookup_reserved: Vec<[u16; 2]>,
    },
}

impl AnimationFormat {
    pub fn version(&self) -> u32 {
        match self {
            Self::Direct { version, .. } => *version,
            Self::Indexed { .. } => 4,
        }
    }
}

/// Why a decoded clip must not be played back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackLimitation {
    /// Indexed (v4) clips: hashed bone ids cannot yet be mapped onto the
    /// skeleton reliably, so the reassembled pose would be wrong.
    IndexedBoneRemap,
}

impl fmt::Display for PlaybackLimitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexedBoneRemap => write!(
                f,
                "indexed (v4) clips cannot be mapped onto a skeleton reliably"
            ),
        }
    }
}

/// A decoded animation clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name as supplied by the asset source (normalized)
    pub name: String,
    pub format: AnimationFormat,
    pub frames_per_second: f32,
    pub frame_count: usize,
    pub bones: Vec<AnimatedBone>,
    /// Set when the clip parsed fine but must not be played
    pub limitation: Option<PlaybackLimitation>,
}

impl AnimationClip {
    pub fn version(&self) -> u32 {
        self.format.version()
    }

    pub fn is_renderable(&self) -> bool {
        self.limitation.is_none()
    }

    /// Clip length in seconds (0 for degenerate clips)
    pub fn duration(&self) -> f32 {
        if self.frames_per_second > 0.0 {
            self.frame_count as f32 / self.frames_per_second
        } else {
            0.0
        }
    }
}
