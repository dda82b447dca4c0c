//! Reconciling animation clips against a skeleton
//!
//! The builder is created once per skeleton and precomputes everything that
//! does not depend on a clip: the identity resolver, the parent-first
//! evaluation order and the inverse bind transforms. Each clip is then
//! resolved in one pass:
//!
//! 1. Refuse clips flagged with a playback limitation or inconsistent frame counts
//! 2. Match animated bones to skeleton slots ([`BoneResolver`]); leftovers are dropped
//! 3. Sort the matches parent-first
//! 4. Per frame, compose parent-relative keys into absolute transforms
//! 5. Multiply by the inverse bind transform to get the skin matrix
//!
//! Skeleton bones without animation data keep their bind transform, so their
//! skin matrix is identity and their children compose against the bind pose.

use glam::Mat4;
use rig_formats::{AnimatedBone, AnimationClip, BoneIdentity, BoneRemap, BoneTransform, Mesh, Skeleton};

use crate::error::PoseError;
use crate::pose::{ResolvedClip, ResolvedPose, ResolvedTrack};
use crate::resolver::BoneResolver;

/// Outcome of resolving one clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipReport {
    pub clip: String,
    /// Animated bones that drive a skeleton bone
    pub matched: usize,
    /// Animated bones with no skeleton counterpart (or a slot already taken)
    pub dropped: Vec<BoneIdentity>,
    /// Skeleton bones left at their bind pose
    pub unanimated: usize,
    /// Set when the clip is unresolved (non-fatal) or failed
    pub issue: Option<PoseError>,
}

impl ClipReport {
    /// Report for a clip that could not be resolved at all
    pub fn failed(clip: impl Into<String>, error: PoseError) -> Self {
        Self {
            clip: clip.into(),
            matched: 0,
            dropped: Vec::new(),
            unanimated: 0,
            issue: Some(error),
        }
    }

    /// The clip is attached and will animate at least one bone
    pub fn is_playable(&self) -> bool {
        self.issue.is_none()
    }

    /// The clip is attached (possibly posing as identity)
    pub fn is_attached(&self) -> bool {
        self.issue.as_ref().is_none_or(|e| !e.is_fatal())
    }

    /// Route the report to the log
    pub fn emit(&self) {
        for identity in &self.dropped {
            tracing::warn!(
                "{}: animated bone {} has no skeleton bone; dropped",
                self.clip,
                identity
            );
        }
        match &self.issue {
            Some(error) => tracing::warn!("{}", error),
            None => tracing::debug!(
                "{}: {} bones animated, {} at bind pose",
                self.clip,
                self.matched,
                self.unanimated
            ),
        }
    }
}

/// Per-skeleton pose builder
#[derive(Debug, Clone)]
pub struct PoseBuilder {
    resolver: BoneResolver,
    parents: Vec<Option<usize>>,
    /// Position of each slot in the evaluation order
    rank: Vec<usize>,
    bind: Vec<BoneTransform>,
    bind_inverse: Vec<BoneTransform>,
    bind_inverse_matrices: Vec<Mat4>,
    vertex_remap: Option<BoneRemap>,
}

impl PoseBuilder {
    pub fn new(skeleton: &Skeleton) -> Self {
        let bone_count = skeleton.bone_count();
        let mut rank = vec![0; bone_count];
        for (position, &slot) in skeleton.evaluation_order().iter().enumerate() {
            rank[slot] = position;
        }

        let bind: Vec<BoneTransform> = skeleton.bones.iter().map(|b| b.bind).collect();
        let bind_inverse: Vec<BoneTransform> = bind.iter().map(BoneTransform::inverse).collect();
        let bind_inverse_matrices = bind.iter().map(|b| b.to_mat4().inverse()).collect();

        Self {
            resolver: BoneResolver::new(skeleton),
            parents: skeleton.bones.iter().map(|b| b.parent).collect(),
            rank,
            bind,
            bind_inverse,
            bind_inverse_matrices,
            vertex_remap: skeleton.vertex_remap().cloned(),
        }
    }

    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    /// Inverse absolute bind matrix per skeleton bone
    pub fn bind_inverse(&self) -> &[Mat4] {
        &self.bind_inverse_matrices
    }

    pub fn resolver(&self) -> &BoneResolver {
        &self.resolver
    }

    /// Rewrite vertex bone indices into skeleton slots.
    ///
    /// Skeletons with a vertex palette table translate through it; others
    /// use the stored index directly. Anything that does not land on a
    /// skeleton bone is clamped to slot 0. Returns how many weighted
    /// influences were clamped.
    pub fn remap_mesh(&self, mesh: &mut Mesh) -> usize {
        let bone_count = self.bone_count();
        let mut clamped = 0;
        for vertex in &mut mesh.vertices {
            for (index, weight) in vertex.bone_indices.iter_mut().zip(vertex.bone_weights) {
                let target = match &self.vertex_remap {
                    Some(remap) => remap.get(*index),
                    None => Some(*index),
                };
                *index = match target {
                    Some(slot) if (slot as usize) < bone_count => slot,
                    _ => {
                        if weight != 0.0 {
                            clamped += 1;
                        }
                        0
                    }
                };
            }
        }
        clamped
    }

    /// Resolve one clip into per-bone skin matrices.
    ///
    /// A clip matching no bones still resolves (every bone identity) and
    /// reports [`PoseError::UnresolvedAnimation`]. Errors are returned only
    /// for clips that must not be attached.
    pub fn build_clip(&self, clip: &AnimationClip) -> Result<(ResolvedClip, ClipReport), PoseError> {
        if let Some(reason) = clip.limitation {
            return Err(PoseError::KnownLimitation {
                clip: clip.name.clone(),
                reason,
            });
        }
        if let Some(bone) = clip.bones.iter().find(|b| b.frames.len() != clip.frame_count) {
            return Err(PoseError::FrameCountMismatch {
                clip: clip.name.clone(),
                bone: bone.identity.clone(),
                expected: clip.frame_count,
                actual: bone.frames.len(),
            });
        }

        let bone_count = self.bone_count();
        let mut animated = vec![false; bone_count];
        let mut matched: Vec<(usize, &AnimatedBone)> = Vec::with_capacity(clip.bones.len());
        let mut dropped = Vec::new();
        for bone in &clip.bones {
            match self.resolver.resolve(&bone.identity) {
                Some(slot) if !animated[slot] => {
                    animated[slot] = true;
                    matched.push((slot, bone));
                }
                _ => dropped.push(bone.identity.clone()),
            }
        }

        // Parent-first, so a single pass per frame sees every parent done
        matched.sort_by_key(|&(slot, _)| self.rank[slot]);

        let mut tracks: Vec<ResolvedTrack> = (0..bone_count)
            .map(|_| ResolvedTrack {
                matrices: Vec::with_capacity(clip.frame_count),
                keys: Vec::with_capacity(clip.frame_count),
            })
            .collect();
        let mut absolute = self.bind.clone();
        for frame in 0..clip.frame_count {
            absolute.copy_from_slice(&self.bind);
            for &(slot, bone) in &matched {
                let local = bone.frames[frame];
                absolute[slot] = match self.parents[slot] {
                    Some(parent) => local.compose(&absolute[parent]),
                    None => local,
                };
            }

            for (slot, track) in tracks.iter_mut().enumerate() {
                // absolute * bind_inverse
                let skin = if animated[slot] {
                    self.bind_inverse[slot].compose(&absolute[slot])
                } else {
                    BoneTransform::IDENTITY
                };
                track.matrices.push(skin.to_mat4());
                track.keys.push(skin);
            }
        }

        let issue = matched.is_empty().then(|| PoseError::UnresolvedAnimation {
            clip: clip.name.clone(),
        });
        let report = ClipReport {
            clip: clip.name.clone(),
            matched: matched.len(),
            dropped,
            unanimated: bone_count - matched.len(),
            issue,
        };
        let resolved = ResolvedClip {
            name: clip.name.clone(),
            frames_per_second: clip.frames_per_second,
            frame_count: clip.frame_count,
            tracks,
            animated,
        };
        Ok((resolved, report))
    }

    /// Resolve a set of clips; failed clips are reported and left out
    pub fn build(&self, clips: &[AnimationClip]) -> (ResolvedPose, Vec<ClipReport>) {
        let mut pose = ResolvedPose::new(self.bone_count());
        let reports = clips
            .iter()
            .map(|clip| match self.build_clip(clip) {
                Ok((resolved, report)) => {
                    pose.insert(resolved);
                    report
                }
                Err(error) => ClipReport::failed(clip.name.clone(), error),
            })
            .collect();
        (pose, reports)
    }
}
