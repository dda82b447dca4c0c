//! Resolved, skinning-ready clips and the per-tick pose query

use glam::Mat4;
use hashbrown::HashMap;
use rig_formats::BoneTransform;

use crate::matrix::BoneMatrix3x4;

/// Which clip to pose and where in it
///
/// Produced by [`crate::AnimationClock`] (or built by hand for scrubbing) and
/// passed into the query; the pose tables themselves hold no playback state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    /// Active clip, `None` for the bind pose
    pub clip: Option<String>,
    pub frame: usize,
    /// Position between `frame` and the next frame, 0.0..=1.0
    pub blend: f32,
}

impl PlaybackState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn new(clip: impl Into<String>, frame: usize, blend: f32) -> Self {
        Self {
            clip: Some(clip.into()),
            frame,
            blend,
        }
    }
}

/// Skinning data for one skeleton bone across a clip
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedTrack {
    /// Skin matrix per frame (`absolute * bind_inverse`)
    pub matrices: Vec<Mat4>,
    /// The same transforms kept decomposed for interpolation
    pub keys: Vec<BoneTransform>,
}

/// One clip resolved against one skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClip {
    pub name: String,
    pub frames_per_second: f32,
    pub frame_count: usize,
    /// One track per skeleton bone, in skeleton slot order
    pub tracks: Vec<ResolvedTrack>,
    /// Whether animation data drives each skeleton slot
    pub animated: Vec<bool>,
}

impl ResolvedClip {
    pub fn bone_count(&self) -> usize {
        self.tracks.len()
    }

    /// Stored skin matrix for `bone` at `frame`
    pub fn skin(&self, bone: usize, frame: usize) -> Option<Mat4> {
        self.tracks.get(bone)?.matrices.get(frame).copied()
    }

    /// Write one matrix per skeleton bone for `frame` + `blend` into `out`.
    ///
    /// Rotation is slerped and translation lerped between `frame` and
    /// `(frame + 1) % frame_count`, then recomposed. At `blend <= 0` and
    /// `blend >= 1` the stored matrix is returned unchanged. A track with no
    /// data for the requested frames samples as identity.
    pub fn sample_into(&self, frame: usize, blend: f32, out: &mut Vec<Mat4>) {
        out.clear();
        if self.frame_count == 0 {
            out.resize(self.tracks.len(), Mat4::IDENTITY);
            return;
        }
        let current = frame % self.frame_count;
        let next = (current + 1) % self.frame_count;
        let blend = if blend.is_finite() { blend } else { 0.0 };

        out.extend(self.tracks.iter().map(|track| {
            if blend <= 0.0 {
                track.matrices.get(current).copied().unwrap_or(Mat4::IDENTITY)
            } else if blend >= 1.0 {
                track.matrices.get(next).copied().unwrap_or(Mat4::IDENTITY)
            } else {
                match (track.keys.get(current), track.keys.get(next)) {
                    (Some(a), Some(b)) => Mat4::from_rotation_translation(
                        a.rotation.slerp(b.rotation, blend),
                        a.translation.lerp(b.translation, blend),
                    ),
                    _ => Mat4::IDENTITY,
                }
            }
        }));
    }

    pub fn sample(&self, frame: usize, blend: f32) -> Vec<Mat4> {
        let mut out = Vec::with_capacity(self.tracks.len());
        self.sample_into(frame, blend, &mut out);
        out
    }
}

/// Every resolved clip of one model, keyed by clip name
#[derive(Debug, Clone, Default)]
pub struct ResolvedPose {
    bone_count: usize,
    clips: HashMap<String, ResolvedClip>,
}

impl ResolvedPose {
    pub fn new(bone_count: usize) -> Self {
        Self {
            bone_count,
            clips: HashMap::new(),
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Add or replace a clip, returning the previous entry with the same name
    pub fn insert(&mut self, clip: ResolvedClip) -> Option<ResolvedClip> {
        self.clips.insert(clip.name.clone(), clip)
    }

    pub fn remove(&mut self, name: &str) -> Option<ResolvedClip> {
        self.clips.remove(name)
    }

    pub fn clear(&mut self) {
        self.clips.clear();
    }

    pub fn clip(&self, name: &str) -> Option<&ResolvedClip> {
        self.clips.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Clip names, sorted
    pub fn clip_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// One skinning matrix per skeleton bone.
    ///
    /// With no clip, or a clip that is not attached, every bone is identity
    /// (the mesh renders in bind pose).
    pub fn bone_transforms(&self, clip: Option<&str>, frame: usize, blend: f32) -> Vec<Mat4> {
        match clip.and_then(|name| self.clips.get(name)) {
            Some(resolved) => resolved.sample(frame, blend),
            None => vec![Mat4::IDENTITY; self.bone_count],
        }
    }

    pub fn bone_transforms_for(&self, state: &PlaybackState) -> Vec<Mat4> {
        self.bone_transforms(state.clip.as_deref(), state.frame, state.blend)
    }

    /// Fill `out` with the GPU palette for `state`
    pub fn write_gpu_matrices(&self, state: &PlaybackState, out: &mut Vec<BoneMatrix3x4>) {
        out.clear();
        out.extend(
            self.bone_transforms_for(state)
                .iter()
                .map(BoneMatrix3x4::from_mat4),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn two_frame_clip() -> ResolvedClip {
        let keys = vec![
            BoneTransform::new(Quat::IDENTITY, Vec3::ZERO),
            BoneTransform::new(Quat::from_rotation_z(1.0), Vec3::new(2.0, 0.0, 0.0)),
        ];
        ResolvedClip {
            name: "swing".into(),
            frames_per_second: 30.0,
            frame_count: 2,
            tracks: vec![ResolvedTrack {
                matrices: keys.iter().map(BoneTransform::to_mat4).collect(),
                keys,
            }],
            animated: vec![true],
        }
    }

    #[test]
    fn test_blend_endpoints_are_exact() {
        let clip = two_frame_clip();
        assert_eq!(clip.sample(0, 0.0)[0], clip.skin(0, 0).unwrap());
        assert_eq!(clip.sample(0, 1.0)[0], clip.skin(0, 1).unwrap());
        // Wraps to frame 0 after the last frame
        assert_eq!(clip.sample(1, 1.0)[0], clip.skin(0, 0).unwrap());
    }

    #[test]
    fn test_blend_midpoint() {
        let clip = two_frame_clip();
        let m = clip.sample(0, 0.5)[0];
        let (_, rotation, translation) = m.to_scale_rotation_translation();
        assert!(translation.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        assert!(rotation.abs_diff_eq(Quat::from_rotation_z(0.5), 1e-5));
    }

    #[test]
    fn test_frame_wraps() {
        let clip = two_frame_clip();
        assert_eq!(clip.sample(3, 0.0), clip.sample(1, 0.0));
    }

    #[test]
    fn test_nan_blend_treated_as_zero() {
        let clip = two_frame_clip();
        assert_eq!(clip.sample(1, f32::NAN), clip.sample(1, 0.0));
    }

    #[test]
    fn test_unknown_clip_is_identity() {
        let mut pose = ResolvedPose::new(3);
        pose.insert(two_frame_clip());
        assert_eq!(pose.bone_transforms(None, 0, 0.0), vec![Mat4::IDENTITY; 3]);
        assert_eq!(
            pose.bone_transforms(Some("missing"), 0, 0.0),
            vec![Mat4::IDENTITY; 3]
        );
        assert_eq!(pose.bone_transforms(Some("swing"), 0, 0.0).len(), 1);
    }

    #[test]
    fn test_empty_clip_is_identity() {
        let clip = ResolvedClip {
            name: "empty".into(),
            frames_per_second: 30.0,
            frame_count: 0,
            tracks: vec![ResolvedTrack::default(); 2],
            animated: vec![false; 2],
        };
        assert_eq!(clip.sample(5, 0.5), vec![Mat4::IDENTITY; 2]);
    }

    #[test]
    fn test_short_track_samples_identity() {
        let mut clip = two_frame_clip();
        clip.tracks.push(ResolvedTrack {
            matrices: vec![Mat4::from_translation(Vec3::X)],
            keys: vec![BoneTransform::new(Quat::IDENTITY, Vec3::X)],
        });
        clip.animated.push(true);

        assert_eq!(clip.sample(0, 0.0)[1], Mat4::from_translation(Vec3::X));
        assert_eq!(clip.sample(1, 0.0)[1], Mat4::IDENTITY);
        assert_eq!(clip.sample(0, 1.0)[1], Mat4::IDENTITY);
        assert_eq!(clip.sample(0, 0.5)[1], Mat4::IDENTITY);
        // The complete track is unaffected
        assert_eq!(clip.sample(1, 0.0)[0], clip.skin(0, 1).unwrap());
    }

    #[test]
    fn test_write_gpu_matrices() {
        let mut pose = ResolvedPose::new(1);
        pose.insert(two_frame_clip());
        let mut palette = vec![BoneMatrix3x4::default(); 4];
        pose.write_gpu_matrices(&PlaybackState::new("swing", 1, 0.0), &mut palette);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].row0[3], 2.0);

        pose.write_gpu_matrices(&PlaybackState::idle(), &mut palette);
        assert_eq!(palette, vec![BoneMatrix3x4::IDENTITY]);
    }

    #[test]
    fn test_clip_names_sorted() {
        let mut pose = ResolvedPose::new(1);
        let mut b = two_frame_clip();
        b.name = "b".into();
        let mut a = two_frame_clip();
        a.name = "a".into();
        pose.insert(b);
        pose.insert(a);
        assert_eq!(pose.clip_names(), vec!["a", "b"]);
        pose.clear();
        assert!(pose.is_empty());
    }
}
