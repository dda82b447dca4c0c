//! Loaded-model object
//!
//! A [`Model`] owns the skeleton, the remapped mesh and every attached clip
//! together with its resolved pose table. Clips are decoded when attached;
//! a clip that fails is remembered so playback requests for it report why,
//! while the model keeps rendering in bind pose.

use glam::Mat4;
use hashbrown::HashMap;
use rig_formats::name::normalize_str;
use rig_formats::{
    AnimationClip, DecodeLimits, Mesh, NamedBuffer, Skeleton, decode_animation_with,
    decode_mesh_with, decode_skeleton_with,
};

use crate::builder::{ClipReport, PoseBuilder};
use crate::error::{ModelError, PoseError};
use crate::matrix::BoneMatrix3x4;
use crate::pose::{PlaybackState, ResolvedPose};

#[derive(Debug)]
pub struct Model {
    name: String,
    skeleton: Skeleton,
    mesh: Mesh,
    builder: PoseBuilder,
    pose: ResolvedPose,
    clips: HashMap<String, AnimationClip>,
    failed: HashMap<String, PoseError>,
    limits: DecodeLimits,
}

impl Model {
    /// Decode skeleton and mesh; either failing fails the model.
    ///
    /// Mesh bone indices are rewritten into skeleton slots here.
    pub fn load(
        skeleton: &impl NamedBuffer,
        mesh: &impl NamedBuffer,
        limits: &DecodeLimits,
    ) -> Result<Self, ModelError> {
        let decoded = decode_skeleton_with(skeleton.content(), limits).map_err(|source| {
            ModelError::Skeleton {
                asset: skeleton.name().to_string(),
                source,
            }
        })?;
        decoded.diagnostics.emit(skeleton.name());
        let skeleton_data = decoded.into_value();

        let decoded = decode_mesh_with(mesh.content(), limits).map_err(|source| ModelError::Mesh {
            asset: mesh.name().to_string(),
            source,
        })?;
        decoded.diagnostics.emit(mesh.name());
        let mut mesh_data = decoded.into_value();

        let builder = PoseBuilder::new(&skeleton_data);
        let clamped = builder.remap_mesh(&mut mesh_data);
        if clamped > 0 {
            tracing::warn!(
                "{}: {} vertex bone influences clamped to the root bone",
                mesh.name(),
                clamped
            );
        }

        tracing::info!(
            "Loaded model '{}': {} bones, {} vertices, {} triangles",
            mesh.name(),
            skeleton_data.bone_count(),
            mesh_data.vertices.len(),
            mesh_data.triangle_count()
        );

        Ok(Self {
            name: mesh.name().to_string(),
            pose: ResolvedPose::new(skeleton_data.bone_count()),
            skeleton: skeleton_data,
            mesh: mesh_data,
            builder,
            clips: HashMap::new(),
            failed: HashMap::new(),
            limits: *limits,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Mesh with bone indices already in skeleton slots
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn pose(&self) -> &ResolvedPose {
        &self.pose
    }

    pub fn builder(&self) -> &PoseBuilder {
        &self.builder
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(&normalize_str(name))
    }

    /// Why an attached clip cannot be played, if it failed
    pub fn failure(&self, name: &str) -> Option<&PoseError> {
        self.failed.get(&normalize_str(name))
    }

    /// Decode and attach an animation clip named after the buffer.
    ///
    /// Never fails the model: decode and reconciliation problems are recorded
    /// against the clip name and reported.
    pub fn attach_animation(&mut self, buffer: &impl NamedBuffer) -> ClipReport {
        match decode_animation_with(buffer.name(), buffer.content(), &self.limits) {
            Ok(decoded) => {
                decoded.diagnostics.emit(buffer.name());
                self.attach_clip(decoded.into_value())
            }
            Err(source) => {
                let clip = normalize_str(buffer.name());
                let error = PoseError::Decode {
                    clip: clip.clone(),
                    source,
                };
                self.forget(&clip);
                self.failed.insert(clip.clone(), error.clone());
                let report = ClipReport::failed(clip, error);
                report.emit();
                report
            }
        }
    }

    /// Resolve an already-decoded clip and cache its pose table, replacing
    /// any clip with the same name. The name is normalized first, so lookups
    /// are case-insensitive however the clip was built.
    pub fn attach_clip(&mut self, mut clip: AnimationClip) -> ClipReport {
        clip.name = normalize_str(&clip.name);
        let report = match self.builder.build_clip(&clip) {
            Ok((resolved, report)) => {
                self.failed.remove(&clip.name);
                self.pose.insert(resolved);
                self.clips.insert(clip.name.clone(), clip);
                report
            }
            Err(error) => {
                self.forget(&clip.name);
                self.failed.insert(clip.name.clone(), error.clone());
                ClipReport::failed(clip.name, error)
            }
        };
        report.emit();
        report
    }

    fn forget(&mut self, name: &str) {
        self.pose.remove(name);
        self.clips.remove(name);
    }

    /// Skinning matrices for `state`.
    ///
    /// With no clip every bone is identity. A clip that failed to attach
    /// returns the recorded error; a clip never attached is
    /// [`PoseError::UnknownClip`].
    pub fn bone_transforms(&self, state: &PlaybackState) -> Result<Vec<Mat4>, PoseError> {
        let Some(name) = state.clip.as_deref() else {
            return Ok(self.pose.bone_transforms(None, 0, 0.0));
        };
        let key = normalize_str(name);
        if let Some(error) = self.failed.get(&key) {
            return Err(error.clone());
        }
        match self.pose.clip(&key) {
            Some(clip) => Ok(clip.sample(state.frame, state.blend)),
            None => Err(PoseError::UnknownClip(key)),
        }
    }

    /// GPU palette for `state`; see [`Model::bone_transforms`]
    pub fn write_gpu_matrices(
        &self,
        state: &PlaybackState,
        out: &mut Vec<BoneMatrix3x4>,
    ) -> Result<(), PoseError> {
        let transforms = self.bone_transforms(state)?;
        out.clear();
        out.extend(transforms.iter().map(BoneMatrix3x4::from_mat4));
        Ok(())
    }

    /// Drop every attached clip and its cached pose table
    pub fn unload(&mut self) {
        tracing::debug!("{}: unloading {} clips", self.name, self.clips.len());
        self.pose.clear();
        self.clips.clear();
        self.failed.clear();
    }
}
