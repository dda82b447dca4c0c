//! Inspect command - decode one asset and print what it holds

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rig_formats::{
    AnimationClip, DecodeLimits, Diagnostics, Mesh, NamedBuffer, Skeleton, SkeletonFormat,
    decode_animation_with, decode_mesh_with, decode_skeleton_with,
};
use rig_pose::Config;

use crate::assets::{AssetKind, FileBuffer};

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Asset file (.skel, .mesh or .anim)
    pub file: PathBuf,

    /// Asset kind, when the extension does not say
    #[arg(long, value_enum)]
    pub kind: Option<AssetKind>,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs, config: &Config) -> Result<()> {
    let kind = match args.kind {
        Some(kind) => kind,
        None => AssetKind::from_path(&args.file).with_context(|| {
            format!(
                "Cannot tell the asset kind of {}; pass --kind",
                args.file.display()
            )
        })?,
    };
    let buffer = FileBuffer::read(&args.file)?;
    print!("{}", describe(kind, &buffer, &config.decode)?);
    Ok(())
}

/// Decode `buffer` as `kind` and render a text summary
pub fn describe(kind: AssetKind, buffer: &FileBuffer, limits: &DecodeLimits) -> Result<String> {
    let name = buffer.name();
    let mut out = String::new();
    match kind {
        AssetKind::Skeleton => {
            let decoded = decode_skeleton_with(buffer.content(), limits)
                .with_context(|| format!("Failed to decode skeleton '{}'", name))?;
            write_skeleton(&mut out, name, &decoded.value)?;
            write_diagnostics(&mut out, &decoded.diagnostics)?;
        }
        AssetKind::Mesh => {
            let decoded = decode_mesh_with(buffer.content(), limits)
                .with_context(|| format!("Failed to decode mesh '{}'", name))?;
            write_mesh(&mut out, name, &decoded.value)?;
            write_diagnostics(&mut out, &decoded.diagnostics)?;
        }
        AssetKind::Animation => {
            let decoded = decode_animation_with(name, buffer.content(), limits)
                .with_context(|| format!("Failed to decode animation '{}'", name))?;
            write_animation(&mut out, &decoded.value)?;
            write_diagnostics(&mut out, &decoded.diagnostics)?;
        }
    }
    Ok(out)
}

fn write_skeleton(out: &mut String, name: &str, skeleton: &Skeleton) -> std::fmt::Result {
    let layout = match skeleton.format {
        SkeletonFormat::Legacy { .. } => "legacy",
        SkeletonFormat::Indexed { .. } => "indexed",
    };
    writeln!(
        out,
        "skeleton {}: version {} ({}), {} bones",
        name,
        skeleton.version(),
        layout,
        skeleton.bone_count()
    )?;
    if let Some(remap) = &skeleton.remap {
        writeln!(
            out,
            "  remap: {:?}, {} entries",
            remap.direction(),
            remap.len()
        )?;
    }
    for bone in &skeleton.bones {
        let parent = match bone.parent {
            Some(p) => p.to_string(),
            None => "-".to_string(),
        };
        let t = bone.bind.translation;
        writeln!(
            out,
            "  [{:3}] {:<24} parent {:<4} bind ({:.3}, {:.3}, {:.3})",
            bone.index, bone.name, parent, t.x, t.y, t.z
        )?;
    }
    let order: Vec<String> = skeleton
        .evaluation_order()
        .iter()
        .map(|i| i.to_string())
        .collect();
    writeln!(out, "  evaluation order: {}", order.join(" "))
}

fn write_mesh(out: &mut String, name: &str, mesh: &Mesh) -> std::fmt::Result {
    writeln!(
        out,
        "mesh {}: version {}, {} vertices, {} indices ({} triangles), {} materials",
        name,
        mesh.version,
        mesh.vertices.len(),
        mesh.indices.len(),
        mesh.triangle_count(),
        mesh.materials.len()
    )?;
    for material in &mesh.materials {
        writeln!(
            out,
            "  material '{}': vertices {}+{}, indices {}+{}",
            material.name,
            material.start_vertex,
            material.vertex_count,
            material.start_index,
            material.index_count
        )?;
    }
    if let Some(trailer) = mesh.trailer {
        writeln!(out, "  trailer: {:?}", trailer)?;
    }
    let max_bone = mesh
        .vertices
        .iter()
        .flat_map(|v| v.bone_indices)
        .max();
    if let Some(max_bone) = max_bone {
        writeln!(out, "  highest bone index: {}", max_bone)?;
    }
    Ok(())
}

fn write_animation(out: &mut String, clip: &AnimationClip) -> std::fmt::Result {
    writeln!(
        out,
        "animation {}: version {}, {} bones, {} frames @ {} fps ({:.2} s)",
        clip.name,
        clip.version(),
        clip.bones.len(),
        clip.frame_count,
        clip.frames_per_second,
        clip.duration()
    )?;
    if let Some(limitation) = clip.limitation {
        writeln!(out, "  not playable: {}", limitation)?;
    }
    for bone in &clip.bones {
        writeln!(out, "  bone {}: {} frames", bone.identity, bone.frames.len())?;
    }
    Ok(())
}

fn write_diagnostics(out: &mut String, diagnostics: &Diagnostics) -> std::fmt::Result {
    for diagnostic in diagnostics.iter() {
        writeln!(out, "  {}", diagnostic)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use rig_formats::fixtures::{
        BoneSpec, LookupSpec, VertexSpec, direct_animation, indexed_animation, legacy_skeleton,
        mesh,
    };

    fn buffer(dir: &tempfile::TempDir, file: &str, data: Vec<u8>) -> FileBuffer {
        let path = dir.path().join(file);
        std::fs::write(&path, data).unwrap();
        FileBuffer::read(&path).unwrap()
    }

    #[test]
    fn test_describe_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let data = legacy_skeleton(
            2,
            &[
                BoneSpec::new("Pelvis", -1, Vec3::ZERO),
                BoneSpec::new("Spine", 0, Vec3::new(0.0, 5.0, 0.0)),
            ],
            Some(&[0, 1, 9]),
        );
        let text = describe(
            AssetKind::Skeleton,
            &buffer(&dir, "hero.skel", data),
            &DecodeLimits::default(),
        )
        .unwrap();
        assert!(text.starts_with("skeleton hero: version 2 (legacy), 2 bones"));
        assert!(text.contains("spine"));
        assert!(text.contains("evaluation order: 0 1"));
        assert!(text.contains("VertexToSkeleton"));
        assert!(text.contains("warning:"));
    }

    #[test]
    fn test_describe_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let data = mesh(
            2,
            &[("Skin", 0, 1, 0, 3)],
            &[0, 0, 0],
            &[VertexSpec::rigid(Vec3::ZERO, 4)],
            [5, 6, 7],
        );
        let text = describe(
            AssetKind::Mesh,
            &buffer(&dir, "hero.mesh", data),
            &DecodeLimits::default(),
        )
        .unwrap();
        assert!(text.contains("1 vertices, 3 indices (1 triangles), 1 materials"));
        assert!(text.contains("material 'Skin'"));
        assert!(text.contains("trailer: [5, 6, 7]"));
        assert!(text.contains("highest bone index: 4"));
    }

    #[test]
    fn test_describe_animation() {
        let dir = tempfile::tempdir().unwrap();
        let data = direct_animation(0, 30, 30, &[("Root", vec![(Quat::IDENTITY, Vec3::ZERO); 30])]);
        let text = describe(
            AssetKind::Animation,
            &buffer(&dir, "Walk.anim", data),
            &DecodeLimits::default(),
        )
        .unwrap();
        assert!(text.starts_with("animation walk: version 0, 1 bones, 30 frames @ 30 fps (1.00 s)"));
        assert!(text.contains("bone 'root': 30 frames"));
    }

    #[test]
    fn test_describe_indexed_animation() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = LookupSpec {
            bone_id: 0xCAFE,
            position: 0,
            orientation: 0,
        };
        let data = indexed_animation(1, 1, 0.05, &[Vec3::ZERO], &[Quat::IDENTITY], &[lookup]);
        let text = describe(
            AssetKind::Animation,
            &buffer(&dir, "run.anim", data),
            &DecodeLimits::default(),
        )
        .unwrap();
        assert!(text.contains("not playable"));
        assert!(text.contains("bone 0x0000CAFE: 1 frames"));
    }

    #[test]
    fn test_describe_failure_names_asset() {
        let dir = tempfile::tempdir().unwrap();
        let err = describe(
            AssetKind::Mesh,
            &buffer(&dir, "broken.mesh", vec![0; 3]),
            &DecodeLimits::default(),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to decode mesh 'broken'"));
    }
}
