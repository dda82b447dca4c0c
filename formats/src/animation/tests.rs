//! Tests for animation decoding

use glam::{Quat, Vec3};

use super::indexed::fps_from_seconds_per_frame;
use super::*;
use crate::fixtures::{ByteWriter, LookupSpec, direct_animation, indexed_animation};

fn key(x: f32) -> (Quat, Vec3) {
    (Quat::IDENTITY, Vec3::new(x, 0.0, 0.0))
}

fn lookup(bone_id: u32, position: u16, orientation: u16) -> LookupSpec {
    LookupSpec {
        bone_id,
        position,
        orientation,
    }
}

// ========================================================================
// Dispatch
// ========================================================================

#[test]
fn test_unsupported_version() {
    let data = direct_animation(5, 30, 0, &[]);
    let err = decode_animation("clip", &data).unwrap_err();
    assert_eq!(
        err,
        FormatError::UnsupportedVersion {
            kind: AssetKind::Animation,
            version: 5
        }
    );
}

#[test]
fn test_clip_name_normalized() {
    let data = direct_animation(0, 30, 1, &[("root", vec![key(0.0)])]);
    let clip = decode_animation("  Walk_FWD ", &data).unwrap().value;
    assert_eq!(clip.name, "walk_fwd");
}

#[test]
fn test_truncated_prefix() {
    let err = decode_animation("clip", b"ANIM").unwrap_err();
    assert!(matches!(err, FormatError::OutOfBounds { .. }));
}

// ========================================================================
// Direct (v0-v3)
// ========================================================================

#[test]
fn test_direct_single_bone() {
    let data = direct_animation(0, 30, 2, &[("Bip01", vec![key(0.0), key(10.0)])]);
    let decoded = decode_animation("walk", &data).unwrap();
    assert!(decoded.diagnostics.is_empty());

    let clip = decoded.value;
    assert_eq!(clip.version(), 0);
    assert_eq!(clip.frames_per_second, 30.0);
    assert_eq!(clip.frame_count, 2);
    assert!(clip.is_renderable());
    assert_eq!(clip.bones.len(), 1);
    assert_eq!(clip.bones[0].identity, BoneIdentity::Name("bip01".to_string()));
    assert_eq!(clip.bones[0].frames[1].translation, Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn test_direct_bone_major_order() {
    let data = direct_animation(
        3,
        24,
        2,
        &[
            ("a", vec![key(1.0), key(2.0)]),
            ("b", vec![key(3.0), key(4.0)]),
        ],
    );
    let clip = decode_animation("clip", &data).unwrap().value;
    let xs: Vec<Vec<f32>> = clip
        .bones
        .iter()
        .map(|b| b.frames.iter().map(|f| f.translation.x).collect())
        .collect();
    assert_eq!(xs, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    assert_eq!(clip.version(), 3);
    match clip.format {
        AnimationFormat::Direct { magic, .. } => assert_eq!(magic, 0x4D49_4E41),
        other => panic!("expected direct format, got {:?}", other),
    }
}

#[test]
fn test_direct_duration() {
    let data = direct_animation(1, 30, 60, &[]);
    let clip = decode_animation("clip", &data).unwrap().value;
    assert_eq!(clip.duration(), 2.0);
}

#[test]
fn test_direct_zero_fps_warns() {
    let data = direct_animation(0, 0, 1, &[("root", vec![key(0.0)])]);
    let decoded = decode_animation("clip", &data).unwrap();
    assert!(decoded.diagnostics.has_warnings());
    assert_eq!(decoded.value.duration(), 0.0);
}

#[test]
fn test_direct_truncated_keyframe() {
    let mut data = direct_animation(0, 30, 2, &[("root", vec![key(0.0), key(1.0)])]);
    data.truncate(data.len() - DIRECT_KEYFRAME_SIZE / 2);
    let err = decode_animation("clip", &data).unwrap_err();
    assert!(matches!(err, FormatError::OutOfBounds { .. }));
}

#[test]
fn test_direct_frame_limit() {
    let data = direct_animation(0, 30, 3, &[]);
    let limits = DecodeLimits {
        max_frames: 2,
        ..Default::default()
    };
    let err = decode_animation_with("clip", &data, &limits).unwrap_err();
    assert!(matches!(err, FormatError::MalformedReference(_)));
}

#[test]
fn test_direct_duplicate_bone_warns() {
    let data = direct_animation(0, 30, 1, &[("Root", vec![key(0.0)]), ("root", vec![key(1.0)])]);
    let decoded = decode_animation("clip", &data).unwrap();
    assert!(decoded.diagnostics.has_warnings());
    assert_eq!(decoded.value.bones.len(), 2);
}

#[test]
fn test_direct_degenerate_rotation_replaced() {
    let data = direct_animation(
        0,
        30,
        1,
        &[("root", vec![(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0), Vec3::ZERO)])],
    );
    let decoded = decode_animation("clip", &data).unwrap();
    assert_eq!(decoded.value.bones[0].frames[0].rotation, Quat::IDENTITY);
    assert!(decoded.diagnostics.has_warnings());
}

// ========================================================================
// Indexed (v4)
// ========================================================================

#[test]
fn test_fps_from_seconds_per_frame() {
    assert_eq!(fps_from_seconds_per_frame(1.0 / 30.0), Some(30.0));
    assert_eq!(fps_from_seconds_per_frame(0.0417), Some(24.0));
    assert_eq!(fps_from_seconds_per_frame(0.0), None);
    assert_eq!(fps_from_seconds_per_frame(-1.0), None);
    assert_eq!(fps_from_seconds_per_frame(f32::NAN), None);
}

#[test]
fn test_indexed_reassembles_bone_major() {
    let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
    let orientations = [Quat::IDENTITY, Quat::from_rotation_z(1.0)];
    let lookups = [
        // frame 0
        lookup(0xAAAA, 0, 0),
        lookup(0xBBBB, 1, 0),
        // frame 1, ids in a different order
        lookup(0xBBBB, 2, 1),
        lookup(0xAAAA, 1, 0),
        // frame 2
        lookup(0xAAAA, 2, 1),
        lookup(0xBBBB, 0, 0),
    ];
    let data = indexed_animation(2, 3, 1.0 / 30.0, &positions, &orientations, &lookups);
    let decoded = decode_animation("idle", &data).unwrap();
    assert!(decoded.diagnostics.is_empty());

    let clip = decoded.value;
    assert_eq!(clip.version(), 4);
    assert_eq!(clip.frames_per_second, 30.0);
    assert_eq!(clip.frame_count, 3);
    assert_eq!(clip.bones.len(), 2);
    assert_eq!(clip.bones[0].identity, BoneIdentity::Hash(0xAAAA));
    assert_eq!(clip.bones[1].identity, BoneIdentity::Hash(0xBBBB));
    for bone in &clip.bones {
        assert_eq!(bone.frames.len(), 3);
    }

    let a: Vec<Vec3> = clip.bones[0].frames.iter().map(|f| f.translation).collect();
    assert_eq!(a, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    let b: Vec<Vec3> = clip.bones[1].frames.iter().map(|f| f.translation).collect();
    assert_eq!(b, vec![Vec3::X, Vec3::Y, Vec3::ZERO]);
    assert!(clip.bones[1].frames[1].rotation.abs_diff_eq(orientations[1], 1e-6));
}

#[test]
fn test_indexed_flagged_not_renderable() {
    let data = indexed_animation(1, 1, 0.05, &[Vec3::ZERO], &[Quat::IDENTITY], &[lookup(1, 0, 0)]);
    let clip = decode_animation("clip", &data).unwrap().value;
    assert_eq!(clip.limitation, Some(PlaybackLimitation::IndexedBoneRemap));
    assert!(!clip.is_renderable());
    assert_eq!(clip.frames_per_second, 20.0);
}

#[test]
fn test_indexed_unknown_id_in_later_frame() {
    let data = indexed_animation(
        1,
        2,
        0.05,
        &[Vec3::ZERO],
        &[Quat::IDENTITY],
        &[lookup(1, 0, 0), lookup(2, 0, 0)],
    );
    let err = decode_animation("clip", &data).unwrap_err();
    assert!(matches!(err, FormatError::MalformedReference(_)));
}

#[test]
fn test_indexed_pool_index_out_of_range() {
    let data = indexed_animation(1, 1, 0.05, &[Vec3::ZERO], &[Quat::IDENTITY], &[lookup(1, 3, 0)]);
    let err = decode_animation("clip", &data).unwrap_err();
    assert!(matches!(err, FormatError::MalformedReference(_)));
}

#[test]
fn test_indexed_zero_seconds_per_frame() {
    let data = indexed_animation(1, 1, 0.0, &[Vec3::ZERO], &[Quat::IDENTITY], &[lookup(1, 0, 0)]);
    let decoded = decode_animation("clip", &data).unwrap();
    assert_eq!(decoded.value.frames_per_second, 0.0);
    assert!(decoded.diagnostics.has_warnings());
}

#[test]
fn test_indexed_duplicate_first_frame_id() {
    let data = indexed_animation(
        2,
        1,
        0.05,
        &[Vec3::ZERO],
        &[Quat::IDENTITY],
        &[lookup(7, 0, 0), lookup(7, 0, 0)],
    );
    let decoded = decode_animation("clip", &data).unwrap();
    assert_eq!(decoded.value.bones.len(), 1);
    assert!(decoded.diagnostics.has_warnings());
}

#[test]
fn test_indexed_truncated_lookups() {
    let mut data = indexed_animation(1, 1, 0.05, &[Vec3::ZERO], &[Quat::IDENTITY], &[lookup(1, 0, 0)]);
    data.truncate(data.len() - LOOKUP_RECORD_SIZE / 2);
    let err = decode_animation("clip", &data).unwrap_err();
    assert!(matches!(err, FormatError::OutOfBounds { .. }));
}

#[test]
fn test_indexed_bad_pool_offset() {
    let mut w = ByteWriter::new();
    w.raw(b"ANIMIDX4")
        .u32(4)
        .u32(0)
        .u32(0)
        .f32(0.05)
        .u32(0x7FFF_FFFF)
        .u32(1)
        .u32(0)
        .u32(0)
        .u32(0);
    let err = decode_animation("clip", &w.finish()).unwrap_err();
    assert!(matches!(err, FormatError::OutOfBounds { .. }));
}

#[test]
fn test_indexed_header_only_with_maximum_counts() {
    // Counts at the decode limits, no pools and no lookups behind them
    let limits = DecodeLimits::default();
    let mut w = ByteWriter::new();
    w.raw(b"ANIMIDX4")
        .u32(4)
        .u32(limits.max_bones)
        .u32(limits.max_frames)
        .f32(0.05)
        .u32(44)
        .u32(0)
        .u32(44)
        .u32(0)
        .u32(44);
    let data = w.finish();
    assert_eq!(data.len(), 44);

    let err = decode_animation_with("clip", &data, &limits).unwrap_err();
    assert!(matches!(err, FormatError::OutOfBounds { offset: 44, .. }));
}

#[test]
fn test_direct_header_only_with_maximum_counts() {
    let limits = DecodeLimits::default();
    let mut w = ByteWriter::new();
    w.raw(b"ANIMDIR0")
        .u32(0)
        .u32(0x4D49_4E41)
        .u32(limits.max_bones)
        .u32(limits.max_frames)
        .u32(30);
    let err = decode_animation_with("clip", &w.finish(), &limits).unwrap_err();
    assert!(matches!(err, FormatError::OutOfBounds { .. }));
}
