//! Character Tests
//!
//! Tests for:
//! - Full per-frame pipeline: tracks → FK → IK → morph → skinning
//! - Name binding with skip-on-miss
//! - Manual morph weights and vertex output
//! - JSON records and load error reporting
//! - Stage driving several characters

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use puppet::{Character, LoadError, PuppetError, Stage};
use puppet_animation::{
    AnimationClip, AnimationRecord, AnimatorSettings, BoneRecord, IkRecord, IkSettings,
    MorphBaseRecord, MorphKeyframeRecord, MorphOffsetRecord, MorphRecord, MorphTrackRecord,
    NodeKeyframeRecord, NodeTrackRecord, SkeletonRecord,
};

const EPSILON: f32 = 1e-4;

fn vec_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

/// Root ─ Elbow ─ Hand, one unit apart along +Y, with a two-vertex mesh
/// and a single "wave" morph on the second vertex.
fn arm_record() -> SkeletonRecord {
    SkeletonRecord {
        name: "arm".to_string(),
        bones: vec![
            BoneRecord::new("Root", None, Vec3::ZERO),
            BoneRecord::new("Elbow", Some(0), Vec3::new(0.0, 1.0, 0.0)),
            BoneRecord::new("Hand", Some(1), Vec3::new(0.0, 2.0, 0.0)),
        ],
        iks: Vec::new(),
        morph: MorphRecord {
            base: MorphBaseRecord {
                vertex_indices: vec![1],
                positions: vec![Vec3::new(0.0, 2.0, 0.0)],
            },
            offsets: vec![MorphOffsetRecord {
                name: "wave".to_string(),
                vertex_indices: vec![0],
                displacements: vec![Vec3::new(0.0, 0.0, 1.0)],
            }],
        },
        vertices: vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)],
    }
}

/// Elbow bends 0° → 90° about Z over frames 0..10.
fn bend_record() -> AnimationRecord {
    AnimationRecord {
        name: "bend".to_string(),
        node_tracks: vec![NodeTrackRecord {
            bone_name: "Elbow".to_string(),
            keyframes: vec![
                NodeKeyframeRecord::linear(0, Vec3::ZERO, Quat::IDENTITY),
                NodeKeyframeRecord::linear(10, Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2)),
            ],
        }],
        morph_tracks: Vec::new(),
    }
}

fn arm() -> Character {
    Character::load_skeleton(&arm_record(), AnimatorSettings::default()).unwrap()
}

// ============================================================================
// Per-frame Pipeline
// ============================================================================

#[test]
fn elbow_bend_at_half_way() {
    let mut character = arm();
    character.load_animation(&bend_record()).unwrap();
    character.advance_frame(5.0);

    let skeleton = character.skeleton();
    let elbow = skeleton.bone(1).unwrap();
    assert!(elbow.rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2 / 2.0), 1e-5));

    let half = std::f32::consts::FRAC_1_SQRT_2;
    let hand = skeleton.world_position(2).unwrap();
    assert!(vec_approx(hand, Vec3::new(-half, 1.0 + half, 0.0)), "hand at {hand:?}");
}

#[test]
fn skinning_follows_animated_bones() {
    let mut character = arm();
    character.load_animation(&bend_record()).unwrap();
    character.advance_frame(10.0);

    // A vertex bound to the hand in bind pose ends up where the hand is
    let skinned = character.skinning_matrices()[2].transform_point3(Vec3::new(0.0, 2.0, 0.0));
    assert!(vec_approx(skinned, Vec3::new(-1.0, 1.0, 0.0)));
    assert!(character.skinning_matrices()[0].abs_diff_eq(Mat4::IDENTITY, EPSILON));
    assert_eq!(character.skinning_matrices_bytes().len(), 3 * 64);
}

#[test]
fn frames_past_the_end_hold_last_pose() {
    let mut character = arm();
    character.load_animation(&bend_record()).unwrap();
    character.advance_frame(250.0);
    let elbow = character.skeleton().bone(1).unwrap();
    assert!(elbow.rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2), 1e-5));
}

#[test]
fn negative_frame_evaluates_as_zero() {
    let mut character = arm();
    character.load_animation(&bend_record()).unwrap();
    character.advance_frame(7.0);
    character.advance_frame(-3.0);
    assert_eq!(character.frame(), 0.0);
    assert!(
        character
            .skeleton()
            .bone(1)
            .unwrap()
            .rotation
            .abs_diff_eq(Quat::IDENTITY, 1e-6)
    );
}

#[test]
fn single_key_translation_adds_bind_offset() {
    let mut character = arm();
    character
        .load_animation(&AnimationRecord {
            name: "lift".to_string(),
            node_tracks: vec![NodeTrackRecord {
                bone_name: "Elbow".to_string(),
                keyframes: vec![NodeKeyframeRecord::linear(
                    0,
                    Vec3::new(0.0, 0.5, 0.0),
                    Quat::IDENTITY,
                )],
            }],
            morph_tracks: Vec::new(),
        })
        .unwrap();
    character.advance_frame(3.0);

    let elbow = character.skeleton().bone(1).unwrap();
    assert!(vec_approx(elbow.translation, Vec3::new(0.0, 1.5, 0.0)));
    assert!(vec_approx(
        character.skeleton().world_position(2).unwrap(),
        Vec3::new(0.0, 2.5, 0.0)
    ));
}

#[test]
fn no_animation_keeps_bind_pose() {
    let mut character = arm();
    character.advance_frame(12.0);
    for matrix in character.skinning_matrices() {
        assert!(matrix.abs_diff_eq(Mat4::IDENTITY, EPSILON));
    }
    assert_eq!(character.frame_period(), 0);
}

#[test]
fn advance_drives_playback_clock() {
    let mut character = arm();
    character.load_animation(&bend_record()).unwrap();
    assert_eq!(character.frame_period(), 10);

    // 30 fps: 0.5 s is frame 15, which wraps to 5 in a 10-frame loop
    let frame = character.advance(0.5);
    assert!((frame - 5.0).abs() < EPSILON);
    let elbow = character.skeleton().bone(1).unwrap();
    assert!(elbow.rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2 / 2.0), 1e-4));
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn tracks_for_missing_names_are_skipped() {
    let mut character = arm();
    let mut record = bend_record();
    record.node_tracks.push(NodeTrackRecord {
        bone_name: "Tail".to_string(),
        keyframes: vec![NodeKeyframeRecord::linear(0, Vec3::ONE, Quat::IDENTITY)],
    });
    record.morph_tracks.push(MorphTrackRecord {
        morph_name: "frown".to_string(),
        keyframes: vec![MorphKeyframeRecord { frame: 0, weight: 1.0 }],
    });

    character.load_animation(&record).unwrap();
    let binding = character.animator().unwrap().binding();
    assert_eq!(binding.nodes.len(), 1);
    assert!(binding.morphs.is_empty());

    character.advance_frame(5.0);
    let half = std::f32::consts::FRAC_1_SQRT_2;
    assert!(vec_approx(
        character.skeleton().world_position(2).unwrap(),
        Vec3::new(-half, 1.0 + half, 0.0)
    ));
}

#[test]
fn clip_can_be_shared_between_characters() {
    let clip = Arc::new(AnimationClip::from_record(&bend_record()).unwrap());
    let mut a = arm();
    let mut b = arm();
    a.set_clip(Arc::clone(&clip));
    b.set_clip(Arc::clone(&clip));
    a.advance_frame(10.0);
    b.advance_frame(0.0);

    assert_eq!(Arc::strong_count(&clip), 3);
    assert!(!a.skinning_matrices()[2].abs_diff_eq(b.skinning_matrices()[2], EPSILON));
}

// ============================================================================
// Morphs
// ============================================================================

#[test]
fn manual_morph_weight_moves_vertices() {
    let mut character = arm();
    assert!(character.set_morph_weight("wave", 0.5));
    assert!(!character.set_morph_weight("frown", 1.0));

    character.refresh();
    let positions = character.vertex_positions();
    assert_eq!(positions[0], Vec3::ZERO);
    assert!(vec_approx(positions[1], Vec3::new(0.0, 2.0, 0.5)));
    assert_eq!(character.vertex_positions_bytes().len(), 2 * 12);
}

#[test]
fn morph_track_drives_weight() {
    let mut character = arm();
    let mut record = bend_record();
    record.morph_tracks.push(MorphTrackRecord {
        morph_name: "wave".to_string(),
        keyframes: vec![
            MorphKeyframeRecord { frame: 0, weight: 0.0 },
            MorphKeyframeRecord { frame: 10, weight: 1.0 },
        ],
    });
    character.load_animation(&record).unwrap();
    character.advance_frame(4.0);

    assert!((character.morph().weight("wave").unwrap() - 0.4).abs() < EPSILON);
    assert!(vec_approx(character.vertex_positions()[1], Vec3::new(0.0, 2.0, 0.4)));
}

// ============================================================================
// IK
// ============================================================================

fn reaching_arm(settings: AnimatorSettings) -> Character {
    let mut record = arm_record();
    record
        .bones
        .push(BoneRecord::new("Goal", None, Vec3::new(1.2, 0.9, 0.0)));
    record.iks.push(IkRecord {
        target: 3,
        effector: 2,
        chain: vec![1, 0],
        max_angle_per_iteration: std::f32::consts::PI,
        iteration_count: 10,
        hinge_links: Vec::new(),
    });
    Character::load_skeleton(&record, settings).unwrap()
}

#[test]
fn ik_runs_without_animation() {
    let mut character = reaching_arm(AnimatorSettings::default());
    character.advance_frame(0.0);
    let hand = character.skeleton().world_position(2).unwrap();
    assert!(hand.distance(Vec3::new(1.2, 0.9, 0.0)) < 0.02);
}

#[test]
fn ik_corrects_the_animated_pose() {
    let goal = Vec3::new(1.2, 0.9, 0.0);
    let mut character = reaching_arm(AnimatorSettings::default());
    character.load_animation(&bend_record()).unwrap();

    for frame in [5.0, 6.0] {
        character.advance_frame(frame);
        let skeleton = character.skeleton();

        let hand = skeleton.world_position(2).unwrap();
        assert!(hand.distance(goal) < 0.02, "frame {frame}: hand at {hand:?}");

        let root = skeleton.bone(0).unwrap();
        let elbow = skeleton.bone(1).unwrap();
        let expected = *root.world_matrix() * *elbow.local_matrix();
        assert!(elbow.world_matrix().abs_diff_eq(expected, 1e-5));

        // Skinning is computed after IK
        let skinned = character.skinning_matrices()[2].transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert!(vec_approx(skinned, hand));
    }
}

#[test]
fn ik_can_be_disabled() {
    let settings = AnimatorSettings {
        ik: IkSettings {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut character = reaching_arm(settings);
    character.advance_frame(0.0);
    assert!(vec_approx(
        character.skeleton().world_position(2).unwrap(),
        Vec3::new(0.0, 2.0, 0.0)
    ));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn loads_from_json() {
    let skeleton_json = r#"{
        "name": "arm",
        "bones": [
            { "name": "Root", "bind_position": [0.0, 0.0, 0.0] },
            { "name": "Elbow", "parent": 0, "bind_position": [0.0, 1.0, 0.0] },
            { "name": "Hand", "parent": 1, "bind_position": [0.0, 2.0, 0.0] }
        ]
    }"#;
    let animation_json = r#"{
        "name": "bend",
        "node_tracks": [{
            "bone_name": "Elbow",
            "keyframes": [
                { "frame": 0 },
                { "frame": 10, "rotation": [0.0, 0.0, 0.70710677, 0.70710677] }
            ]
        }]
    }"#;

    let mut character = Character::from_json(skeleton_json, AnimatorSettings::default()).unwrap();
    let clip = character.load_animation_json(animation_json).unwrap();
    assert_eq!(clip.frame_period(), 10);

    character.advance_frame(5.0);
    let half = std::f32::consts::FRAC_1_SQRT_2;
    assert!(vec_approx(
        character.skeleton().world_position(2).unwrap(),
        Vec3::new(-half, 1.0 + half, 0.0)
    ));
}

#[test]
fn malformed_json_is_a_json_error() {
    let result = Character::from_json("{ \"bones\": 3 }", AnimatorSettings::default());
    assert!(matches!(result, Err(PuppetError::Json(_))));
}

#[test]
fn invalid_skeleton_is_a_load_error() {
    let mut record = arm_record();
    record.bones[1] = BoneRecord::new("Elbow", Some(2), Vec3::Y);
    let result = Character::load_skeleton(&record, AnimatorSettings::default());
    assert!(matches!(
        result,
        Err(PuppetError::Load(LoadError::InvalidParent { bone: 1, parent: 2 }))
    ));
}

#[test]
fn invalid_morph_is_a_load_error() {
    let mut record = arm_record();
    record.vertices.truncate(1);
    let result = Character::load_skeleton(&record, AnimatorSettings::default());
    assert!(matches!(
        result,
        Err(PuppetError::Load(LoadError::MorphIndexOutOfRange { .. }))
    ));
}

// ============================================================================
// Stage
// ============================================================================

#[test]
fn stage_updates_every_character() {
    let mut stage = Stage::new();
    let clip = Arc::new(AnimationClip::from_record(&bend_record()).unwrap());

    let mut keys = Vec::new();
    for _ in 0..3 {
        let mut character = arm();
        character.set_clip(Arc::clone(&clip));
        keys.push(stage.insert(character));
    }
    assert_eq!(stage.len(), 3);

    stage.update(1.0 / 6.0);
    for &key in &keys {
        let frame = stage.get(key).unwrap().frame();
        assert!((frame - 5.0).abs() < EPSILON);
    }

    let removed = stage.remove(keys[1]).unwrap();
    assert_eq!(removed.name(), "arm");
    assert!(stage.get(keys[1]).is_none());
    assert_eq!(stage.iter().count(), 2);
}
