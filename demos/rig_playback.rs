//! Plays a short arm-wave motion on a three-bone rig and prints the hand's
//! world position each frame.
//!
//! ```text
//! cargo run --example rig_playback
//! cargo run --example rig_playback -- rig.json motion.json
//! ```
//!
//! With arguments, the rig and motion are read from JSON records instead.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use puppet::{AnimationRecord, AnimatorSettings, BoneRecord, Character, SkeletonRecord};
use puppet_animation::{
    MorphBaseRecord, MorphKeyframeRecord, MorphOffsetRecord, MorphRecord, MorphTrackRecord,
    NodeKeyframeRecord, NodeTrackRecord,
};

fn builtin_rig() -> SkeletonRecord {
    SkeletonRecord {
        name: "arm".to_string(),
        bones: vec![
            BoneRecord::new("Shoulder", None, Vec3::ZERO),
            BoneRecord::new("Elbow", Some(0), Vec3::new(0.0, 1.0, 0.0)),
            BoneRecord::new("Hand", Some(1), Vec3::new(0.0, 2.0, 0.0)),
        ],
        iks: Vec::new(),
        morph: MorphRecord {
            base: MorphBaseRecord {
                vertex_indices: vec![2],
                positions: vec![Vec3::new(0.0, 2.0, 0.0)],
            },
            offsets: vec![MorphOffsetRecord {
                name: "fist".to_string(),
                vertex_indices: vec![0],
                displacements: vec![Vec3::new(0.0, -0.2, 0.0)],
            }],
        },
        vertices: vec![Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 2.0, 0.0)],
    }
}

fn builtin_motion() -> AnimationRecord {
    let mut wave_out =
        NodeKeyframeRecord::linear(15, Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2));
    // Ease in and out on the way up
    wave_out.bezier_rotation = [0.42, 0.0, 0.58, 1.0];

    AnimationRecord {
        name: "wave".to_string(),
        node_tracks: vec![NodeTrackRecord {
            bone_name: "Elbow".to_string(),
            keyframes: vec![
                NodeKeyframeRecord {
                    bezier_rotation: [0.42, 0.0, 0.58, 1.0],
                    ..NodeKeyframeRecord::linear(0, Vec3::ZERO, Quat::IDENTITY)
                },
                wave_out,
                NodeKeyframeRecord::linear(30, Vec3::ZERO, Quat::IDENTITY),
            ],
        }],
        morph_tracks: vec![MorphTrackRecord {
            morph_name: "fist".to_string(),
            keyframes: vec![
                MorphKeyframeRecord { frame: 0, weight: 0.0 },
                MorphKeyframeRecord { frame: 30, weight: 1.0 },
            ],
        }],
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut character = match args.first() {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Character::from_json(&json, AnimatorSettings::default())?
        }
        None => Character::load_skeleton(&builtin_rig(), AnimatorSettings::default())?,
    };

    match args.get(1) {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            character.load_animation_json(&json)?;
        }
        None => {
            character.load_animation(&builtin_motion())?;
        }
    }

    let period = character.frame_period();
    let effector = character.skeleton().len().saturating_sub(1);
    println!(
        "Playing '{}' on '{}': {} frames",
        character
            .animator()
            .map_or("", |a| a.clip().name.as_str()),
        character.name(),
        period
    );

    // One loop at 30 fps, sampled every other frame
    let dt = 2.0 / character.playback.frames_per_second;
    for _ in 0..=period / 2 {
        let frame = character.advance(dt);
        let position = character
            .skeleton()
            .world_position(effector)
            .unwrap_or(Vec3::ZERO);
        println!(
            "frame {frame:6.2}  bone {effector} at ({:+.3}, {:+.3}, {:+.3})",
            position.x, position.y, position.z
        );
    }

    Ok(())
}
