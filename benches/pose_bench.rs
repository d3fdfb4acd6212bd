//! Per-frame posing benchmarks: a 64-bone chain rig with a full motion,
//! one IK chain and a face morph.

use std::f32::consts::TAU;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Quat, Vec3};

use puppet::Character;
use puppet_animation::{
    AnimationRecord, AnimatorSettings, BezierEase, BoneRecord, IkRecord, MorphBaseRecord,
    MorphKeyframeRecord, MorphOffsetRecord, MorphRecord, MorphTrackRecord, NodeKeyframeRecord,
    NodeTrackRecord, SkeletonRecord,
};

const BONES: usize = 64;
const VERTICES: u32 = 4096;
const FRAMES: u32 = 300;

fn rig() -> SkeletonRecord {
    let mut bones: Vec<BoneRecord> = (0..BONES)
        .map(|i| {
            BoneRecord::new(
                format!("bone_{i}"),
                i.checked_sub(1),
                Vec3::new(0.0, i as f32 * 0.1, 0.0),
            )
        })
        .collect();
    bones.push(BoneRecord::new("ik_goal", None, Vec3::new(0.5, 5.0, 0.3)));

    let base_indices: Vec<u32> = (0..VERTICES).step_by(2).collect();
    let base_len = base_indices.len() as u32;

    SkeletonRecord {
        name: "bench".to_string(),
        iks: vec![IkRecord {
            target: BONES,
            effector: BONES - 1,
            chain: (BONES - 8..BONES - 1).rev().collect(),
            max_angle_per_iteration: 0.5,
            iteration_count: 15,
            hinge_links: Vec::new(),
        }],
        morph: MorphRecord {
            base: MorphBaseRecord {
                positions: base_indices.iter().map(|&i| Vec3::splat(i as f32)).collect(),
                vertex_indices: base_indices,
            },
            offsets: (0..8)
                .map(|m| MorphOffsetRecord {
                    name: format!("morph_{m}"),
                    vertex_indices: (m..base_len).step_by(3).collect(),
                    displacements: (m..base_len).step_by(3).map(|_| Vec3::Y).collect(),
                })
                .collect(),
        },
        vertices: (0..VERTICES).map(|i| Vec3::splat(i as f32)).collect(),
        bones,
    }
}

fn motion() -> AnimationRecord {
    let ease = BezierEase::from_descriptor([0.42, 0.0, 0.58, 1.0]);
    let node_tracks = (0..BONES)
        .map(|i| NodeTrackRecord {
            bone_name: format!("bone_{i}"),
            keyframes: (0..=FRAMES)
                .step_by(10)
                .map(|frame| {
                    let phase = frame as f32 / FRAMES as f32 * TAU + i as f32 * 0.1;
                    let mut key = NodeKeyframeRecord::linear(
                        frame,
                        Vec3::ZERO,
                        Quat::from_rotation_z(phase.sin() * 0.2),
                    );
                    key.bezier_rotation = [ease.p1().x, ease.p1().y, ease.p2().x, ease.p2().y];
                    key
                })
                .collect(),
        })
        .collect();
    let morph_tracks = (0..8)
        .map(|m| MorphTrackRecord {
            morph_name: format!("morph_{m}"),
            keyframes: vec![
                MorphKeyframeRecord { frame: 0, weight: 0.0 },
                MorphKeyframeRecord { frame: FRAMES, weight: 1.0 },
            ],
        })
        .collect();

    AnimationRecord {
        name: "sway".to_string(),
        node_tracks,
        morph_tracks,
    }
}

fn bench_advance_frame(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut group = c.benchmark_group("advance_frame");

    for (label, ik_enabled) in [("fk_morph", false), ("fk_morph_ik", true)] {
        let mut settings = AnimatorSettings::default();
        settings.ik.enabled = ik_enabled;
        let mut character = Character::load_skeleton(&rig(), settings).unwrap();
        character.load_animation(&motion()).unwrap();

        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            let mut frame = 0.0_f32;
            b.iter(|| {
                frame = (frame + 1.0) % FRAMES as f32;
                character.advance_frame(black_box(frame));
                black_box(character.skinning_matrices_bytes().len());
            });
        });
    }

    group.finish();
}

fn bench_random_seek(c: &mut Criterion) {
    let mut character = Character::load_skeleton(&rig(), AnimatorSettings::default()).unwrap();
    character.load_animation(&motion()).unwrap();

    c.bench_function("random_seek", |b| {
        let mut frame = 0.0_f32;
        b.iter(|| {
            // Large jumps defeat the keyframe cursor
            frame = (frame + 137.0) % FRAMES as f32;
            character.advance_frame(black_box(frame));
        });
    });
}

criterion_group!(benches, bench_advance_frame, bench_random_seek);
criterion_main!(benches);
