//! Decoded Asset Records
//!
//! Plain data handed over by the model/animation file loaders. Parsing the
//! binary formats happens elsewhere; these records are the boundary. All of
//! them round-trip through serde, so a decoded rig can also be stored as JSON.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One bone of the model's bone list.
///
/// `bind_position` is the bone's head position in model space. A bone's
/// parent must appear earlier in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneRecord {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    pub bind_position: Vec3,
}

impl BoneRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<usize>, bind_position: Vec3) -> Self {
        Self {
            name: name.into(),
            parent,
            bind_position,
        }
    }
}

/// One IK chain of the model.
///
/// `chain` lists the rotatable bones from the one nearest the effector out
/// toward the root. `hinge_links` optionally marks chain bones that may only
/// bend around their local X axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IkRecord {
    pub target: usize,
    pub effector: usize,
    pub chain: Vec<usize>,
    pub max_angle_per_iteration: f32,
    pub iteration_count: u32,
    #[serde(default)]
    pub hinge_links: Vec<usize>,
}

/// Morph base shape: the mesh vertices touched by any morph and their rest
/// positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphBaseRecord {
    pub vertex_indices: Vec<u32>,
    pub positions: Vec<Vec3>,
}

/// A named morph offset. `vertex_indices` index into the base shape, not
/// into the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphOffsetRecord {
    pub name: String,
    pub vertex_indices: Vec<u32>,
    pub displacements: Vec<Vec3>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphRecord {
    #[serde(default)]
    pub base: MorphBaseRecord,
    #[serde(default)]
    pub offsets: Vec<MorphOffsetRecord>,
}

/// Everything the model loader produces for the animation core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonRecord {
    #[serde(default)]
    pub name: String,
    pub bones: Vec<BoneRecord>,
    #[serde(default)]
    pub iks: Vec<IkRecord>,
    #[serde(default)]
    pub morph: MorphRecord,
    /// Full mesh vertex positions; morphs write into this array.
    #[serde(default)]
    pub vertices: Vec<Vec3>,
}

fn linear_descriptor() -> [f32; 4] {
    [1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0]
}

/// Bone keyframe. The translation is relative to the bone's bind offset.
/// Bezier descriptors are `[x1, y1, x2, y2]` and default to linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeKeyframeRecord {
    pub frame: u32,
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "linear_descriptor")]
    pub bezier_x: [f32; 4],
    #[serde(default = "linear_descriptor")]
    pub bezier_y: [f32; 4],
    #[serde(default = "linear_descriptor")]
    pub bezier_z: [f32; 4],
    #[serde(default = "linear_descriptor")]
    pub bezier_rotation: [f32; 4],
}

impl NodeKeyframeRecord {
    /// Creates a keyframe with linear easing on every channel.
    #[must_use]
    pub fn linear(frame: u32, translation: Vec3, rotation: Quat) -> Self {
        Self {
            frame,
            translation,
            rotation,
            bezier_x: linear_descriptor(),
            bezier_y: linear_descriptor(),
            bezier_z: linear_descriptor(),
            bezier_rotation: linear_descriptor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTrackRecord {
    pub bone_name: String,
    pub keyframes: Vec<NodeKeyframeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphKeyframeRecord {
    pub frame: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphTrackRecord {
    pub morph_name: String,
    pub keyframes: Vec<MorphKeyframeRecord>,
}

/// Everything the animation loader produces for one motion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node_tracks: Vec<NodeTrackRecord>,
    #[serde(default)]
    pub morph_tracks: Vec<MorphTrackRecord>,
}
