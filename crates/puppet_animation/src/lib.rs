//! Puppet Animation
//!
//! Per-frame posing of articulated characters:
//!
//! - [`skeleton`]: bone arena and forward kinematics
//! - [`tracks`] / [`clip`]: keyframe storage and segment lookup
//! - [`easing`]: cubic Bezier easing curves
//! - [`animator`] / [`binder`]: applying a clip to a model
//! - [`ik`]: cyclic coordinate descent IK
//! - [`morph`]: sparse vertex morph blending
//! - [`playback`]: frame clock with loop modes
//!
//! The crate does no file parsing; loaders hand over [`records`].

pub mod animator;
pub mod binder;
pub mod clip;
pub mod easing;
pub mod ik;
pub mod morph;
pub mod playback;
pub mod records;
pub mod settings;
pub mod skeleton;
pub mod tracks;

pub use animator::Animator;
pub use binder::{Binder, ClipBinding, MorphBinding, NodeBinding};
pub use clip::{AnimationClip, MorphTrack, NodeTrack};
pub use easing::BezierEase;
pub use ik::{CcdSolver, ConstraintKind, IkChain, IkLink, IkOutcome};
pub use morph::{MorphOffset, MorphTarget};
pub use playback::{LoopMode, Playback};
pub use records::{
    AnimationRecord, BoneRecord, IkRecord, MorphBaseRecord, MorphKeyframeRecord,
    MorphOffsetRecord, MorphRecord, MorphTrackRecord, NodeKeyframeRecord, NodeTrackRecord,
    SkeletonRecord,
};
pub use settings::{AnimatorSettings, HingeHeuristic, IkSettings};
pub use skeleton::{Bone, Skeleton};
pub use tracks::{
    Keyframe, KeyframeCursor, KeyframeTrack, MorphKeyframe, NodeKeyframe, NodeSample, Segment,
};
