#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Puppet
//!
//! Skeletal animation core for articulated characters: bone hierarchy and
//! forward kinematics, Bezier-eased keyframe playback, CCD inverse
//! kinematics and sparse morph blending.
//!
//! ```rust,ignore
//! use puppet::{AnimatorSettings, Character};
//!
//! let mut character = Character::load_skeleton(&skeleton_record, AnimatorSettings::default())?;
//! character.load_animation(&motion_record)?;
//! character.advance_frame(12.0);
//! upload(character.skinning_matrices_bytes());
//! ```

pub mod character;
pub mod system;

pub use character::Character;
pub use system::{CharacterKey, Stage};

pub use puppet_animation::{
    AnimationClip, AnimationRecord, AnimatorSettings, BoneRecord, IkRecord, IkSettings,
    LoopMode, MorphRecord, Playback, SkeletonRecord,
};
pub use puppet_core::{LoadError, PuppetError, Result};
