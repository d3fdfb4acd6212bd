//! Animator Settings
//!
//! Runtime configuration for the per-frame update. Every field has a default
//! matching the behaviour expected by common character rigs, so most callers
//! only override what they need:
//!
//! ```rust,ignore
//! use puppet_animation::settings::{AnimatorSettings, IkSettings};
//!
//! // Preview the raw keyframed motion without IK correction
//! let settings = AnimatorSettings {
//!     ik: IkSettings { enabled: false, ..Default::default() },
//!     ..Default::default()
//! };
//! ```
//!
//! Settings deserialize from JSON; missing fields take their defaults.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::ik::ConstraintKind;

/// Lower bound of knee flexion; keeps knees from locking fully straight.
pub const DEFAULT_HINGE_MIN_ANGLE: f32 = 0.002;

/// Top-level configuration of the per-frame update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorSettings {
    /// Sample bone tracks each frame.
    pub node_animation: bool,
    /// Sample morph weight tracks each frame.
    pub morph_animation: bool,
    pub ik: IkSettings,
}

impl Default for AnimatorSettings {
    fn default() -> Self {
        Self {
            node_animation: true,
            morph_animation: true,
            ik: IkSettings::default(),
        }
    }
}

/// CCD solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkSettings {
    pub enabled: bool,
    /// Squared effector-to-target distance below which a chain is solved.
    pub convergence_distance_sq: f32,
    /// Corrections smaller than this (radians) are skipped.
    pub min_correction_angle: f32,
    pub hinge: HingeHeuristic,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            convergence_distance_sq: 1e-4,
            min_correction_angle: 1e-4,
            hinge: HingeHeuristic::default(),
        }
    }
}

/// Identifies single-axis hinge joints (knees) by bone name.
///
/// Chain bones whose name contains any of `name_patterns` are constrained
/// to X-axis rotation within `[min_angle, max_angle]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HingeHeuristic {
    pub name_patterns: Vec<String>,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl Default for HingeHeuristic {
    fn default() -> Self {
        Self {
            name_patterns: vec!["ひざ".to_string(), "knee".to_string()],
            min_angle: DEFAULT_HINGE_MIN_ANGLE,
            max_angle: PI,
        }
    }
}

impl HingeHeuristic {
    #[must_use]
    pub fn matches(&self, bone_name: &str) -> bool {
        let lower = bone_name.to_lowercase();
        self.name_patterns
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
    }

    /// The constraint applied to matching bones.
    #[must_use]
    pub fn constraint(&self) -> ConstraintKind {
        ConstraintKind::hinge_x(self.min_angle, self.max_angle)
    }
}
