//! Math helpers shared by the Bone Graph, IK solver and easing.

use glam::{Mat4, Quat, Vec3};

/// Returns the translation column of a transform matrix.
#[inline]
#[must_use]
pub fn position_of(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

/// Returns `value` when it is finite, otherwise `fallback`.
#[inline]
#[must_use]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Normalizes a quaternion, falling back to identity for degenerate input.
#[inline]
#[must_use]
pub fn normalize_or_identity(rotation: Quat) -> Quat {
    let len_sq = rotation.length_squared();
    if len_sq.is_finite() && len_sq > f32::EPSILON {
        rotation * len_sq.sqrt().recip()
    } else {
        Quat::IDENTITY
    }
}

/// Clamps a requested frame into the playable range.
///
/// Negative and NaN frames map to 0; frames are never rejected.
#[inline]
#[must_use]
pub fn sanitize_frame(frame: f32) -> f32 {
    if frame.is_nan() || frame < 0.0 {
        0.0
    } else {
        frame
    }
}
