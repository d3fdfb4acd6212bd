//! Bezier Easing
//!
//! Keyframe channels remap their linear interpolation rate through a cubic
//! Bezier curve whose endpoints are pinned to `(0, 0)` and `(1, 1)`. Only the
//! two interior control points are authored, packed as `[x1, y1, x2, y2]`.
//!
//! Evaluating the ease is a monotone reparameterization, not a 2-D curve
//! evaluation: the curve parameter `t` is first recovered from the linear
//! rate by solving `Bx(t) = x`, then `By(t)` is returned.

use glam::Vec2;
use puppet_core::math::finite_or;

/// Newton-Raphson steps spent solving `Bx(t) = x`.
pub const NEWTON_ITERATIONS: usize = 32;

const NEWTON_TOLERANCE: f32 = 1e-7;
const MIN_SLOPE: f32 = 1e-6;

/// Quantization scale of the packed byte form found in keyframe files.
const BYTE_SCALE: f32 = 127.0;

/// Interior control points of an easing curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierEase {
    p1: Vec2,
    p2: Vec2,
}

impl BezierEase {
    /// The identity ease: `ease(x) == x`.
    pub const LINEAR: Self = Self {
        p1: Vec2::new(1.0 / 3.0, 1.0 / 3.0),
        p2: Vec2::new(2.0 / 3.0, 2.0 / 3.0),
    };

    /// Creates an ease from its two interior control points.
    ///
    /// X coordinates are clamped into `[0, 1]`, which keeps `Bx` monotone so
    /// the Newton solve is well defined. Y coordinates may overshoot.
    #[must_use]
    pub fn new(p1: Vec2, p2: Vec2) -> Self {
        let sanitize = |p: Vec2, fallback: f32| {
            Vec2::new(
                finite_or(p.x, fallback).clamp(0.0, 1.0),
                finite_or(p.y, fallback),
            )
        };
        let ease = Self {
            p1: sanitize(p1, 1.0 / 3.0),
            p2: sanitize(p2, 2.0 / 3.0),
        };
        if ease.p1 != p1 || ease.p2 != p2 {
            log::warn!("Bezier ease control points {p1:?}/{p2:?} sanitized to {:?}/{:?}", ease.p1, ease.p2);
        }
        ease
    }

    /// Creates an ease from a packed `[x1, y1, x2, y2]` descriptor.
    #[must_use]
    pub fn from_descriptor(descriptor: [f32; 4]) -> Self {
        let [x1, y1, x2, y2] = descriptor;
        Self::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    /// Decodes the 0..=127 quantized `[x1, y1, x2, y2]` form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::from_descriptor(bytes.map(|b| f32::from(b) / BYTE_SCALE))
    }

    #[inline]
    #[must_use]
    pub fn p1(&self) -> Vec2 {
        self.p1
    }

    #[inline]
    #[must_use]
    pub fn p2(&self) -> Vec2 {
        self.p2
    }

    /// Returns `true` when both control points lie on the diagonal, in which
    /// case the curve is exactly the identity.
    #[inline]
    #[must_use]
    pub fn is_linear(&self) -> bool {
        self.p1.x == self.p1.y && self.p2.x == self.p2.y
    }

    /// Maps a linear rate `x` in `[0, 1]` to the eased rate.
    #[must_use]
    pub fn ease(&self, x: f32) -> f32 {
        let x = finite_or(x, 0.0).clamp(0.0, 1.0);
        if self.is_linear() {
            return x;
        }
        let t = self.solve_parameter(x);
        finite_or(cubic(self.p1.y, self.p2.y, t), x)
    }

    /// Solves `Bx(t) = x` for `t` with Newton-Raphson starting at 0.5.
    ///
    /// `Bx` is monotone on `[0, 1]`, so every evaluation narrows a bracket
    /// around the root. Steps that would leave the bracket, or that start
    /// from a flat slope, bisect it instead.
    fn solve_parameter(&self, x: f32) -> f32 {
        let (a, b) = (self.p1.x, self.p2.x);
        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        let mut t = 0.5_f32;
        for _ in 0..NEWTON_ITERATIONS {
            let f = cubic(a, b, t) - x;
            if f.abs() < NEWTON_TOLERANCE {
                break;
            }
            if f > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            let slope = cubic_derivative(a, b, t);
            let newton = t - f / slope;
            t = if slope.abs() > MIN_SLOPE && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
        }
        if t.is_finite() { t } else { x }
    }
}

impl Default for BezierEase {
    fn default() -> Self {
        Self::LINEAR
    }
}

/// One axis of the pinned cubic: `3s²t·a + 3st²·b + t³` with `s = 1 - t`.
#[inline]
fn cubic(a: f32, b: f32, t: f32) -> f32 {
    let s = 1.0 - t;
    3.0 * s * s * t * a + 3.0 * s * t * t * b + t * t * t
}

#[inline]
fn cubic_derivative(a: f32, b: f32, t: f32) -> f32 {
    let s = 1.0 - t;
    3.0 * s * s * a + 6.0 * s * t * (b - a) + 3.0 * t * t * (1.0 - b)
}
