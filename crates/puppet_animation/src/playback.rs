//! Playback Clock
//!
//! Turns wall-clock time into the frame to sample. Animation data is authored
//! in frames; the clock runs at `frames_per_second` and honours the loop mode
//! against the clip's frame period.

use puppet_core::math::sanitize_frame;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAMES_PER_SECOND: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Play once, then stop and pause at the end (or at 0 when reversed).
    Once,
    #[default]
    Loop,
    /// Play forward then backward.
    PingPong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playback {
    frame: f32,
    pub frames_per_second: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            frame: 0.0,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            time_scale: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
        }
    }
}

impl Playback {
    #[must_use]
    pub fn new(loop_mode: LoopMode) -> Self {
        Self {
            loop_mode,
            ..Default::default()
        }
    }

    /// Current frame; never negative.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> f32 {
        self.frame
    }

    pub fn seek(&mut self, frame: f32) {
        self.frame = sanitize_frame(frame);
    }

    /// Moves by whole frames, ignoring pause. Stepping back stops at 0.
    pub fn step(&mut self, frames: i32) {
        self.frame = sanitize_frame(self.frame + frames as f32);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advances by `dt` seconds and returns the frame to sample.
    ///
    /// A zero `frame_period` (single-key or empty clip) pins the clock at 0.
    pub fn advance(&mut self, dt: f32, frame_period: u32) -> f32 {
        if self.paused || !dt.is_finite() {
            return self.frame;
        }

        let period = frame_period as f32;
        if period <= 0.0 {
            self.frame = 0.0;
            return self.frame;
        }

        let frame = self.frame + dt * self.frames_per_second * self.time_scale;

        self.frame = match self.loop_mode {
            LoopMode::Once => {
                if frame >= period {
                    self.paused = true;
                    period
                } else if frame < 0.0 {
                    self.paused = true;
                    0.0
                } else {
                    frame
                }
            }
            LoopMode::Loop => frame.rem_euclid(period),
            LoopMode::PingPong => {
                let t = frame.rem_euclid(period * 2.0);
                if t > period { period * 2.0 - t } else { t }
            }
        };
        self.frame = sanitize_frame(self.frame);
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_is_thirty_frames() {
        let mut playback = Playback::default();
        assert!((playback.advance(1.0, 100) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn paused_clock_holds() {
        let mut playback = Playback::default();
        playback.seek(12.0);
        playback.paused = true;
        assert_eq!(playback.advance(1.0, 100), 12.0);
    }
}
