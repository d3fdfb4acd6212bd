use glam::{Quat, Vec3};
use puppet_core::LoadError;
use puppet_core::math::{normalize_or_identity, sanitize_frame};

use crate::easing::BezierEase;

/// Maximum number of keys the cursor scans before falling back to a binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// A keyframe type that knows its frame number and how to blend toward the next key.
pub trait Keyframe {
    type Value;

    fn frame(&self) -> u32;

    /// The exact value of this key, used for degenerate segments.
    fn value(&self) -> Self::Value;

    /// Blends from `start` toward `end` at linear rate `rate` in `[0, 1]`.
    fn interpolate(start: &Self, end: &Self, rate: f32) -> Self::Value;
}

/// Bone keyframe: translation offset from the bind pose plus rotation, each
/// translation axis and the rotation eased by their own curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeKeyframe {
    pub frame: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub ease_x: BezierEase,
    pub ease_y: BezierEase,
    pub ease_z: BezierEase,
    pub ease_rotation: BezierEase,
}

impl NodeKeyframe {
    /// Creates a keyframe eased linearly on every channel.
    #[must_use]
    pub fn linear(frame: u32, translation: Vec3, rotation: Quat) -> Self {
        Self {
            frame,
            translation,
            rotation,
            ease_x: BezierEase::LINEAR,
            ease_y: BezierEase::LINEAR,
            ease_z: BezierEase::LINEAR,
            ease_rotation: BezierEase::LINEAR,
        }
    }
}

/// Sampled bone pose. `translation` does not yet include the bind offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSample {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Keyframe for NodeKeyframe {
    type Value = NodeSample;

    #[inline]
    fn frame(&self) -> u32 {
        self.frame
    }

    fn value(&self) -> NodeSample {
        NodeSample {
            translation: self.translation,
            rotation: normalize_or_identity(self.rotation),
        }
    }

    fn interpolate(start: &Self, end: &Self, rate: f32) -> NodeSample {
        // Easing curves always come from the segment's first key.
        let eased = Vec3::new(
            start.ease_x.ease(rate),
            start.ease_y.ease(rate),
            start.ease_z.ease(rate),
        );
        let eased_rotation = start.ease_rotation.ease(rate);

        NodeSample {
            translation: start.translation + (end.translation - start.translation) * eased,
            rotation: normalize_or_identity(start.rotation.slerp(end.rotation, eased_rotation)),
        }
    }
}

/// Morph weight keyframe, interpolated linearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphKeyframe {
    pub frame: u32,
    pub weight: f32,
}

impl Keyframe for MorphKeyframe {
    type Value = f32;

    #[inline]
    fn frame(&self) -> u32 {
        self.frame
    }

    #[inline]
    fn value(&self) -> f32 {
        self.weight
    }

    #[inline]
    fn interpolate(start: &Self, end: &Self, rate: f32) -> f32 {
        start.weight + (end.weight - start.weight) * rate
    }
}

/// The pair of keys bracketing a sampled frame.
///
/// `start` and `end` are the same key when the frame lies outside the
/// authored range or exactly on a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a, K> {
    pub start: &'a K,
    pub end: &'a K,
}

impl<'a, K: Keyframe> Segment<'a, K> {
    #[inline]
    fn single(key: &'a K) -> Self {
        Self {
            start: key,
            end: key,
        }
    }

    /// Number of frames spanned by the segment.
    #[inline]
    #[must_use]
    pub fn range(&self) -> u32 {
        self.end.frame().saturating_sub(self.start.frame())
    }

    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.range() == 0
    }

    /// Linear rate of `frame` within the segment, clamped to `[0, 1]`.
    #[must_use]
    pub fn rate(&self, frame: f32) -> f32 {
        let range = self.range();
        if range == 0 {
            return 0.0;
        }
        ((frame - self.start.frame() as f32) / range as f32).clamp(0.0, 1.0)
    }

    /// Samples the segment at `frame`. Degenerate segments return the key's
    /// exact value without interpolation.
    #[must_use]
    pub fn sample(&self, frame: f32) -> K::Value {
        if self.is_degenerate() {
            self.start.value()
        } else {
            K::interpolate(self.start, self.end, self.rate(frame))
        }
    }
}

/// Remembers the segment found by the previous lookup so that sequential
/// playback resolves in O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframes of one animated channel, sorted by frame with unique frame numbers.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<K> {
    keys: Vec<K>,
}

impl<K: Keyframe> KeyframeTrack<K> {
    /// Builds a track, sorting the keys by frame.
    ///
    /// `channel` names the animated bone or morph for error reporting.
    pub fn new(channel: &str, mut keys: Vec<K>) -> Result<Self, LoadError> {
        if keys.is_empty() {
            return Err(LoadError::EmptyTrack(channel.to_string()));
        }

        keys.sort_by_key(Keyframe::frame);

        if let Some(pair) = keys.windows(2).find(|w| w[0].frame() == w[1].frame()) {
            return Err(LoadError::DuplicateKeyframe {
                track: channel.to_string(),
                frame: pair[0].frame(),
            });
        }

        Ok(Self { keys })
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always `false`: empty tracks are rejected at construction.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn first_frame(&self) -> u32 {
        self.keys.first().map_or(0, Keyframe::frame)
    }

    #[inline]
    #[must_use]
    pub fn last_frame(&self) -> u32 {
        self.keys.last().map_or(0, Keyframe::frame)
    }

    #[inline]
    fn frame_at(&self, index: usize) -> f32 {
        self.keys[index].frame() as f32
    }

    /// Finds the segment bracketing `frame` with a binary search.
    #[must_use]
    pub fn find_segment(&self, frame: f32) -> Segment<'_, K> {
        let frame = sanitize_frame(frame);
        // partition_point finds the first key strictly after `frame`
        let next_idx = self.keys.partition_point(|k| k.frame() as f32 <= frame);
        if next_idx == 0 {
            return Segment::single(&self.keys[0]);
        }
        self.segment_at(next_idx - 1, frame)
    }

    /// Finds the segment bracketing `frame`, starting from the cursor.
    ///
    /// Scans a few keys forward or backward from the last hit and falls back
    /// to a binary search on large jumps. The result always equals
    /// [`find_segment`](Self::find_segment).
    pub fn find_segment_with_cursor(
        &self,
        frame: f32,
        cursor: &mut KeyframeCursor,
    ) -> Segment<'_, K> {
        let frame = sanitize_frame(frame);
        let len = self.keys.len();

        if len == 1 || frame < self.frame_at(0) {
            cursor.last_index = 0;
            return Segment::single(&self.keys[0]);
        }

        // A cursor from another clip may be out of bounds.
        let i = cursor.last_index.min(len - 1);

        let found = if frame >= self.frame_at(i) {
            // Forward: every visited index satisfies frame >= frame_at(idx)
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    res = Some(len - 1);
                    break;
                }
                if frame < self.frame_at(idx + 1) {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: every visited index satisfies frame < frame_at(idx + 1)
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if frame >= self.frame_at(idx) {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found.unwrap_or_else(|| {
            // frame >= first key here, so partition_point is at least 1
            self.keys.partition_point(|k| k.frame() as f32 <= frame) - 1
        });
        cursor.last_index = index;

        self.segment_at(index, frame)
    }

    /// `index` is the last key at or before `frame`.
    fn segment_at(&self, index: usize, frame: f32) -> Segment<'_, K> {
        let len = self.keys.len();
        if index >= len - 1 || self.frame_at(index) == frame {
            return Segment::single(&self.keys[index.min(len - 1)]);
        }
        Segment {
            start: &self.keys[index],
            end: &self.keys[index + 1],
        }
    }

    /// Samples the track at `frame` without a cursor.
    #[must_use]
    pub fn sample(&self, frame: f32) -> K::Value {
        self.find_segment(frame).sample(sanitize_frame(frame))
    }

    /// Samples the track at `frame`, updating `cursor`.
    pub fn sample_with_cursor(&self, frame: f32, cursor: &mut KeyframeCursor) -> K::Value {
        self.find_segment_with_cursor(frame, cursor)
            .sample(sanitize_frame(frame))
    }
}
