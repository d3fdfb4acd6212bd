use puppet_core::LoadError;

use crate::easing::BezierEase;
use crate::records::{AnimationRecord, MorphTrackRecord, NodeTrackRecord};
use crate::tracks::{KeyframeTrack, MorphKeyframe, NodeKeyframe};

/// Keyframes driving one bone, matched to the model by bone name.
#[derive(Debug, Clone)]
pub struct NodeTrack {
    pub bone_name: String,
    pub track: KeyframeTrack<NodeKeyframe>,
}

impl NodeTrack {
    pub fn from_record(record: &NodeTrackRecord) -> Result<Self, LoadError> {
        let keys = record
            .keyframes
            .iter()
            .map(|k| NodeKeyframe {
                frame: k.frame,
                translation: k.translation,
                rotation: k.rotation,
                ease_x: BezierEase::from_descriptor(k.bezier_x),
                ease_y: BezierEase::from_descriptor(k.bezier_y),
                ease_z: BezierEase::from_descriptor(k.bezier_z),
                ease_rotation: BezierEase::from_descriptor(k.bezier_rotation),
            })
            .collect();

        Ok(Self {
            bone_name: record.bone_name.clone(),
            track: KeyframeTrack::new(&record.bone_name, keys)?,
        })
    }
}

/// Keyframes driving one morph weight, matched to the model by morph name.
#[derive(Debug, Clone)]
pub struct MorphTrack {
    pub morph_name: String,
    pub track: KeyframeTrack<MorphKeyframe>,
}

impl MorphTrack {
    pub fn from_record(record: &MorphTrackRecord) -> Result<Self, LoadError> {
        let keys = record
            .keyframes
            .iter()
            .map(|k| MorphKeyframe {
                frame: k.frame,
                weight: k.weight,
            })
            .collect();

        Ok(Self {
            morph_name: record.morph_name.clone(),
            track: KeyframeTrack::new(&record.morph_name, keys)?,
        })
    }
}

/// A complete motion: bone and morph tracks, immutable after load.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub node_tracks: Vec<NodeTrack>,
    pub morph_tracks: Vec<MorphTrack>,
    frame_period: u32,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: String, node_tracks: Vec<NodeTrack>, morph_tracks: Vec<MorphTrack>) -> Self {
        let frame_period = node_tracks
            .iter()
            .map(|t| t.track.last_frame())
            .chain(morph_tracks.iter().map(|t| t.track.last_frame()))
            .max()
            .unwrap_or(0);

        Self {
            name,
            node_tracks,
            morph_tracks,
            frame_period,
        }
    }

    pub fn from_record(record: &AnimationRecord) -> Result<Self, LoadError> {
        let node_tracks = record
            .node_tracks
            .iter()
            .map(NodeTrack::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        let morph_tracks = record
            .morph_tracks
            .iter()
            .map(MorphTrack::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(record.name.clone(), node_tracks, morph_tracks))
    }

    /// Last keyframe frame across every track; the playback loop length.
    #[inline]
    #[must_use]
    pub fn frame_period(&self) -> u32 {
        self.frame_period
    }
}
