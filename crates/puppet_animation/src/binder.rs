use rustc_hash::FxHashMap;

use crate::clip::AnimationClip;
use crate::morph::MorphTarget;
use crate::skeleton::Skeleton;

/// Bone track `track` drives bone `bone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBinding {
    pub track: usize,
    pub bone: usize,
}

/// Morph track `track` drives morph offset `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphBinding {
    pub track: usize,
    pub offset: usize,
}

/// Name-resolved bindings of one clip to one model.
#[derive(Debug, Clone, Default)]
pub struct ClipBinding {
    pub nodes: Vec<NodeBinding>,
    pub morphs: Vec<MorphBinding>,
}

pub struct Binder;

impl Binder {
    /// Resolves the clip's track names against the model once, so the
    /// per-frame update works on indices only.
    ///
    /// Every bone whose name has a track is bound, duplicates included.
    /// Tracks naming bones or morphs the model lacks are skipped.
    #[must_use]
    pub fn bind(clip: &AnimationClip, skeleton: &Skeleton, morph: &MorphTarget) -> ClipBinding {
        let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
        for (track, node_track) in clip.node_tracks.iter().enumerate() {
            // Later tracks for the same bone win
            by_name.insert(node_track.bone_name.as_str(), track);
        }

        let nodes: Vec<NodeBinding> = skeleton
            .bones()
            .iter()
            .enumerate()
            .filter_map(|(bone, b)| {
                by_name
                    .get(b.name())
                    .map(|&track| NodeBinding { track, bone })
            })
            .collect();

        let mut morphs = Vec::with_capacity(clip.morph_tracks.len());
        for (track, morph_track) in clip.morph_tracks.iter().enumerate() {
            match morph.find_offset(&morph_track.morph_name) {
                Some(offset) => morphs.push(MorphBinding { track, offset }),
                None => log::debug!(
                    "Clip '{}': no morph named '{}', track skipped",
                    clip.name,
                    morph_track.morph_name
                ),
            }
        }

        for node_track in &clip.node_tracks {
            if skeleton.find_bone(&node_track.bone_name).is_none() {
                log::debug!(
                    "Clip '{}': no bone named '{}', track skipped",
                    clip.name,
                    node_track.bone_name
                );
            }
        }

        ClipBinding { nodes, morphs }
    }
}
