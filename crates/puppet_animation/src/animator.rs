//! Animator
//!
//! Drives one character for one frame, in a fixed order:
//!
//! 1. bone tracks are sampled and written as local poses, then the whole
//!    skeleton is propagated once (batched so no bone reads a stale parent),
//! 2. morph tracks are sampled into the morph weights,
//! 3. IK chains are solved in load order on top of the animated pose.

use std::sync::Arc;

use puppet_core::math::sanitize_frame;

use crate::binder::{Binder, ClipBinding};
use crate::clip::AnimationClip;
use crate::ik::{CcdSolver, IkChain};
use crate::morph::MorphTarget;
use crate::settings::AnimatorSettings;
use crate::skeleton::Skeleton;
use crate::tracks::KeyframeCursor;

#[derive(Debug, Clone)]
pub struct Animator {
    clip: Arc<AnimationClip>,
    binding: ClipBinding,

    node_cursors: Vec<KeyframeCursor>,
    morph_cursors: Vec<KeyframeCursor>,

    solver: CcdSolver,
    settings: AnimatorSettings,
}

impl Animator {
    /// Binds `clip` to a model. Clips are shared, so one motion can drive
    /// many characters.
    #[must_use]
    pub fn new(
        clip: Arc<AnimationClip>,
        skeleton: &Skeleton,
        morph: &MorphTarget,
        settings: AnimatorSettings,
    ) -> Self {
        let binding = Binder::bind(&clip, skeleton, morph);
        log::info!(
            "Animation '{}' bound: {}/{} bone tracks, {}/{} morph tracks",
            clip.name,
            binding.nodes.len(),
            clip.node_tracks.len(),
            binding.morphs.len(),
            clip.morph_tracks.len()
        );

        Self {
            node_cursors: vec![KeyframeCursor::default(); clip.node_tracks.len()],
            morph_cursors: vec![KeyframeCursor::default(); clip.morph_tracks.len()],
            solver: CcdSolver::from(&settings.ik),
            clip,
            binding,
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn binding(&self) -> &ClipBinding {
        &self.binding
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimatorSettings {
        &self.settings
    }

    /// Runs the full per-frame update at `frame`.
    pub fn update_animation(
        &mut self,
        frame: f32,
        skeleton: &mut Skeleton,
        morph: &mut MorphTarget,
        ik_chains: &[IkChain],
    ) {
        let frame = sanitize_frame(frame);

        if self.settings.node_animation {
            self.update_node_animation(frame, skeleton);
        } else {
            skeleton.update_all();
        }
        if self.settings.morph_animation {
            self.update_morph_animation(frame, morph);
        }
        if self.settings.ik.enabled {
            self.update_ik_chains(skeleton, ik_chains);
        }
    }

    /// Writes every bound bone's pose at `frame`, then propagates the
    /// skeleton once.
    pub fn update_node_animation(&mut self, frame: f32, skeleton: &mut Skeleton) {
        for binding in &self.binding.nodes {
            let track = &self.clip.node_tracks[binding.track].track;
            let cursor = &mut self.node_cursors[binding.track];
            let sample = track.sample_with_cursor(frame, cursor);

            if let Some(bone) = skeleton.bone_mut(binding.bone) {
                bone.translation = sample.translation + bone.initial_translation();
                bone.rotation = sample.rotation;
            }
        }

        skeleton.update_all();
    }

    pub fn update_morph_animation(&mut self, frame: f32, morph: &mut MorphTarget) {
        for binding in &self.binding.morphs {
            let track = &self.clip.morph_tracks[binding.track].track;
            let cursor = &mut self.morph_cursors[binding.track];
            let weight = track.sample_with_cursor(frame, cursor);
            morph.set_weight(binding.offset, weight);
        }
    }

    pub fn update_ik_chains(&self, skeleton: &mut Skeleton, ik_chains: &[IkChain]) {
        self.solver.solve_all(ik_chains, skeleton);
    }
}
