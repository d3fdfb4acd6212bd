//! Character
//!
//! One posable model: its skeleton, IK chains and morph target, plus the
//! currently assigned motion. This is the surface a host application drives
//! once per frame:
//!
//! 1. `advance_frame` (or `advance` through the playback clock),
//! 2. read back `skinning_matrices` and `vertex_positions` for upload.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use puppet_animation::{
    AnimationClip, AnimationRecord, Animator, AnimatorSettings, CcdSolver, IkChain, MorphTarget,
    Playback, SkeletonRecord, Skeleton,
};
use puppet_core::Result;
use puppet_core::math::sanitize_frame;

#[derive(Debug, Clone)]
pub struct Character {
    skeleton: Skeleton,
    ik_chains: Vec<IkChain>,
    morph: MorphTarget,

    // === Mesh ===
    /// Rest positions of every mesh vertex
    rest_vertices: Vec<Vec3>,
    /// Rest positions with the current morph blend applied
    vertex_positions: Vec<Vec3>,
    blend_scratch: Vec<Vec3>,

    // === Motion ===
    animator: Option<Animator>,
    pub playback: Playback,
    settings: AnimatorSettings,
    solver: CcdSolver,
    frame: f32,
}

impl Character {
    /// Builds a character from the model loader's output.
    ///
    /// Fails on malformed bone parents, IK references or morph indices. The
    /// character starts in bind pose with skinning matrices computed.
    pub fn load_skeleton(record: &SkeletonRecord, settings: AnimatorSettings) -> Result<Self> {
        let skeleton = Skeleton::from_records(&record.name, &record.bones)?;

        let ik_chains = record
            .iks
            .iter()
            .enumerate()
            .map(|(index, ik)| IkChain::from_record(index, ik, &skeleton, &settings.ik))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let morph = MorphTarget::from_record(&record.morph, record.vertices.len())?;

        log::info!(
            "Character '{}' loaded: {} bones, {} IK chains, {} morphs, {} vertices",
            record.name,
            skeleton.len(),
            ik_chains.len(),
            morph.offsets().len(),
            record.vertices.len()
        );

        let mut character = Self {
            solver: CcdSolver::from(&settings.ik),
            skeleton,
            ik_chains,
            morph,
            rest_vertices: record.vertices.clone(),
            vertex_positions: record.vertices.clone(),
            blend_scratch: Vec::new(),
            animator: None,
            playback: Playback::default(),
            settings,
            frame: 0.0,
        };
        character.update_vertex_positions();
        Ok(character)
    }

    /// Parses a JSON [`SkeletonRecord`] and loads it.
    pub fn from_json(json: &str, settings: AnimatorSettings) -> Result<Self> {
        let record: SkeletonRecord = serde_json::from_str(json)?;
        Self::load_skeleton(&record, settings)
    }

    /// Builds a clip from the animation loader's output and assigns it.
    ///
    /// Tracks naming bones or morphs this model lacks are skipped.
    pub fn load_animation(&mut self, record: &AnimationRecord) -> Result<Arc<AnimationClip>> {
        let clip = Arc::new(AnimationClip::from_record(record)?);
        self.set_clip(Arc::clone(&clip));
        Ok(clip)
    }

    pub fn load_animation_json(&mut self, json: &str) -> Result<Arc<AnimationClip>> {
        let record: AnimationRecord = serde_json::from_str(json)?;
        self.load_animation(&record)
    }

    /// Assigns an already built clip; clips can be shared between characters.
    /// The skeleton returns to bind pose and playback restarts at frame 0.
    pub fn set_clip(&mut self, clip: Arc<AnimationClip>) {
        self.skeleton.reset_pose();
        self.animator = Some(Animator::new(
            clip,
            &self.skeleton,
            &self.morph,
            self.settings.clone(),
        ));
        self.playback.seek(0.0);
    }

    pub fn clear_clip(&mut self) {
        self.animator = None;
    }

    /// Sets a morph weight by name; returns `false` if the model has no such
    /// morph. Visible after the next `advance_frame` or `refresh`. A track
    /// animating the same morph overrides it on the next frame.
    pub fn set_morph_weight(&mut self, name: &str, weight: f32) -> bool {
        let found = self.morph.set_weight_by_name(name, weight);
        if !found {
            log::debug!("Character '{}': no morph named '{name}'", self.skeleton.name);
        }
        found
    }

    // ========================================================================
    // Per-frame Update
    // ========================================================================

    /// Poses the character at `frame`: bone tracks, morph tracks, IK, morph
    /// blending and skinning matrices, in that order.
    ///
    /// Negative or NaN frames evaluate as frame 0.
    pub fn advance_frame(&mut self, frame: f32) {
        let frame = sanitize_frame(frame);
        self.frame = frame;

        if let Some(animator) = &mut self.animator {
            animator.update_animation(frame, &mut self.skeleton, &mut self.morph, &self.ik_chains);
        } else {
            self.skeleton.update_all();
            if self.settings.ik.enabled {
                self.solver.solve_all(&self.ik_chains, &mut self.skeleton);
            }
        }

        self.skeleton.compute_skinning_matrices();
        self.update_vertex_positions();
    }

    /// Advances the playback clock by `dt` seconds and poses the character
    /// at the resulting frame.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let frame = self.playback.advance(dt, self.frame_period());
        self.advance_frame(frame);
        frame
    }

    /// Recomputes matrices and vertices from the current pose and weights
    /// without sampling any track.
    pub fn refresh(&mut self) {
        self.skeleton.update_all();
        self.skeleton.compute_skinning_matrices();
        self.update_vertex_positions();
    }

    fn update_vertex_positions(&mut self) {
        if self.morph.is_empty() {
            return;
        }
        self.morph.compute_vertex_positions(&mut self.blend_scratch);
        self.vertex_positions.copy_from_slice(&self.rest_vertices);
        self.morph
            .scatter(&self.blend_scratch, &mut self.vertex_positions);
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// One matrix per bone, indexed like the bone list.
    #[inline]
    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        self.skeleton.skinning_matrices()
    }

    #[inline]
    #[must_use]
    pub fn skinning_matrices_bytes(&self) -> &[u8] {
        self.skeleton.skinning_matrices_bytes()
    }

    /// Full mesh positions with morphs applied.
    #[inline]
    #[must_use]
    pub fn vertex_positions(&self) -> &[Vec3] {
        &self.vertex_positions
    }

    #[inline]
    #[must_use]
    pub fn vertex_positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertex_positions)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.skeleton.name
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Mutable access for manual posing; call [`refresh`](Self::refresh)
    /// afterwards.
    #[inline]
    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn ik_chains(&self) -> &[IkChain] {
        &self.ik_chains
    }

    #[inline]
    #[must_use]
    pub fn morph(&self) -> &MorphTarget {
        &self.morph
    }

    #[inline]
    #[must_use]
    pub fn animator(&self) -> Option<&Animator> {
        self.animator.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimatorSettings {
        &self.settings
    }

    /// Frame most recently passed to `advance_frame`.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> f32 {
        self.frame
    }

    /// Loop length of the assigned clip, 0 without one.
    #[must_use]
    pub fn frame_period(&self) -> u32 {
        self.animator
            .as_ref()
            .map_or(0, |a| a.clip().frame_period())
    }
}
