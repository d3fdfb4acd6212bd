//! Bone Graph
//!
//! Owns every bone of a character in a flat arena addressed by index and
//! propagates transforms from roots to leaves (forward kinematics).
//!
//! # Ordering
//!
//! Bones are stored in bone-list order and a bone's parent always has a
//! lower index. World matrices are written parent-first, so every update
//! reads an already refreshed parent matrix.

use glam::{Mat4, Quat, Vec3};
use puppet_core::LoadError;
use puppet_core::math::position_of;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::records::BoneRecord;

/// A joint of the skeleton with its local pose and cached matrices.
#[derive(Debug, Clone)]
pub struct Bone {
    name: String,
    parent: Option<usize>,
    children: SmallVec<[usize; 4]>,

    // === Local Pose ===
    pub translation: Vec3,
    pub rotation: Quat,

    // === Bind Data (fixed at load) ===
    /// Offset from the parent's head in the bind pose
    initial_translation: Vec3,
    /// Transforms model-space vertices into this bone's bind space
    inverse_bind_matrix: Mat4,

    // === Derived ===
    local_matrix: Mat4,
    world_matrix: Mat4,
}

impl Bone {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        parent: Option<usize>,
        initial_translation: Vec3,
        inverse_bind_matrix: Mat4,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            children: SmallVec::new(),
            translation: initial_translation,
            rotation: Quat::IDENTITY,
            initial_translation,
            inverse_bind_matrix,
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn initial_translation(&self) -> Vec3 {
        self.initial_translation
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrix(&self) -> &Mat4 {
        &self.inverse_bind_matrix
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Local matrix = translation × rotation.
    #[inline]
    pub fn update_local_matrix(&mut self) {
        self.local_matrix = Mat4::from_rotation_translation(self.rotation, self.translation);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub name: String,

    // Ordered bone list; bones[i] corresponds to joint i of the skinned mesh
    bones: Vec<Bone>,
    roots: Vec<usize>,
    name_to_index: FxHashMap<String, usize>,

    // Final matrices, refreshed by `compute_skinning_matrices`
    skinning_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Builds a skeleton from the loader's bone list.
    ///
    /// Each record's `bind_position` is in model space. The bind offset from
    /// the parent becomes the bone's initial translation, and the inverse
    /// bind matrix is the inverse of the bind position translation. The
    /// matrices are propagated once so the skeleton starts in bind pose.
    pub fn from_records(name: &str, records: &[BoneRecord]) -> Result<Self, LoadError> {
        let mut bones = Vec::with_capacity(records.len());
        let mut roots = Vec::new();
        let mut name_to_index = FxHashMap::default();

        for (index, record) in records.iter().enumerate() {
            let initial_translation = match record.parent {
                Some(parent) if parent >= index => {
                    return Err(LoadError::InvalidParent {
                        bone: index,
                        parent,
                    });
                }
                Some(parent) => record.bind_position - records[parent].bind_position,
                None => {
                    roots.push(index);
                    record.bind_position
                }
            };

            let inverse_bind = Mat4::from_translation(record.bind_position).inverse();
            bones.push(Bone::new(
                record.name.clone(),
                record.parent,
                initial_translation,
                inverse_bind,
            ));

            // Duplicate names resolve to the first bone
            name_to_index.entry(record.name.clone()).or_insert(index);
        }

        let links: Vec<(usize, usize)> = bones
            .iter()
            .enumerate()
            .filter_map(|(index, bone)| bone.parent.map(|parent| (parent, index)))
            .collect();
        for (parent, child) in links {
            bones[parent].children.push(child);
        }

        let count = bones.len();
        let mut skeleton = Self {
            name: name.to_string(),
            bones,
            roots,
            name_to_index,
            skinning_matrices: vec![Mat4::IDENTITY; count],
        };
        skeleton.update_all();
        skeleton.compute_skinning_matrices();

        log::debug!(
            "Skeleton '{}' built: {} bones, {} roots",
            skeleton.name,
            count,
            skeleton.roots.len()
        );

        Ok(skeleton)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[inline]
    pub fn bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    #[inline]
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Children of `index`, empty for leaves and unknown bones.
    #[inline]
    #[must_use]
    pub fn children(&self, index: usize) -> &[usize] {
        self.bones.get(index).map_or(&[][..], Bone::children)
    }

    /// Checks that `index` names a bone; `context` describes the reference.
    pub fn check_index(&self, index: usize, context: &str) -> Result<usize, LoadError> {
        if index < self.bones.len() {
            Ok(index)
        } else {
            Err(LoadError::BoneIndexOutOfRange {
                context: context.to_string(),
                index,
                count: self.bones.len(),
            })
        }
    }

    // ========================================================================
    // Forward Kinematics
    // ========================================================================

    pub fn update_local_matrix(&mut self, index: usize) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.update_local_matrix();
        }
    }

    /// Refreshes one bone's local and world matrix from its parent's current
    /// world matrix. The parent must already be up to date.
    pub fn update_world_matrix(&mut self, index: usize) {
        let Some(bone) = self.bones.get(index) else {
            return;
        };
        let parent_world = bone
            .parent
            .and_then(|p| self.bones.get(p))
            .map_or(Mat4::IDENTITY, |p| p.world_matrix);

        let bone = &mut self.bones[index];
        bone.update_local_matrix();
        bone.world_matrix = parent_world * bone.local_matrix;
    }

    /// Updates `root` and its whole subtree, parents before children.
    ///
    /// Uses an explicit stack instead of recursion so deep rigs cannot
    /// overflow the call stack.
    pub fn update_matrices(&mut self, root: usize) {
        let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
        stack.push(root);

        while let Some(index) = stack.pop() {
            self.update_world_matrix(index);

            let Some(bone) = self.bones.get(index) else {
                continue;
            };
            // Reverse push keeps siblings in declaration order
            stack.extend(bone.children.iter().rev().copied());
        }
    }

    /// Updates every root's subtree.
    pub fn update_all(&mut self) {
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.update_matrices(root);
        }
    }

    /// Restores the bind pose: initial translations and identity rotations.
    pub fn reset_pose(&mut self) {
        for bone in &mut self.bones {
            bone.translation = bone.initial_translation;
            bone.rotation = Quat::IDENTITY;
        }
        self.update_all();
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        self.bones.get(index).map(|b| position_of(&b.world_matrix))
    }

    // ========================================================================
    // Skinning
    // ========================================================================

    /// Skinning matrix of one bone: world × inverse bind.
    #[must_use]
    pub fn skinning_matrix(&self, index: usize) -> Option<Mat4> {
        self.bones
            .get(index)
            .map(|b| b.world_matrix * b.inverse_bind_matrix)
    }

    /// Recomputes the cached skinning matrix array from current world matrices.
    pub fn compute_skinning_matrices(&mut self) -> &[Mat4] {
        self.skinning_matrices.clear();
        self.skinning_matrices.extend(
            self.bones
                .iter()
                .map(|b| b.world_matrix * b.inverse_bind_matrix),
        );
        &self.skinning_matrices
    }

    /// Skinning matrices from the last `compute_skinning_matrices` call,
    /// indexed like the bone list.
    #[inline]
    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices
    }

    /// Raw bytes of the skinning matrices, ready for a buffer upload.
    #[inline]
    #[must_use]
    pub fn skinning_matrices_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.skinning_matrices)
    }
}
