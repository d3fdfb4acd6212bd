//! Morph Blending
//!
//! A morph target is a sparse set of named vertex offsets layered over a
//! base shape. The base shape lists every mesh vertex any morph touches;
//! offsets address vertices through the base shape's index space.
//!
//! Blending is recomputed from scratch each call. Weights may change
//! arbitrarily between frames, so no state accumulates across calls.

use glam::Vec3;
use puppet_core::LoadError;
use rustc_hash::FxHashMap;

use crate::records::MorphRecord;

#[derive(Debug, Clone)]
pub struct MorphOffset {
    pub name: String,
    /// Indices into the base shape
    indices: Vec<u32>,
    displacements: Vec<Vec3>,
}

impl MorphOffset {
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn displacements(&self) -> &[Vec3] {
        &self.displacements
    }
}

#[derive(Debug, Clone, Default)]
pub struct MorphTarget {
    // === Base Shape ===
    /// Mesh vertex index of each base-shape entry
    base_indices: Vec<u32>,
    base_positions: Vec<Vec3>,

    offsets: Vec<MorphOffset>,
    name_to_index: FxHashMap<String, usize>,

    // === Per-frame State ===
    weights: Vec<f32>,
}

impl MorphTarget {
    /// Builds a morph target from decoded data.
    ///
    /// `vertex_count` is the full mesh size; base-shape indices must address it.
    pub fn from_record(record: &MorphRecord, vertex_count: usize) -> Result<Self, LoadError> {
        let base = &record.base;
        if base.vertex_indices.len() != base.positions.len() {
            return Err(LoadError::MorphLengthMismatch {
                name: "base".to_string(),
                indices: base.vertex_indices.len(),
                values: base.positions.len(),
            });
        }
        if let Some(&index) = base.vertex_indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(LoadError::MorphIndexOutOfRange {
                context: "base shape vertex".to_string(),
                index: index as usize,
                len: vertex_count,
            });
        }

        let base_len = base.vertex_indices.len();
        let mut offsets = Vec::with_capacity(record.offsets.len());
        let mut name_to_index = FxHashMap::default();

        for (i, offset) in record.offsets.iter().enumerate() {
            if offset.vertex_indices.len() != offset.displacements.len() {
                return Err(LoadError::MorphLengthMismatch {
                    name: offset.name.clone(),
                    indices: offset.vertex_indices.len(),
                    values: offset.displacements.len(),
                });
            }
            if let Some(&index) = offset.vertex_indices.iter().find(|&&v| v as usize >= base_len) {
                return Err(LoadError::MorphIndexOutOfRange {
                    context: format!("offset '{}'", offset.name),
                    index: index as usize,
                    len: base_len,
                });
            }

            name_to_index.entry(offset.name.clone()).or_insert(i);
            offsets.push(MorphOffset {
                name: offset.name.clone(),
                indices: offset.vertex_indices.clone(),
                displacements: offset.displacements.clone(),
            });
        }

        let weights = vec![0.0; offsets.len()];
        Ok(Self {
            base_indices: base.vertex_indices.clone(),
            base_positions: base.positions.clone(),
            offsets,
            name_to_index,
            weights,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base_indices.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn offsets(&self) -> &[MorphOffset] {
        &self.offsets
    }

    #[inline]
    #[must_use]
    pub fn base_indices(&self) -> &[u32] {
        &self.base_indices
    }

    #[inline]
    #[must_use]
    pub fn find_offset(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    // ========================================================================
    // Weights
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    #[must_use]
    pub fn weight(&self, name: &str) -> Option<f32> {
        self.find_offset(name).map(|i| self.weights[i])
    }

    /// Returns `false` when `index` names no offset.
    pub fn set_weight(&mut self, index: usize, weight: f32) -> bool {
        match self.weights.get_mut(index) {
            Some(w) => {
                *w = weight;
                true
            }
            None => false,
        }
    }

    /// Returns `false` when no offset is called `name`.
    pub fn set_weight_by_name(&mut self, name: &str, weight: f32) -> bool {
        self.find_offset(name)
            .is_some_and(|i| self.set_weight(i, weight))
    }

    pub fn reset_weights(&mut self) {
        self.weights.fill(0.0);
    }

    // ========================================================================
    // Blending
    // ========================================================================

    /// Writes the blended positions of the base-shape vertices into `out`,
    /// one entry per base-shape vertex.
    pub fn compute_vertex_positions(&self, out: &mut Vec<Vec3>) {
        out.clear();
        out.extend_from_slice(&self.base_positions);

        for (offset, &weight) in self.offsets.iter().zip(&self.weights) {
            if weight == 0.0 {
                continue;
            }
            for (&index, &displacement) in offset.indices.iter().zip(&offset.displacements) {
                if let Some(position) = out.get_mut(index as usize) {
                    *position += displacement * weight;
                }
            }
        }
    }

    /// Copies base-shape positions produced by
    /// [`compute_vertex_positions`](Self::compute_vertex_positions) into the
    /// full mesh array. Vertices outside the base shape are left untouched.
    pub fn scatter(&self, blended: &[Vec3], mesh_positions: &mut [Vec3]) {
        for (&mesh_index, &position) in self.base_indices.iter().zip(blended) {
            if let Some(dst) = mesh_positions.get_mut(mesh_index as usize) {
                *dst = position;
            }
        }
    }
}
