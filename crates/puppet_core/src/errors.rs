//! Error Types
//!
//! This module defines the error types used throughout the workspace.
//!
//! # Overview
//!
//! Only loading can fail. Once a character has been built from decoded
//! records, every per-frame operation is infallible:
//!
//! - [`LoadError`]: malformed bone, IK, keyframe or morph data. Fatal, and
//!   always reported before the first frame is evaluated.
//! - [`PuppetError`]: the umbrella error returned by public loading APIs,
//!   wrapping [`LoadError`] and record deserialization failures.
//!
//! Tracks that name bones or morphs absent from the model are not errors;
//! they are skipped at bind time. Numeric loops that exhaust their iteration
//! budget are not errors either; the best approximation is kept.
//!
//! # Usage
//!
//! ```rust,ignore
//! use puppet_core::errors::{LoadError, Result};
//!
//! fn check_parent(index: usize, parent: usize) -> Result<()> {
//!     if parent >= index {
//!         return Err(LoadError::InvalidParent { bone: index, parent }.into());
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Malformed input detected while building a skeleton, animation or morph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    // ========================================================================
    // Bone Graph
    // ========================================================================
    /// A bone references a parent that does not appear before it.
    #[error("Bone {bone} references invalid parent {parent}")]
    InvalidParent {
        /// Index of the offending bone
        bone: usize,
        /// The parent index it referenced
        parent: usize,
    },

    /// An index that should name a bone is outside the bone list.
    #[error("Bone index out of range: {context} (index: {index}, bone count: {count})")]
    BoneIndexOutOfRange {
        /// Description of what was being resolved
        context: String,
        /// The invalid index
        index: usize,
        /// Number of bones in the skeleton
        count: usize,
    },

    // ========================================================================
    // IK
    // ========================================================================
    /// An IK chain has no links to rotate.
    #[error("IK chain {chain} has no links")]
    EmptyIkChain {
        /// Position of the chain in the IK list
        chain: usize,
    },

    // ========================================================================
    // Keyframe Tracks
    // ========================================================================
    /// A keyframe track contains no keyframes.
    #[error("Keyframe track '{0}' is empty")]
    EmptyTrack(String),

    /// A keyframe track contains two keys on the same frame.
    #[error("Keyframe track '{track}' has duplicate keys on frame {frame}")]
    DuplicateKeyframe {
        /// Name of the animated channel
        track: String,
        /// The repeated frame number
        frame: u32,
    },

    // ========================================================================
    // Morph Targets
    // ========================================================================
    /// A morph index points outside the list it addresses.
    #[error("Morph index out of range: {context} (index: {index}, len: {len})")]
    MorphIndexOutOfRange {
        /// Description of what was being resolved
        context: String,
        /// The invalid index
        index: usize,
        /// Length of the addressed list
        len: usize,
    },

    /// Parallel index/value lists of a morph have different lengths.
    #[error("Morph '{name}' has {indices} indices but {values} values")]
    MorphLengthMismatch {
        /// Name of the base shape or offset
        name: String,
        /// Number of vertex indices
        indices: usize,
        /// Number of positions or displacements
        values: usize,
    },
}

/// The main error type for Puppet loading APIs.
#[derive(Error, Debug)]
pub enum PuppetError {
    /// Decoded data failed validation.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A JSON record could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, PuppetError>`.
pub type Result<T> = std::result::Result<T, PuppetError>;
