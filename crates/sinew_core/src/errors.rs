//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! Evaluation (graph updates, pose algebra, finalization) never fails: missing
//! bindings degrade to documented defaults. [`SinewError`] only covers the
//! authoring surface:
//! - Graph editing (unknown handles, arity, cycles)
//! - Variable declaration and assignment
//! - Skeleton construction
//! - Graph description parsing and compilation
//!
//! # Usage
//!
//! ```rust,ignore
//! use sinew::core::errors::{SinewError, Result};
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Sinew engine.
#[derive(Error, Debug)]
pub enum SinewError {
    // ========================================================================
    // Graph Editing Errors
    // ========================================================================
    /// A node handle does not refer to a node of this graph.
    #[error("Unknown animation graph node")]
    UnknownNode,

    /// A node input index is outside the node's fixed arity.
    #[error("Input index {index} out of range (node arity: {arity})")]
    InputIndexOutOfRange {
        /// The requested input slot
        index: usize,
        /// Number of input slots of the node
        arity: usize,
    },

    /// Binding the input would make the node depend on itself.
    #[error("Binding would create a cycle in the animation graph")]
    CycleDetected,

    // ========================================================================
    // Variable Errors
    // ========================================================================
    /// No variable with the given name (or handle) exists.
    #[error("Unknown graph variable: {0}")]
    UnknownVariable(String),

    /// A variable with the given name was already declared.
    #[error("Graph variable already declared: {0}")]
    DuplicateVariable(String),

    /// Attempted to assign a value of a different type to a variable.
    #[error("Variable '{name}' has type {expected}, got {found}")]
    VariableTypeMismatch {
        /// Variable name (empty for node-local variables)
        name: String,
        /// Declared type
        expected: &'static str,
        /// Type of the rejected value
        found: &'static str,
    },

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// A bone named in the bone-offset table is missing from the hierarchy.
    #[error("Bone '{0}' is listed in the bone table but missing from the hierarchy")]
    MissingBone(String),

    /// A graph description references a clip that was not supplied.
    #[error("Unknown animation clip: {0}")]
    UnknownClip(String),

    // ========================================================================
    // Description Errors
    // ========================================================================
    /// The graph description is structurally invalid.
    #[error("Invalid graph description: {0}")]
    InvalidDescription(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, SinewError>`.
pub type Result<T> = std::result::Result<T, SinewError>;
