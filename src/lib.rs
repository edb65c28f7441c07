//! # Sinew
//!
//! Skeletal animation graph evaluation.
//!
//! Every frame, an [`AnimationGraph`] samples keyframed clips, blends and
//! layers the resulting sparse poses, and finalizes them against a
//! [`Skeleton`] into the palette of bone matrices used to skin a mesh.
//!
//! This crate re-exports the member crates:
//!
//! - [`core`]: `Transform`, bone-name interning, errors
//! - [`animation`]: clips, pose algebra, skeletons, graphs, the animation system
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sinew::{AnimationGraph, NodeType, inputs};
//!
//! let mut graph = AnimationGraph::new(Arc::clone(&skeleton));
//! graph.declare_variable("walk", Arc::clone(&walk_clip))?;
//! let sampler = graph.add_node(NodeType::ClipSampler);
//! graph.set_input_named(sampler, inputs::sampler::CLIP, "walk")?;
//! graph.set_output(Some(sampler))?;
//!
//! let mut palette = Vec::new();
//! graph.update(1.0 / 60.0, &mut palette);
//! ```

pub use sinew_animation as animation;
pub use sinew_core as core;

pub use sinew_animation::{
    AnimNode, AnimationClip, AnimationDriver, AnimationGraph, AnimationInstance, AnimationSettings,
    AnimationSystem, BoneInfo, BoneNode, BoneTrack, BoolOp, ClipLibrary, ClipPlayer, FloatOp,
    GraphDescription, GraphVariable, InputSlot, InstanceKey, Keyframe, KeyframeTrack, NodeKey,
    NodeType, PaletteReader, Skeleton, SparsePose, VariableKey, VariableTable, VariableValue,
    inputs,
};
pub use sinew_core::{Result, SinewError, Symbol, Transform, interner};

/// Common imports for building and driving animation graphs.
pub mod prelude {
    pub use crate::animation::pose::{apply_additive, blend_poses, calculate_additive, sample_clip};
    pub use crate::animation::{
        AnimationClip, AnimationGraph, AnimationSystem, BoneNode, BoneTrack, Keyframe,
        KeyframeTrack, NodeType, Skeleton, inputs,
    };
    pub use crate::core::{Transform, interner::intern};
    pub use glam::{Mat4, Quat, Vec3};
}
