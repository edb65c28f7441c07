//! Sinew Animation
//!
//! Skeletal animation graph runtime: keyframe tracks and clips, the sparse
//! pose algebra, skeleton finalization into skinning palettes, and the
//! animation graph with its variables, nodes and per-instance cloning.

mod eval;
mod values;

pub mod clip;
pub mod description;
pub mod graph;
pub mod node;
pub mod player;
pub mod pose;
pub mod settings;
pub mod skeleton;
pub mod system;
pub mod tracks;
pub mod variables;

pub use clip::{AnimationClip, BoneTrack};
pub use description::{ClipLibrary, GraphDescription, InputDesc, NodeDesc, ValueDesc, VariableDesc};
pub use graph::AnimationGraph;
pub use node::{AnimNode, BoolOp, FloatOp, InputSlot, NodeKey, NodeType, OutputType, inputs};
pub use player::ClipPlayer;
pub use pose::{SparsePose, apply_additive, blend_poses, calculate_additive, sample_clip};
pub use settings::AnimationSettings;
pub use skeleton::{BoneInfo, BoneNode, Skeleton};
pub use system::{AnimationDriver, AnimationInstance, AnimationSystem, InstanceKey, PaletteReader};
pub use tracks::{Keyframe, KeyframeTrack};
pub use values::Interpolatable;
pub use variables::{GraphVariable, VariableKey, VariableTable, VariableType, VariableValue};
