//! Animation graph node model.
//!
//! Nodes live in the graph's arena and are addressed by [`NodeKey`]. Every node
//! has a fixed number of [`InputSlot`]s, each either unbound, bound to another
//! node or bound to a variable. The node's outputs (pose, boolean, float) are
//! cached together with the frame they were computed on.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use smallvec::{SmallVec, smallvec};

use crate::clip::AnimationClip;
use crate::pose::SparsePose;
use crate::variables::VariableKey;

new_key_type! {
    pub struct NodeKey;
}

/// Input slot indices per node type.
pub mod inputs {
    /// [`NodeType::ClipSampler`](super::NodeType::ClipSampler)
    pub mod sampler {
        pub const CLIP: usize = 0;
        pub const SPEED: usize = 1;
        pub const LOOP: usize = 2;
    }

    /// [`NodeType::Blend`](super::NodeType::Blend) and
    /// [`NodeType::AdditiveBlend`](super::NodeType::AdditiveBlend).
    /// For additive blends `POSE_B` is the additive pose.
    pub mod blend {
        pub const POSE_A: usize = 0;
        pub const POSE_B: usize = 1;
        pub const WEIGHT: usize = 2;
    }

    /// [`NodeType::CalculateAdditive`](super::NodeType::CalculateAdditive)
    pub mod additive {
        pub const REFERENCE: usize = 0;
        pub const SOURCE: usize = 1;
    }

    /// [`NodeType::SelectPoseByBool`](super::NodeType::SelectPoseByBool)
    pub mod select {
        pub const FALSE_POSE: usize = 0;
        pub const TRUE_POSE: usize = 1;
        pub const CONDITION: usize = 2;
    }

    /// Boolean and float operators. Unary operators only use `LHS`.
    pub mod operator {
        pub const LHS: usize = 0;
        pub const RHS: usize = 1;
    }
}

/// Where a node input takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSlot {
    #[default]
    None,
    Node(NodeKey),
    Variable(VariableKey),
}

impl InputSlot {
    #[inline]
    #[must_use]
    pub fn node(self) -> Option<NodeKey> {
        match self {
            Self::Node(key) => Some(key),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn variable(self) -> Option<VariableKey> {
        match self {
            Self::Variable(key) => Some(key),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_bound(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// What a node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Pose,
    Bool,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
    Xor,
    Not,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl BoolOp {
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Not => 1,
            _ => 2,
        }
    }

    /// Comparisons read float inputs, the logic operators read booleans.
    #[must_use]
    pub fn compares_floats(self) -> bool {
        matches!(
            self,
            Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
                | Self::Equal
                | Self::NotEqual
        )
    }

    /// Logic operators. `rhs` is ignored by `Not`.
    #[must_use]
    pub fn apply_logic(self, lhs: bool, rhs: bool) -> bool {
        match self {
            Self::And => lhs && rhs,
            Self::Or => lhs || rhs,
            Self::Xor => lhs ^ rhs,
            Self::Not => !lhs,
            _ => false,
        }
    }

    #[must_use]
    pub fn apply_compare(self, lhs: f32, rhs: f32) -> bool {
        match self {
            Self::Less => lhs < rhs,
            Self::LessEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterEqual => lhs >= rhs,
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatOp {
    Add,
    Sub,
    Mul,
    /// Plain IEEE division: dividing by zero yields infinity or NaN.
    Div,
    Sin,
    Cos,
    ToRadians,
    ToDegrees,
}

impl FloatOp {
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div => 2,
            Self::Sin | Self::Cos | Self::ToRadians | Self::ToDegrees => 1,
        }
    }

    /// `rhs` is ignored by unary operators.
    #[must_use]
    pub fn apply(self, lhs: f32, rhs: f32) -> f32 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Sin => lhs.sin(),
            Self::Cos => lhs.cos(),
            Self::ToRadians => lhs.to_radians(),
            Self::ToDegrees => lhs.to_degrees(),
        }
    }
}

/// The node variants, without their runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    ClipSampler,
    Blend,
    AdditiveBlend,
    CalculateAdditive,
    SelectPoseByBool,
    Bool(BoolOp),
    Float(FloatOp),
}

impl NodeType {
    /// Number of input slots; fixed for the node's lifetime.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::ClipSampler | Self::Blend | Self::AdditiveBlend | Self::SelectPoseByBool => 3,
            Self::CalculateAdditive => 2,
            Self::Bool(op) => op.arity(),
            Self::Float(op) => op.arity(),
        }
    }

    #[must_use]
    pub fn output_type(self) -> OutputType {
        match self {
            Self::Bool(_) => OutputType::Bool,
            Self::Float(_) => OutputType::Float,
            _ => OutputType::Pose,
        }
    }
}

/// Playback state private to a clip sampler.
#[derive(Debug, Clone, Default)]
pub struct ClipSamplerState {
    /// Playback position in clip ticks.
    pub current_time: f32,
    /// Clip sampled on the previous evaluation; a different clip resets time.
    pub(crate) last_clip: Option<Arc<AnimationClip>>,
}

impl ClipSamplerState {
    #[must_use]
    pub fn last_clip(&self) -> Option<&Arc<AnimationClip>> {
        self.last_clip.as_ref()
    }

    /// Records `clip` as the current clip. Returns `true` (and rewinds) when it
    /// differs from the previous one.
    pub(crate) fn switch_clip(&mut self, clip: Option<&Arc<AnimationClip>>) -> bool {
        let same = match (&self.last_clip, clip) {
            (Some(last), Some(clip)) => Arc::ptr_eq(last, clip),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.current_time = 0.0;
            self.last_clip = clip.cloned();
        }
        !same
    }
}

/// Node variant plus its variant-specific state.
#[derive(Debug, Clone)]
pub enum NodeKind {
    ClipSampler(ClipSamplerState),
    Blend,
    AdditiveBlend,
    CalculateAdditive,
    SelectPoseByBool,
    Bool(BoolOp),
    Float(FloatOp),
}

impl From<NodeType> for NodeKind {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::ClipSampler => Self::ClipSampler(ClipSamplerState::default()),
            NodeType::Blend => Self::Blend,
            NodeType::AdditiveBlend => Self::AdditiveBlend,
            NodeType::CalculateAdditive => Self::CalculateAdditive,
            NodeType::SelectPoseByBool => Self::SelectPoseByBool,
            NodeType::Bool(op) => Self::Bool(op),
            NodeType::Float(op) => Self::Float(op),
        }
    }
}

impl NodeKind {
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::ClipSampler(_) => NodeType::ClipSampler,
            Self::Blend => NodeType::Blend,
            Self::AdditiveBlend => NodeType::AdditiveBlend,
            Self::CalculateAdditive => NodeType::CalculateAdditive,
            Self::SelectPoseByBool => NodeType::SelectPoseByBool,
            Self::Bool(op) => NodeType::Bool(*op),
            Self::Float(op) => NodeType::Float(*op),
        }
    }
}

/// A node of an animation graph with its input bindings and cached outputs.
#[derive(Debug, Clone)]
pub struct AnimNode {
    pub(crate) kind: NodeKind,
    pub(crate) inputs: SmallVec<[InputSlot; 3]>,
    pub(crate) pose: SparsePose,
    pub(crate) bool_result: bool,
    pub(crate) float_result: f32,
    pub(crate) last_computed_frame: u64,
    pub(crate) evaluations: u64,
}

impl AnimNode {
    #[must_use]
    pub fn new(node_type: NodeType) -> Self {
        Self {
            kind: node_type.into(),
            inputs: smallvec![InputSlot::None; node_type.arity()],
            pose: SparsePose::new(),
            bool_result: false,
            float_result: 0.0,
            last_computed_frame: 0,
            evaluations: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    #[inline]
    #[must_use]
    pub fn input(&self, index: usize) -> InputSlot {
        self.inputs.get(index).copied().unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Pose computed on the last evaluation; empty for operator nodes.
    #[inline]
    #[must_use]
    pub fn pose(&self) -> &SparsePose {
        &self.pose
    }

    /// Result of a boolean operator node.
    #[inline]
    #[must_use]
    pub fn bool_result(&self) -> bool {
        self.bool_result
    }

    /// Result of a float operator node.
    #[inline]
    #[must_use]
    pub fn float_result(&self) -> f32 {
        self.float_result
    }

    #[inline]
    #[must_use]
    pub fn last_computed_frame(&self) -> u64 {
        self.last_computed_frame
    }

    /// How many times this node's own computation has run.
    #[inline]
    #[must_use]
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations
    }

    #[must_use]
    pub fn clip_sampler(&self) -> Option<&ClipSamplerState> {
        match &self.kind {
            NodeKind::ClipSampler(state) => Some(state),
            _ => None,
        }
    }

    pub fn clip_sampler_mut(&mut self) -> Option<&mut ClipSamplerState> {
        match &mut self.kind {
            NodeKind::ClipSampler(state) => Some(state),
            _ => None,
        }
    }

    /// Copies this node's state and cache with a new set of input bindings.
    pub(crate) fn clone_with_inputs(&self, inputs: SmallVec<[InputSlot; 3]>) -> Self {
        debug_assert_eq!(inputs.len(), self.inputs.len());
        Self {
            kind: self.kind.clone(),
            inputs,
            pose: self.pose.clone(),
            bool_result: self.bool_result,
            float_result: self.float_result,
            last_computed_frame: self.last_computed_frame,
            evaluations: 0,
        }
    }
}
