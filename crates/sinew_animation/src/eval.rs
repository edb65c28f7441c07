//! Per-frame node evaluation.
//!
//! A node is computed at most once per frame: `update` returns immediately
//! when the node's cache is stamped with the current frame or a later one, so
//! a node shared by several parents is evaluated once. Inputs are pulled
//! depth-first; unbound or mistyped inputs read their documented default.

use std::sync::Arc;

use slotmap::SlotMap;

use crate::clip::AnimationClip;
use crate::node::{AnimNode, InputSlot, NodeKey, NodeKind, NodeType, OutputType, inputs};
use crate::pose::{self, SparsePose};
use crate::settings::AnimationSettings;
use crate::skeleton::Skeleton;
use crate::variables::VariableTable;

pub(crate) struct Evaluator<'a> {
    pub nodes: &'a mut SlotMap<NodeKey, AnimNode>,
    pub variables: &'a VariableTable,
    pub skeleton: &'a Skeleton,
    pub settings: &'a AnimationSettings,
    pub frame: u64,
    pub timestep: f32,
}

impl Evaluator<'_> {
    pub fn update(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if self.frame <= node.last_computed_frame {
            return;
        }

        match node.node_type() {
            NodeType::ClipSampler => self.update_clip_sampler(key),
            NodeType::Blend => self.update_blend(key, false),
            NodeType::AdditiveBlend => self.update_blend(key, true),
            NodeType::CalculateAdditive => self.update_calculate_additive(key),
            NodeType::SelectPoseByBool => self.update_select(key),
            NodeType::Bool(op) => {
                let lhs = inputs::operator::LHS;
                let rhs = inputs::operator::RHS;
                let result = if op.compares_floats() {
                    op.apply_compare(self.read_float(key, lhs, 0.0), self.read_float(key, rhs, 0.0))
                } else {
                    let a = self.read_bool(key, lhs, false);
                    let b = if op.arity() > 1 {
                        self.read_bool(key, rhs, false)
                    } else {
                        false
                    };
                    op.apply_logic(a, b)
                };
                self.nodes[key].bool_result = result;
            }
            NodeType::Float(op) => {
                let a = self.read_float(key, inputs::operator::LHS, 0.0);
                let b = if op.arity() > 1 {
                    self.read_float(key, inputs::operator::RHS, 0.0)
                } else {
                    0.0
                };
                self.nodes[key].float_result = op.apply(a, b);
            }
        }

        let node = &mut self.nodes[key];
        node.last_computed_frame = self.frame;
        node.evaluations += 1;
    }

    // ========================================================================
    // Input resolution
    // ========================================================================

    fn slot(&self, key: NodeKey, index: usize) -> InputSlot {
        self.nodes
            .get(key)
            .map_or(InputSlot::None, |node| node.input(index))
    }

    /// Child node bound at `index` if it produces `expected`.
    fn typed_child(&self, key: NodeKey, index: usize, expected: OutputType) -> Option<NodeKey> {
        let child = self.slot(key, index).node()?;
        let node = self.nodes.get(child)?;
        (node.node_type().output_type() == expected).then_some(child)
    }

    fn read_bool(&mut self, key: NodeKey, index: usize, default: bool) -> bool {
        match self.slot(key, index) {
            InputSlot::Node(_) => match self.typed_child(key, index, OutputType::Bool) {
                Some(child) => {
                    self.update(child);
                    self.nodes[child].bool_result
                }
                None => default,
            },
            InputSlot::Variable(var) => self
                .variables
                .get(var)
                .and_then(|var| var.value().as_bool())
                .unwrap_or(default),
            InputSlot::None => default,
        }
    }

    fn read_float(&mut self, key: NodeKey, index: usize, default: f32) -> f32 {
        match self.slot(key, index) {
            InputSlot::Node(_) => match self.typed_child(key, index, OutputType::Float) {
                Some(child) => {
                    self.update(child);
                    self.nodes[child].float_result
                }
                None => default,
            },
            InputSlot::Variable(var) => self
                .variables
                .get(var)
                .and_then(|var| var.value().as_float())
                .unwrap_or(default),
            InputSlot::None => default,
        }
    }

    /// Clip references only come from variables.
    fn read_clip(&self, key: NodeKey, index: usize) -> Option<Arc<AnimationClip>> {
        let var = self.slot(key, index).variable()?;
        self.variables.get(var)?.value().as_clip().cloned()
    }

    /// Evaluates the pose node bound at `index`, returning its key.
    fn pull_pose(&mut self, key: NodeKey, index: usize) -> Option<NodeKey> {
        let child = self.typed_child(key, index, OutputType::Pose)?;
        self.update(child);
        Some(child)
    }

    // ========================================================================
    // Pose nodes
    // ========================================================================

    fn update_clip_sampler(&mut self, key: NodeKey) {
        let clip = self.read_clip(key, inputs::sampler::CLIP);
        let speed = self.read_float(key, inputs::sampler::SPEED, 1.0);
        let looping = self.read_bool(key, inputs::sampler::LOOP, true);

        let AnimNode { kind, pose, .. } = &mut self.nodes[key];
        let NodeKind::ClipSampler(state) = kind else {
            return;
        };

        pose.clear();
        if state.switch_clip(clip.as_ref()) {
            log::debug!(
                "Clip sampler switched to {:?}, playback rewound",
                clip.as_ref().map(|clip| clip.name.as_str())
            );
        }

        let Some(clip) = clip else {
            state.current_time = 0.0;
            return;
        };

        if !clip.is_valid_time(state.current_time) {
            state.current_time = 0.0;
        }

        pose::sample_clip_into(&clip, self.skeleton.root(), state.current_time, pose);

        let ticks_per_second = self.settings.ticks_per_second(clip.ticks_per_second());
        let delta_ticks = ticks_per_second * self.timestep * speed;
        state.current_time = clip.step_time(state.current_time, delta_ticks, looping);
    }

    fn update_blend(&mut self, key: NodeKey, additive: bool) {
        let a = self.pull_pose(key, inputs::blend::POSE_A);
        let b = self.pull_pose(key, inputs::blend::POSE_B);
        let weight = self
            .read_float(key, inputs::blend::WEIGHT, 0.0)
            .clamp(0.0, 1.0);

        let result = match (a, b) {
            (Some(a), Some(b)) => {
                let (a, b) = (&self.nodes[a].pose, &self.nodes[b].pose);
                if additive {
                    pose::apply_additive(a, b, self.skeleton.root(), weight)
                } else {
                    pose::blend_poses(a, b, self.skeleton.root(), weight)
                }
            }
            _ => SparsePose::new(),
        };
        self.nodes[key].pose = result;
    }

    fn update_calculate_additive(&mut self, key: NodeKey) {
        let reference = self.pull_pose(key, inputs::additive::REFERENCE);
        let source = self.pull_pose(key, inputs::additive::SOURCE);

        let result = match (reference, source) {
            (Some(reference), Some(source)) => pose::calculate_additive(
                &self.nodes[reference].pose,
                &self.nodes[source].pose,
                self.skeleton.root(),
            ),
            _ => SparsePose::new(),
        };
        self.nodes[key].pose = result;
    }

    /// Only the selected branch is evaluated.
    fn update_select(&mut self, key: NodeKey) {
        let condition = self.read_bool(key, inputs::select::CONDITION, false);
        let branch = if condition {
            inputs::select::TRUE_POSE
        } else {
            inputs::select::FALSE_POSE
        };

        let result = self
            .pull_pose(key, branch)
            .map(|child| self.nodes[child].pose.clone())
            .unwrap_or_default();
        self.nodes[key].pose = result;
    }
}
