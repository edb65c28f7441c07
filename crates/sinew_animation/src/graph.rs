//! Animation Graph
//!
//! The runtime form of an authored animation graph: a node arena, the
//! designated output node, the variable table and the target skeleton.
//!
//! # Evaluation
//!
//! [`AnimationGraph::update`] advances the graph's frame counter, evaluates the
//! output node (which pulls its inputs depth-first, each node at most once per
//! frame) and finalizes the resulting sparse pose against the skeleton into a
//! matrix palette. A graph without an output node produces the bind pose.
//!
//! # Instancing
//!
//! Graphs carry mutable playback state (clip sampler times, cached poses), so
//! every animated entity needs its own copy. [`AnimationGraph::clone_graph`]
//! deep-copies the output subgraph and gives the copy independent variable
//! storage while keeping variables shared between nodes shared in the copy.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use sinew_core::{Result, SinewError};

use crate::eval::Evaluator;
use crate::node::{AnimNode, InputSlot, NodeKey, NodeType};
use crate::pose::SparsePose;
use crate::settings::AnimationSettings;
use crate::skeleton::Skeleton;
use crate::variables::{GraphVariable, VariableKey, VariableTable, VariableValue};

#[derive(Debug, Clone)]
pub struct AnimationGraph {
    skeleton: Arc<Skeleton>,
    nodes: SlotMap<NodeKey, AnimNode>,
    output: Option<NodeKey>,
    variables: VariableTable,
    settings: AnimationSettings,
    frame: u64,
}

impl AnimationGraph {
    #[must_use]
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        Self::with_settings(skeleton, AnimationSettings::default())
    }

    #[must_use]
    pub fn with_settings(skeleton: Arc<Skeleton>, settings: AnimationSettings) -> Self {
        Self {
            skeleton,
            nodes: SlotMap::with_key(),
            output: None,
            variables: VariableTable::new(),
            settings,
            frame: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn output(&self) -> Option<NodeKey> {
        self.output
    }

    #[inline]
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&AnimNode> {
        self.nodes.get(key)
    }

    /// Mutable node access, for editing variant state such as a clip
    /// sampler's playback time.
    #[inline]
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut AnimNode> {
        self.nodes.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &AnimNode)> {
        self.nodes.iter()
    }

    #[inline]
    #[must_use]
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    #[inline]
    pub fn variables_mut(&mut self) -> &mut VariableTable {
        &mut self.variables
    }

    /// Frame counter, incremented by every evaluation.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Pose computed by the output node on the last evaluation.
    #[must_use]
    pub fn output_pose(&self) -> Option<&SparsePose> {
        self.output
            .and_then(|key| self.nodes.get(key))
            .map(AnimNode::pose)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    pub fn add_node(&mut self, node_type: NodeType) -> NodeKey {
        self.nodes.insert(AnimNode::new(node_type))
    }

    /// Sets the node producing the graph's final pose.
    pub fn set_output(&mut self, node: Option<NodeKey>) -> Result<()> {
        if let Some(key) = node {
            self.nodes.get(key).ok_or(SinewError::UnknownNode)?;
        }
        self.output = node;
        Ok(())
    }

    /// Binds input `index` of `node` to the output of `child`, clearing any
    /// variable binding of that slot.
    pub fn set_input_node(&mut self, node: NodeKey, index: usize, child: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(child) {
            return Err(SinewError::UnknownNode);
        }
        self.check_slot(node, index)?;
        if self.depends_on(child, node) {
            return Err(SinewError::CycleDetected);
        }
        self.nodes[node].inputs[index] = InputSlot::Node(child);
        Ok(())
    }

    /// Binds input `index` of `node` to a variable, clearing any node binding
    /// of that slot.
    pub fn set_input_variable(
        &mut self,
        node: NodeKey,
        index: usize,
        variable: VariableKey,
    ) -> Result<()> {
        if !self.variables.contains(variable) {
            return Err(SinewError::UnknownVariable(format!("{variable:?}")));
        }
        self.check_slot(node, index)?;
        self.nodes[node].inputs[index] = InputSlot::Variable(variable);
        Ok(())
    }

    /// Binds input `index` of `node` to the named variable.
    pub fn set_input_named(&mut self, node: NodeKey, index: usize, name: &str) -> Result<()> {
        let variable = self
            .variables
            .key(name)
            .ok_or_else(|| SinewError::UnknownVariable(name.to_owned()))?;
        self.set_input_variable(node, index, variable)
    }

    /// Binds input `index` of `node` to a new node-local variable holding `value`.
    pub fn set_input_value(
        &mut self,
        node: NodeKey,
        index: usize,
        value: impl Into<VariableValue>,
    ) -> Result<VariableKey> {
        self.check_slot(node, index)?;
        let variable = self.add_local_variable(value);
        self.nodes[node].inputs[index] = InputSlot::Variable(variable);
        Ok(variable)
    }

    pub fn clear_input(&mut self, node: NodeKey, index: usize) -> Result<()> {
        self.check_slot(node, index)?;
        self.nodes[node].inputs[index] = InputSlot::None;
        Ok(())
    }

    /// Unbinds every input of `node`.
    pub fn reset_inputs(&mut self, node: NodeKey) -> Result<()> {
        let node = self.nodes.get_mut(node).ok_or(SinewError::UnknownNode)?;
        node.inputs.fill(InputSlot::None);
        Ok(())
    }

    pub fn declare_variable(
        &mut self,
        name: &str,
        value: impl Into<VariableValue>,
    ) -> Result<VariableKey> {
        self.variables.declare(name, value)
    }

    /// Adds an unnamed variable, bindable by a single node input.
    pub fn add_local_variable(&mut self, value: impl Into<VariableValue>) -> VariableKey {
        self.variables.add_local(value)
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&GraphVariable> {
        self.variables.by_name(name)
    }

    pub fn set_variable(&mut self, name: &str, value: impl Into<VariableValue>) -> Result<()> {
        self.variables.set(name, value)
    }

    /// Drops every node, the output binding and every variable. The frame
    /// counter keeps running.
    pub fn reset(&mut self) {
        self.output = None;
        self.nodes.clear();
        self.variables.clear();
    }

    fn check_slot(&self, node: NodeKey, index: usize) -> Result<()> {
        let arity = self.nodes.get(node).ok_or(SinewError::UnknownNode)?.arity();
        if index >= arity {
            return Err(SinewError::InputIndexOutOfRange { index, arity });
        }
        Ok(())
    }

    /// Whether `from` reaches `target` through node bindings.
    fn depends_on(&self, from: NodeKey, target: NodeKey) -> bool {
        let mut stack = vec![from];
        let mut visited = rustc_hash::FxHashSet::default();
        while let Some(key) = stack.pop() {
            if key == target {
                return true;
            }
            if !visited.insert(key) {
                continue;
            }
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.inputs.iter().filter_map(|slot| slot.node()));
            }
        }
        false
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Advances one frame and evaluates the output node.
    ///
    /// Returns the output pose, or `None` when no output node is set.
    pub fn evaluate(&mut self, timestep: f32) -> Option<&SparsePose> {
        self.frame += 1;

        let Some(output) = self.output else {
            log::trace!("Animation graph has no output node, using bind pose");
            return None;
        };

        Evaluator {
            nodes: &mut self.nodes,
            variables: &self.variables,
            skeleton: &self.skeleton,
            settings: &self.settings,
            frame: self.frame,
            timestep,
        }
        .update(output);

        self.nodes.get(output).map(AnimNode::pose)
    }

    /// Evaluates the graph and writes the skinning palette into `out`,
    /// using the graph's own `root_transform` setting as the root parent.
    pub fn update(&mut self, timestep: f32, out: &mut Vec<Mat4>) {
        let root_transform = self.settings.root_transform;
        self.update_with_root(timestep, root_transform, out);
    }

    /// Like [`update`](Self::update) with an explicit root parent transform.
    pub fn update_with_root(&mut self, timestep: f32, root_transform: Mat4, out: &mut Vec<Mat4>) {
        let skeleton = Arc::clone(&self.skeleton);
        match self.evaluate(timestep) {
            Some(pose) => skeleton.finalize_pose(pose, root_transform, out),
            None => skeleton.finalize_bind_pose(root_transform, out),
        }
    }

    // ========================================================================
    // Cloning
    // ========================================================================

    /// Deep-copies the graph for a new instance.
    ///
    /// The copy gets its own copies of all named variables. Only nodes
    /// reachable from the output node are copied.
    #[must_use]
    pub fn clone_graph(&self) -> Self {
        self.clone_with_variables(self.variables.copy_named())
    }

    /// Deep-copies the output subgraph, binding variable inputs by name
    /// against `variables`.
    ///
    /// A named variable missing from `variables` is copied into it; node-local
    /// variables are always copied. Nodes that shared one variable in the
    /// source share one variable in the copy.
    #[must_use]
    pub fn clone_with_variables(&self, variables: VariableTable) -> Self {
        let mut cloner = GraphCloner {
            source: self,
            nodes: SlotMap::with_key(),
            variables,
            node_map: FxHashMap::default(),
            variable_map: FxHashMap::default(),
        };
        let output = self.output.map(|key| cloner.clone_node(key));

        log::debug!(
            "Animation graph cloned: {} of {} nodes, {} variables",
            cloner.nodes.len(),
            self.nodes.len(),
            cloner.variables.len()
        );

        Self {
            skeleton: Arc::clone(&self.skeleton),
            nodes: cloner.nodes,
            output,
            variables: cloner.variables,
            settings: self.settings.clone(),
            frame: self.frame,
        }
    }
}

/// Walks the source graph from its output node, rebuilding nodes and
/// variable bindings in a fresh arena.
struct GraphCloner<'a> {
    source: &'a AnimationGraph,
    nodes: SlotMap<NodeKey, AnimNode>,
    variables: VariableTable,
    node_map: FxHashMap<NodeKey, NodeKey>,
    variable_map: FxHashMap<VariableKey, VariableKey>,
}

impl GraphCloner<'_> {
    fn clone_node(&mut self, key: NodeKey) -> NodeKey {
        if let Some(&cloned) = self.node_map.get(&key) {
            return cloned;
        }

        let graph = self.source;
        let source = &graph.nodes[key];
        let inputs: SmallVec<[InputSlot; 3]> = source
            .inputs
            .iter()
            .map(|slot| match *slot {
                InputSlot::Node(child) if graph.nodes.contains_key(child) => {
                    InputSlot::Node(self.clone_node(child))
                }
                InputSlot::Variable(var) => self
                    .clone_variable(var)
                    .map_or(InputSlot::None, InputSlot::Variable),
                _ => InputSlot::None,
            })
            .collect();

        let cloned = self.nodes.insert(source.clone_with_inputs(inputs));
        self.node_map.insert(key, cloned);
        cloned
    }

    fn clone_variable(&mut self, key: VariableKey) -> Option<VariableKey> {
        if let Some(&cloned) = self.variable_map.get(&key) {
            return Some(cloned);
        }
        let var = self.source.variables.get(key)?;
        let cloned = self.variables.adopt(var);
        self.variable_map.insert(key, cloned);
        Some(cloned)
    }
}
