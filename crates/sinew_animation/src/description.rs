//! Graph Description
//!
//! Serializable form of an animation graph, as produced by an authoring tool.
//! Nodes refer to each other by their index in [`GraphDescription::nodes`] and
//! to variables by name; clips are referenced by name and resolved against a
//! clip table when the description is compiled.
//!
//! ```json
//! {
//!   "variables": [
//!     { "name": "walk", "value": { "Animation": "walk" } },
//!     { "name": "speed", "value": { "Float": 1.0 } }
//!   ],
//!   "nodes": [
//!     { "kind": "ClipSampler", "inputs": [{ "Variable": "walk" }, { "Variable": "speed" }, { "Bool": true }] }
//!   ],
//!   "output": 0
//! }
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sinew_core::{Result, SinewError};

use crate::clip::AnimationClip;
use crate::graph::AnimationGraph;
use crate::node::{NodeKey, NodeType};
use crate::settings::AnimationSettings;
use crate::skeleton::Skeleton;
use crate::variables::VariableValue;

/// Clip table used to resolve clip names.
pub type ClipLibrary = FxHashMap<String, Arc<AnimationClip>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    #[serde(default)]
    pub variables: Vec<VariableDesc>,
    #[serde(default)]
    pub nodes: Vec<NodeDesc>,
    #[serde(default)]
    pub output: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDesc {
    pub name: String,
    pub value: ValueDesc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueDesc {
    Bool(bool),
    Float(f32),
    /// Clip name, or `null` for an unassigned clip variable.
    Animation(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDesc {
    pub kind: NodeType,
    /// One entry per input slot; `null` or missing trailing entries leave the
    /// slot unbound.
    #[serde(default)]
    pub inputs: Vec<Option<InputDesc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputDesc {
    /// Output of the node at this index.
    Node(usize),
    /// A declared variable.
    Variable(String),
    /// Literal, stored as a node-local variable.
    Bool(bool),
    Float(f32),
}

impl GraphDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a runtime graph with default settings.
    pub fn compile(&self, skeleton: Arc<Skeleton>, clips: &ClipLibrary) -> Result<AnimationGraph> {
        self.compile_with_settings(skeleton, clips, AnimationSettings::default())
    }

    /// Builds a runtime graph.
    ///
    /// Fails on unknown clip or variable names, node indices out of range,
    /// more inputs than a node's arity, and node bindings forming a cycle.
    pub fn compile_with_settings(
        &self,
        skeleton: Arc<Skeleton>,
        clips: &ClipLibrary,
        settings: AnimationSettings,
    ) -> Result<AnimationGraph> {
        let mut graph = AnimationGraph::with_settings(skeleton, settings);

        for var in &self.variables {
            let value = var.value.resolve(clips)?;
            graph.declare_variable(&var.name, value)?;
        }

        let keys: Vec<NodeKey> = self
            .nodes
            .iter()
            .map(|node| graph.add_node(node.kind))
            .collect();

        for (node_index, (node, &key)) in self.nodes.iter().zip(&keys).enumerate() {
            let arity = node.kind.arity();
            if node.inputs.len() > arity {
                return Err(SinewError::InputIndexOutOfRange {
                    index: node.inputs.len() - 1,
                    arity,
                });
            }

            for (slot, input) in node.inputs.iter().enumerate() {
                let Some(input) = input else {
                    continue;
                };
                match input {
                    InputDesc::Node(child) => {
                        let child = *keys.get(*child).ok_or_else(|| {
                            SinewError::InvalidDescription(format!(
                                "node {node_index} input {slot} refers to missing node {child}"
                            ))
                        })?;
                        graph.set_input_node(key, slot, child)?;
                    }
                    InputDesc::Variable(name) => graph.set_input_named(key, slot, name)?,
                    InputDesc::Bool(value) => {
                        graph.set_input_value(key, slot, *value)?;
                    }
                    InputDesc::Float(value) => {
                        graph.set_input_value(key, slot, *value)?;
                    }
                }
            }
        }

        if let Some(output) = self.output {
            let key = *keys.get(output).ok_or_else(|| {
                SinewError::InvalidDescription(format!("output refers to missing node {output}"))
            })?;
            graph.set_output(Some(key))?;
        }

        log::debug!(
            "Animation graph compiled: {} nodes, {} variables",
            graph.node_count(),
            graph.variables().len()
        );

        Ok(graph)
    }
}

impl ValueDesc {
    fn resolve(&self, clips: &ClipLibrary) -> Result<VariableValue> {
        Ok(match self {
            Self::Bool(value) => VariableValue::Bool(*value),
            Self::Float(value) => VariableValue::Float(*value),
            Self::Animation(None) => VariableValue::Animation(None),
            Self::Animation(Some(name)) => {
                let clip = clips
                    .get(name)
                    .ok_or_else(|| SinewError::UnknownClip(name.clone()))?;
                VariableValue::Animation(Some(Arc::clone(clip)))
            }
        })
    }
}
