use std::collections::BTreeMap;
use std::sync::Arc;

use slotmap::{SlotMap, new_key_type};
use sinew_core::{Result, SinewError};

use crate::clip::AnimationClip;

new_key_type! {
    pub struct VariableKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    Bool,
    Float,
    Animation,
}

impl VariableType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Float => "Float",
            Self::Animation => "Animation",
        }
    }
}

/// Value held by a graph variable.
#[derive(Debug, Clone)]
pub enum VariableValue {
    Bool(bool),
    Float(f32),
    /// Clip reference; `None` until a clip is assigned.
    Animation(Option<Arc<AnimationClip>>),
}

impl PartialEq for VariableValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Animation(a), Self::Animation(b)) => match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

impl VariableValue {
    #[must_use]
    pub fn value_type(&self) -> VariableType {
        match self {
            Self::Bool(_) => VariableType::Bool,
            Self::Float(_) => VariableType::Float,
            Self::Animation(_) => VariableType::Animation,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_clip(&self) -> Option<&Arc<AnimationClip>> {
        match self {
            Self::Animation(clip) => clip.as_ref(),
            _ => None,
        }
    }

    /// `false` only for an animation variable without a clip.
    #[must_use]
    pub fn has_value(&self) -> bool {
        !matches!(self, Self::Animation(None))
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for VariableValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Arc<AnimationClip>> for VariableValue {
    fn from(clip: Arc<AnimationClip>) -> Self {
        Self::Animation(Some(clip))
    }
}

/// A typed graph variable. Named variables are declared on the graph and may
/// be bound by many node inputs; unnamed ones hold a single node's literal
/// input value.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphVariable {
    name: Option<String>,
    value: VariableValue,
}

impl GraphVariable {
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &VariableValue {
        &self.value
    }

    #[inline]
    #[must_use]
    pub fn value_type(&self) -> VariableType {
        self.value.value_type()
    }

    /// Assigns a new value of the same type.
    pub fn set(&mut self, value: VariableValue) -> Result<()> {
        let expected = self.value_type();
        let found = value.value_type();
        if expected != found {
            return Err(SinewError::VariableTypeMismatch {
                name: self.name.clone().unwrap_or_default(),
                expected: expected.name(),
                found: found.name(),
            });
        }
        self.value = value;
        Ok(())
    }
}

/// Variable storage of a graph: an arena addressed by [`VariableKey`] plus a
/// name index for the declared (named) variables.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    vars: SlotMap<VariableKey, GraphVariable>,
    by_name: BTreeMap<String, VariableKey>,
}

impl VariableTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a named variable.
    pub fn declare(&mut self, name: &str, value: impl Into<VariableValue>) -> Result<VariableKey> {
        if self.by_name.contains_key(name) {
            return Err(SinewError::DuplicateVariable(name.to_owned()));
        }
        let key = self.vars.insert(GraphVariable {
            name: Some(name.to_owned()),
            value: value.into(),
        });
        self.by_name.insert(name.to_owned(), key);
        Ok(key)
    }

    /// Adds an unnamed variable holding a single node's input value.
    pub fn add_local(&mut self, value: impl Into<VariableValue>) -> VariableKey {
        self.vars.insert(GraphVariable {
            name: None,
            value: value.into(),
        })
    }

    #[inline]
    #[must_use]
    pub fn key(&self, name: &str) -> Option<VariableKey> {
        self.by_name.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: VariableKey) -> Option<&GraphVariable> {
        self.vars.get(key)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&GraphVariable> {
        self.key(name).and_then(|key| self.vars.get(key))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: VariableKey) -> bool {
        self.vars.contains_key(key)
    }

    /// Assigns a value to a named variable.
    pub fn set(&mut self, name: &str, value: impl Into<VariableValue>) -> Result<()> {
        let key = self
            .key(name)
            .ok_or_else(|| SinewError::UnknownVariable(name.to_owned()))?;
        self.set_by_key(key, value)
    }

    pub fn set_by_key(&mut self, key: VariableKey, value: impl Into<VariableValue>) -> Result<()> {
        let var = self
            .vars
            .get_mut(key)
            .ok_or_else(|| SinewError::UnknownVariable(format!("{key:?}")))?;
        var.set(value.into())
    }

    /// Named variables in name order.
    pub fn iter_named(&self) -> impl Iterator<Item = (&str, VariableKey, &GraphVariable)> {
        self.by_name
            .iter()
            .map(|(name, &key)| (name.as_str(), key, &self.vars[key]))
    }

    /// Number of variables, named and unnamed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
        self.by_name.clear();
    }

    /// A table holding copies of this table's named variables only.
    #[must_use]
    pub fn copy_named(&self) -> Self {
        let mut copy = Self::new();
        for (name, _, var) in self.iter_named() {
            let key = copy.vars.insert(var.clone());
            copy.by_name.insert(name.to_owned(), key);
        }
        copy
    }

    /// Inserts a copy of `var` under its own name, or returns the variable
    /// already declared under that name.
    pub(crate) fn adopt(&mut self, var: &GraphVariable) -> VariableKey {
        match var.name() {
            Some(name) => {
                if let Some(existing) = self.key(name) {
                    if self.vars[existing].value_type() != var.value_type() {
                        log::warn!(
                            "Variable '{name}' rebound to a {} variable (node expects {})",
                            self.vars[existing].value_type().name(),
                            var.value_type().name()
                        );
                    }
                    return existing;
                }
                let key = self.vars.insert(var.clone());
                self.by_name.insert(name.to_owned(), key);
                key
            }
            None => self.vars.insert(var.clone()),
        }
    }
}
