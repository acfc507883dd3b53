//! Loaded modules and the node implementations they export.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Export name preferred over every other export.
pub const DEFAULT_EXPORT: &str = "default";

/// A node implementation as seen by the loaders.
///
/// The loaders never look inside; parsers read [`description`](Self::description).
pub trait NodeDefinition: Send + Sync + fmt::Debug {
    fn description(&self) -> &Value;
}

/// Node backed by a plain description document.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarativeNode {
    description: Value,
}

impl DeclarativeNode {
    pub fn new(description: Value) -> Self {
        Self { description }
    }
}

impl NodeDefinition for DeclarativeNode {
    fn description(&self) -> &Value {
        &self.description
    }
}

/// Cheaply clonable handle to a loaded implementation.
#[derive(Clone)]
pub struct NodeImplementation(Arc<dyn NodeDefinition>);

impl NodeImplementation {
    pub fn new(definition: impl NodeDefinition + 'static) -> Self {
        Self(Arc::new(definition))
    }

    pub fn declarative(description: Value) -> Self {
        Self::new(DeclarativeNode::new(description))
    }

    pub fn description(&self) -> &Value {
        self.0.description()
    }

    pub fn definition(&self) -> &dyn NodeDefinition {
        self.0.as_ref()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeImplementation").field(&self.0).finish()
    }
}

/// Named exports of one module, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    exports: Vec<(String, NodeImplementation)>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_export(mut self, name: impl Into<String>, implementation: NodeImplementation) -> Self {
        self.insert(name, implementation);
        self
    }

    /// Adds or replaces an export, keeping its original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, implementation: NodeImplementation) {
        let name = name.into();
        match self.exports.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = implementation,
            None => self.exports.push((name, implementation)),
        }
    }

    /// Builds exports from a JSON object of `export name -> description`.
    /// `null` values are treated as absent exports.
    pub fn from_json(value: Value) -> Result<Self, String> {
        let Value::Object(map) = value else {
            return Err("module must be a JSON object of exports".to_string());
        };

        let mut exports = Self::new();
        for (name, description) in map {
            if description.is_null() {
                continue;
            }
            exports.insert(name, NodeImplementation::declarative(description));
        }
        Ok(exports)
    }

    pub fn get(&self, name: &str) -> Option<&NodeImplementation> {
        self.exports
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, implementation)| implementation)
    }

    pub fn names(&self) -> Vec<&str> {
        self.exports.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Picks the implementation for `node_name`: the default export, then
    /// the export named `node_name`, then the first export.
    pub fn select(&self, node_name: &str) -> Option<&NodeImplementation> {
        self.get(DEFAULT_EXPORT)
            .or_else(|| self.get(node_name))
            .or_else(|| self.exports.first().map(|(_, implementation)| implementation))
    }
}
