use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::SourceType;

/// Field names owned by [`ParsedNode`]. Description keys with these names are
/// never copied into `extra`, since they would collide when flattened.
pub(crate) const RESERVED_FIELDS: &[&str] = &[
    "nodeType",
    "displayName",
    "packageName",
    "isAITool",
    "isTrigger",
    "hasToolVariant",
    "toolVariantOf",
    "sourceType",
    "sourcePath",
];

/// Structured metadata for one node, as persisted by a [`NodeRepository`](super::NodeRepository).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedNode {
    #[serde(default)]
    pub node_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default, rename = "isAITool")]
    pub is_ai_tool: bool,
    #[serde(default)]
    pub is_trigger: bool,
    #[serde(default)]
    pub has_tool_variant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_variant_of: Option<String>,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Remaining description fields, carried through persistence untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParsedNode {
    pub fn new(node_type: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.node_type.trim().is_empty() && !self.display_name.trim().is_empty()
    }

    /// AI-capable nodes that are not triggers get a tool variant.
    pub fn is_tool_variant_eligible(&self) -> bool {
        self.is_ai_tool && !self.is_trigger
    }

    pub fn set_provenance(&mut self, source_type: SourceType, source_path: Option<PathBuf>) {
        self.source_type = source_type;
        self.source_path = source_path;
    }

    pub fn is_custom(&self) -> bool {
        self.source_type.is_custom()
    }
}
