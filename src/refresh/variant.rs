use super::record::ParsedNode;

const TOOL_SUFFIX: &str = "Tool";

pub trait ToolVariantGenerator: Send + Sync {
    /// Derives the AI-callable variant of `node`, if it has one.
    fn generate(&self, node: &ParsedNode) -> Option<ParsedNode>;
}

/// Appends `Tool` to the node type and ` Tool` to the display name.
///
/// Nodes that already are tool variants produce nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixToolVariantGenerator;

impl ToolVariantGenerator for SuffixToolVariantGenerator {
    fn generate(&self, node: &ParsedNode) -> Option<ParsedNode> {
        if node.tool_variant_of.is_some() || node.node_type.ends_with(TOOL_SUFFIX) {
            return None;
        }

        Some(ParsedNode {
            node_type: format!("{}{TOOL_SUFFIX}", node.node_type),
            display_name: format!("{} {TOOL_SUFFIX}", node.display_name),
            is_ai_tool: true,
            is_trigger: false,
            has_tool_variant: false,
            tool_variant_of: Some(node.node_type.clone()),
            ..node.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SourceType;
    use std::path::PathBuf;

    #[test]
    fn test_generate_variant() {
        let mut node = ParsedNode::new("acme.search", "Search");
        node.package_name = "acme".into();
        node.is_ai_tool = true;
        node.set_provenance(SourceType::Custom, Some(PathBuf::from("/pkgs/acme")));

        let variant = SuffixToolVariantGenerator.generate(&node).unwrap();
        assert_eq!(variant.node_type, "acme.searchTool");
        assert_eq!(variant.display_name, "Search Tool");
        assert_eq!(variant.tool_variant_of.as_deref(), Some("acme.search"));
        assert_eq!(variant.package_name, "acme");
        assert!(variant.is_ai_tool);
        assert!(!variant.has_tool_variant);
    }

    #[test]
    fn test_no_variant_of_variant() {
        let node = ParsedNode::new("acme.searchTool", "Search Tool");
        assert!(SuffixToolVariantGenerator.generate(&node).is_none());

        let mut derived = ParsedNode::new("acme.x", "X");
        derived.tool_variant_of = Some("acme.y".into());
        assert!(SuffixToolVariantGenerator.generate(&derived).is_none());
    }
}
