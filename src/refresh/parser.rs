//! Metadata extraction from loaded node implementations.

use serde_json::Value;

use super::record::{ParsedNode, RESERVED_FIELDS};
use crate::nodes::NodeImplementation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("node description must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

pub trait NodeParser: Send + Sync {
    fn parse(
        &self,
        implementation: &NodeImplementation,
        package_name: &str,
    ) -> Result<ParsedNode, ParseError>;
}

const TRIGGER_GROUP: &str = "trigger";
const TRIGGER_SUFFIX: &str = "Trigger";

/// Reads the node description document.
///
/// `name` becomes `<package>.<name>` unless it is already qualified.
/// Missing `name` or `displayName` yields empty fields rather than an error,
/// so callers can report the record as incomplete.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionParser;

impl DescriptionParser {
    fn node_type(name: &str, package_name: &str) -> String {
        if name.is_empty() || name.contains('.') {
            name.to_string()
        } else {
            format!("{package_name}.{name}")
        }
    }

    fn is_trigger(description: &serde_json::Map<String, Value>, name: &str) -> bool {
        let in_trigger_group = description
            .get("group")
            .and_then(Value::as_array)
            .is_some_and(|groups| groups.iter().any(|g| g.as_str() == Some(TRIGGER_GROUP)));
        in_trigger_group || name.ends_with(TRIGGER_SUFFIX)
    }
}

impl NodeParser for DescriptionParser {
    fn parse(
        &self,
        implementation: &NodeImplementation,
        package_name: &str,
    ) -> Result<ParsedNode, ParseError> {
        let description = match implementation.description() {
            Value::Object(map) => map,
            other => {
                return Err(ParseError::NotAnObject {
                    found: json_kind(other),
                });
            }
        };

        let name = optional_str(description, "name")?.unwrap_or_default();
        let display_name = optional_str(description, "displayName")?.unwrap_or_default();
        let is_ai_tool = description
            .get("usableAsTool")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let extra = description
            .iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(ParsedNode {
            node_type: Self::node_type(name, package_name),
            display_name: display_name.to_string(),
            package_name: package_name.to_string(),
            is_ai_tool,
            is_trigger: Self::is_trigger(description, name),
            extra,
            ..Default::default()
        })
    }
}

fn optional_str<'a>(
    description: &'a serde_json::Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, ParseError> {
    match description.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ParseError::InvalidField {
            field: field.to_string(),
            reason: format!("expected string, found {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
