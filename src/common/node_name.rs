//! Node name derivation from entry-point file names.
//!
//! Entry points follow `<Name>.node.<ext>`, e.g. `dist/nodes/Slack/Slack.node.js`
//! yields `Slack`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

const LEGACY_SUFFIX: &str = ".node.js";

fn node_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[/\\])([^/\\]+)\.node\.[A-Za-z0-9]+$").expect("valid node file regex")
    })
}

/// Derive a node name from a manifest entry path.
///
/// Falls back to the bare file name minus a literal `.node.js` suffix when the
/// entry does not match the `<Name>.node.<ext>` pattern.
pub fn derive_node_name(entry: &str) -> String {
    if let Some(name) = node_file_regex()
        .captures(entry)
        .and_then(|caps| caps.get(1))
    {
        return name.as_str().to_string();
    }

    let file_name = Path::new(entry)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(entry);
    file_name
        .strip_suffix(LEGACY_SUFFIX)
        .unwrap_or(file_name)
        .to_string()
}
