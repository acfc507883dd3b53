use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::LoadError;

pub const MANIFEST_FILE: &str = "package.json";

/// The parts of `package.json` the loaders read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n8n: Option<PlatformSection>,
}

/// The `n8n` section. `nodes` is kept raw because packages declare it either
/// as a list of entry paths or as a name-to-path map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeList {
    /// `["dist/nodes/A/A.node.js", ...]`
    Ordered(Vec<String>),
    /// `{"A": "dist/nodes/A/A.node.js", ...}` in declaration order.
    Named(Vec<(String, String)>),
}

impl NodeList {
    pub fn len(&self) -> usize {
        match self {
            Self::Ordered(entries) => entries.len(),
            Self::Named(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PackageManifest {
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILE)
    }

    pub fn exists_in(root: &Path) -> bool {
        Self::path_in(root).is_file()
    }

    pub async fn load(root: &Path) -> Result<Self, LoadError> {
        let manifest_path = Self::path_in(root);
        let content = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::ManifestMissing {
                    path: root.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(LoadError::ManifestUnreadable {
                    path: manifest_path,
                    reason: e.to_string(),
                });
            }
        };
        Self::parse(&content, &manifest_path)
    }

    pub fn parse(content: &str, manifest_path: &Path) -> Result<Self, LoadError> {
        serde_json::from_str(content).map_err(|e| LoadError::ManifestUnreadable {
            path: manifest_path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Declared package name, or the directory name when absent.
    pub fn package_name(&self, root: &Path) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                root.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root.display().to_string())
            })
    }

    fn raw_nodes(&self) -> Option<&Value> {
        self.n8n.as_ref().and_then(|section| section.nodes.as_ref())
    }

    /// Node declarations in either supported shape. Non-string entries are
    /// dropped with a warning.
    pub fn node_list(&self) -> Option<NodeList> {
        match self.raw_nodes()? {
            Value::Array(items) => Some(NodeList::Ordered(string_entries(items))),
            Value::Object(map) => Some(NodeList::Named(
                map.iter()
                    .filter_map(|(name, path)| match path.as_str() {
                        Some(path) => Some((name.clone(), path.to_string())),
                        None => {
                            tracing::warn!(node = %name, "Ignoring non-string node path");
                            None
                        }
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Entry paths of a custom package. Custom packages must use the list
    /// form; anything else (including an empty list) yields `None`.
    pub fn custom_entries(&self) -> Option<Vec<String>> {
        match self.raw_nodes()? {
            Value::Array(items) if !items.is_empty() => Some(string_entries(items)),
            _ => None,
        }
    }
}

fn string_entries(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item.as_str() {
            Some(path) => Some(path.to_string()),
            None => {
                tracing::warn!(entry = %item, "Ignoring non-string node entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(json: &str) -> PackageManifest {
        PackageManifest::parse(json, Path::new("/pkg/package.json")).unwrap()
    }

    #[tokio::test]
    async fn test_manifest_load() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"name":"n8n-nodes-acme","version":"1.0.0","n8n":{"nodes":["dist/A.node.js"]}}"#,
        )
        .unwrap();

        let manifest = PackageManifest::load(dir.path()).await.unwrap();
        assert_eq!(manifest.name.as_deref(), Some("n8n-nodes-acme"));
        assert_eq!(
            manifest.node_list(),
            Some(NodeList::Ordered(vec!["dist/A.node.js".into()]))
        );
    }

    #[tokio::test]
    async fn test_manifest_missing() {
        let dir = tempdir().unwrap();
        let err = PackageManifest::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, LoadError::ManifestMissing { .. }));
    }

    #[tokio::test]
    async fn test_manifest_invalid_json() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "not json").unwrap();
        let err = PackageManifest::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, LoadError::ManifestUnreadable { .. }));
    }

    #[test]
    fn test_named_node_list_keeps_order() {
        let manifest = parse(r#"{"n8n":{"nodes":{"Zeta":"z.node.js","Alpha":"a.node.js"}}}"#);
        assert_eq!(
            manifest.node_list(),
            Some(NodeList::Named(vec![
                ("Zeta".into(), "z.node.js".into()),
                ("Alpha".into(), "a.node.js".into()),
            ]))
        );
        assert_eq!(manifest.custom_entries(), None);
    }

    #[test]
    fn test_custom_entries_require_non_empty_array() {
        assert_eq!(parse(r#"{"name":"x"}"#).custom_entries(), None);
        assert_eq!(parse(r#"{"n8n":{}}"#).custom_entries(), None);
        assert_eq!(parse(r#"{"n8n":{"nodes":[]}}"#).custom_entries(), None);
        assert_eq!(parse(r#"{"n8n":{"nodes":"a.node.js"}}"#).custom_entries(), None);
        assert_eq!(
            parse(r#"{"n8n":{"nodes":["a.node.js", 3]}}"#).custom_entries(),
            Some(vec!["a.node.js".to_string()])
        );
    }

    #[test]
    fn test_package_name_fallback() {
        let root = Path::new("/pkgs/n8n-nodes-dir");
        assert_eq!(parse(r#"{"name":"declared"}"#).package_name(root), "declared");
        assert_eq!(parse("{}").package_name(root), "n8n-nodes-dir");
        assert_eq!(parse(r#"{"name":""}"#).package_name(root), "n8n-nodes-dir");
    }
}
