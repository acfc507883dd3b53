//! Settings consumed by the refresh pipeline.

use std::path::PathBuf;

use super::ConfigResult;
use super::provider::{ConfigProvider, ConfigProviderExt};

/// Comma-separated list of custom package locations (`CUSTOM_NODE_PATHS`).
pub const CUSTOM_NODE_PATHS_KEY: &str = "custom.node.paths";
/// Explicit location of the node store (`NODE_DB_PATH`).
pub const NODE_DB_PATH_KEY: &str = "node.db.path";

/// Split a comma-separated path list, trimming entries and dropping empties.
///
/// `None`, empty and whitespace-only input all yield an empty list.
pub fn parse_custom_node_paths(value: Option<&str>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSettings {
    pub custom_node_paths: Vec<String>,
    pub database_path: Option<PathBuf>,
}

impl RefreshSettings {
    pub async fn load(provider: &dyn ConfigProvider) -> ConfigResult<Self> {
        let paths = provider.get_raw(CUSTOM_NODE_PATHS_KEY).await?;
        let database_path = provider
            .get_non_blank(NODE_DB_PATH_KEY)
            .await?
            .map(|p| PathBuf::from(p.trim()));

        Ok(Self {
            custom_node_paths: parse_custom_node_paths(paths.as_deref()),
            database_path,
        })
    }

    pub fn with_paths(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.custom_node_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;

    #[test]
    fn test_parse_none_and_blank() {
        assert!(parse_custom_node_paths(None).is_empty());
        assert!(parse_custom_node_paths(Some("")).is_empty());
        assert!(parse_custom_node_paths(Some("   \t\n  ")).is_empty());
    }

    #[test]
    fn test_parse_single_and_multiple() {
        assert_eq!(parse_custom_node_paths(Some("/path/to/nodes")), vec!["/path/to/nodes"]);
        assert_eq!(
            parse_custom_node_paths(Some("/path/one,/path/two,/path/three")),
            vec!["/path/one", "/path/two", "/path/three"]
        );
    }

    #[test]
    fn test_parse_trims_and_drops_empty_segments() {
        assert_eq!(
            parse_custom_node_paths(Some("  /path/one  ,  /path/two  ")),
            vec!["/path/one", "/path/two"]
        );
        assert_eq!(
            parse_custom_node_paths(Some("/path/one,,/path/two,  ,/path/three")),
            vec!["/path/one", "/path/two", "/path/three"]
        );
    }

    #[test]
    fn test_parse_keeps_wildcards() {
        assert_eq!(
            parse_custom_node_paths(Some("/custom-nodes/*,/other-nodes/*")),
            vec!["/custom-nodes/*", "/other-nodes/*"]
        );
    }

    #[tokio::test]
    async fn test_load_from_provider() {
        let provider = MemoryConfigProvider::new()
            .value(CUSTOM_NODE_PATHS_KEY, "/a, /b/*")
            .value(NODE_DB_PATH_KEY, " /data/nodes.json ");

        let settings = RefreshSettings::load(&provider).await.unwrap();
        assert_eq!(settings.custom_node_paths, vec!["/a", "/b/*"]);
        assert_eq!(
            settings.database_path,
            Some(PathBuf::from("/data/nodes.json"))
        );
    }

    #[tokio::test]
    async fn test_load_defaults_when_unset() {
        let provider = MemoryConfigProvider::new().value(NODE_DB_PATH_KEY, "  ");
        let settings = RefreshSettings::load(&provider).await.unwrap();
        assert_eq!(settings, RefreshSettings::default());
    }
}
