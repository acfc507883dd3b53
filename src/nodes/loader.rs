use std::path::Path;
use std::sync::Arc;

use super::cache::ModuleCache;
use super::manifest::{NodeList, PackageManifest};
use super::module::{ModuleExports, NodeImplementation};
use super::resolution::{ModuleResolution, ResolvedPackage, file_exists};
use super::resolver::PathResolver;
use super::strategy::{JsonModules, ModuleStrategy, StrategyChain};
use super::{CustomNodeSource, LoadError, LoadedNode};
use crate::common::{SourceType, derive_node_name, resolve_relative};

/// Identifiers of the built-in packages loaded by [`NodeLoader::load_all_nodes`].
pub const DEFAULT_CORE_PACKAGES: [&str; 2] = ["n8n-nodes-base", "@n8n/n8n-nodes-langchain"];

/// Nodes produced by one loader call, with everything that was skipped.
///
/// `warnings` hold per-path and per-entry skips; `errors` hold failures that
/// dropped a whole package.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub nodes: Vec<LoadedNode>,
    pub warnings: Vec<LoadError>,
    pub errors: Vec<LoadError>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    fn warn(&mut self, warning: LoadError) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn fail(&mut self, error: LoadError) {
        tracing::error!("{}", error);
        self.errors.push(error);
    }
}

#[derive(Clone)]
pub struct NodeLoader {
    strategy: Arc<dyn ModuleStrategy>,
    resolution: ModuleResolution,
    cache: ModuleCache,
    core_packages: Vec<String>,
}

impl Default for NodeLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeLoader")
            .field("strategy", &self.strategy.name())
            .field("resolution", &self.resolution)
            .field("cached_modules", &self.cache.len())
            .field("core_packages", &self.core_packages)
            .finish()
    }
}

impl NodeLoader {
    pub fn new() -> Self {
        Self {
            strategy: Arc::new(StrategyChain::new().strategy(JsonModules)),
            resolution: ModuleResolution::from_current_dir(),
            cache: ModuleCache::new(),
            core_packages: DEFAULT_CORE_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl ModuleStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    pub fn with_resolution(mut self, resolution: ModuleResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_core_packages(mut self, packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.core_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cache(mut self, cache: ModuleCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    pub fn core_packages(&self) -> &[String] {
        &self.core_packages
    }

    /// Drops every cached module under `package_path` so the next load reads
    /// the files again. Must run before reloading that package.
    pub fn invalidate(&self, package_path: &Path) -> usize {
        self.cache.invalidate(package_path)
    }

    /// Invalidates and reloads a single custom package.
    pub async fn reload(&self, package_path: &Path) -> LoadOutcome {
        self.load_custom_nodes(&[package_path.display().to_string()])
            .await
    }

    /// Loads every node declared by the built-in packages.
    ///
    /// A package that cannot be resolved contributes no nodes; the remaining
    /// packages still load.
    pub async fn load_all_nodes(&self) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();

        for identifier in &self.core_packages {
            tracing::info!(package = %identifier, "Loading package");
            let package = match self.resolution.resolve_package(identifier).await {
                Ok(package) => package,
                Err(e) => {
                    outcome.fail(e);
                    continue;
                }
            };
            self.load_package_nodes(&package, &mut outcome).await;
        }

        outcome
    }

    async fn load_package_nodes(&self, package: &ResolvedPackage, outcome: &mut LoadOutcome) {
        let Some(list) = package.manifest.node_list() else {
            tracing::info!(package = %package.name, "No nodes declared");
            return;
        };
        tracing::info!(package = %package.name, count = list.len(), "Found nodes in package.json");

        let entries: Vec<(String, String)> = match list {
            NodeList::Ordered(paths) => paths
                .into_iter()
                .map(|path| (derive_node_name(&path), path))
                .collect(),
            NodeList::Named(pairs) => pairs,
        };

        for (node_name, entry) in entries {
            let loaded = async {
                let path = self.resolution.resolve_entry(package, &entry).await?;
                let exports = self.load_module(&path).await?;
                select_export(&exports, &node_name, &package.name)
            }
            .await;

            match loaded {
                Ok(implementation) => {
                    tracing::debug!(node = %node_name, package = %package.name, "Loaded node");
                    outcome.nodes.push(LoadedNode {
                        package_name: package.name.clone(),
                        node_name,
                        implementation,
                        source_type: SourceType::Official,
                        source_path: None,
                    });
                }
                Err(e) => outcome.warn(e),
            }
        }
    }

    /// Loads nodes from custom package locations (see [`PathResolver`]).
    ///
    /// Each package is invalidated before it is read, so edits on disk are
    /// picked up by repeated calls. Skipped paths and entries end up in
    /// `warnings`; unreadable manifests end up in `errors`.
    pub async fn load_custom_nodes<S: AsRef<str>>(&self, paths: &[S]) -> LoadOutcome {
        let resolution = PathResolver::resolve(paths);
        let mut outcome = LoadOutcome {
            warnings: resolution.warnings,
            ..Default::default()
        };

        tracing::info!(packages = resolution.sources.len(), "Loading custom nodes");

        for source in &resolution.sources {
            if let Err(e) = self.load_custom_package(source, &mut outcome).await {
                outcome.fail(e);
            }
        }

        outcome
    }

    async fn load_custom_package(
        &self,
        source: &CustomNodeSource,
        outcome: &mut LoadOutcome,
    ) -> Result<(), LoadError> {
        self.invalidate(&source.path);

        let manifest = PackageManifest::load(&source.path).await?;
        let package_name = manifest.package_name(&source.path);

        let Some(entries) = manifest.custom_entries() else {
            outcome.warn(LoadError::NodeListMissing {
                package: package_name,
            });
            return Ok(());
        };

        tracing::info!(package = %package_name, path = %source.path.display(), "Loading custom package");

        for entry in entries {
            let full_path = resolve_relative(&source.path, &entry);
            if !file_exists(&full_path).await {
                outcome.warn(LoadError::EntryFileMissing { path: full_path });
                continue;
            }

            self.cache.evict(&full_path);
            let node_name = derive_node_name(&entry);

            let loaded = match self.load_module(&full_path).await {
                Ok(exports) => select_export(&exports, &node_name, &package_name),
                Err(e) => Err(e),
            };

            match loaded {
                Ok(implementation) => {
                    tracing::info!(node = %node_name, package = %package_name, "Loaded custom node");
                    outcome.nodes.push(LoadedNode {
                        package_name: package_name.clone(),
                        node_name,
                        implementation,
                        source_type: SourceType::Custom,
                        source_path: Some(source.path.clone()),
                    });
                }
                Err(e) => outcome.warn(e),
            }
        }

        Ok(())
    }

    async fn load_module(&self, path: &Path) -> Result<ModuleExports, LoadError> {
        if let Some(exports) = self.cache.get(path) {
            return Ok(exports);
        }
        let exports = self.strategy.load(path).await?;
        self.cache.insert(path, exports.clone());
        Ok(exports)
    }
}

fn select_export(
    exports: &ModuleExports,
    node_name: &str,
    package_name: &str,
) -> Result<NodeImplementation, LoadError> {
    exports
        .select(node_name)
        .cloned()
        .ok_or_else(|| LoadError::NoValidExport {
            node: node_name.to_string(),
            package: package_name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{FactoryTable, ModuleExports, PackageManifest};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_package(root: &Path, name: &str, nodes: serde_json::Value) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("package.json"),
            json!({ "name": name, "n8n": { "nodes": nodes } }).to_string(),
        )
        .unwrap();
        dir
    }

    fn write_node(pkg: &Path, relative: &str, module: serde_json::Value) {
        let path = pkg.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, module.to_string()).unwrap();
    }

    fn loader() -> NodeLoader {
        NodeLoader::new().with_resolution(ModuleResolution::new())
    }

    #[tokio::test]
    async fn test_load_custom_package() {
        let dir = tempdir().unwrap();
        let pkg = write_package(
            dir.path(),
            "n8n-nodes-acme",
            json!(["dist/nodes/Weather/Weather.node.json"]),
        );
        write_node(
            &pkg,
            "dist/nodes/Weather/Weather.node.json",
            json!({ "Weather": { "name": "weather", "displayName": "Weather" } }),
        );

        let outcome = loader()
            .load_custom_nodes(&[pkg.display().to_string()])
            .await;

        assert!(outcome.is_clean(), "{:?}", outcome);
        assert_eq!(outcome.nodes.len(), 1);
        let node = &outcome.nodes[0];
        assert_eq!(node.package_name, "n8n-nodes-acme");
        assert_eq!(node.node_name, "Weather");
        assert_eq!(node.source_type, SourceType::Custom);
        assert_eq!(node.source_path.as_deref(), Some(pkg.as_path()));
        assert_eq!(node.implementation.description()["displayName"], "Weather");
    }

    #[tokio::test]
    async fn test_missing_entry_skipped_siblings_load() {
        let dir = tempdir().unwrap();
        let pkg = write_package(
            dir.path(),
            "pkg",
            json!(["dist/A.node.json", "dist/Missing.node.json", "dist/B.node.json"]),
        );
        write_node(&pkg, "dist/A.node.json", json!({ "default": { "name": "a" } }));
        write_node(&pkg, "dist/B.node.json", json!({ "default": { "name": "b" } }));

        let outcome = loader()
            .load_custom_nodes(&[pkg.display().to_string()])
            .await;

        let names: Vec<&str> = outcome.nodes.iter().map(|n| n.node_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            LoadError::EntryFileMissing { path } if path.ends_with("Missing.node.json")
        ));
    }

    #[tokio::test]
    async fn test_empty_or_missing_node_list_skips_package() {
        let dir = tempdir().unwrap();
        let empty = write_package(dir.path(), "empty", json!([]));
        let mapped = write_package(dir.path(), "mapped", json!({ "A": "A.node.json" }));

        let outcome = loader()
            .load_custom_nodes(&[empty.display().to_string(), mapped.display().to_string()])
            .await;

        assert!(outcome.nodes.is_empty());
        assert!(outcome.errors.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![
                LoadError::NodeListMissing {
                    package: "empty".into()
                },
                LoadError::NodeListMissing {
                    package: "mapped".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unreadable_manifest_is_package_error() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("broken");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join("package.json"), "{ not json").unwrap();
        let good = write_package(dir.path(), "good", json!(["G.node.json"]));
        write_node(&good, "G.node.json", json!({ "G": { "name": "g" } }));

        let outcome = loader()
            .load_custom_nodes(&[format!("{}/*", dir.path().display())])
            .await;

        assert_eq!(outcome.nodes.len(), 1);
        assert_eq!(outcome.nodes[0].package_name, "good");
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            LoadError::ManifestUnreadable { .. }
        ));
    }

    #[tokio::test]
    async fn test_no_valid_export_and_bad_module() {
        let dir = tempdir().unwrap();
        let pkg = write_package(
            dir.path(),
            "pkg",
            json!(["Empty.node.json", "Bad.node.json", "Good.node.json"]),
        );
        write_node(&pkg, "Empty.node.json", json!({}));
        std::fs::write(pkg.join("Bad.node.json"), "[1, 2").unwrap();
        write_node(&pkg, "Good.node.json", json!({ "Good": { "name": "good" } }));

        let outcome = loader()
            .load_custom_nodes(&[pkg.display().to_string()])
            .await;

        assert_eq!(outcome.nodes.len(), 1);
        assert_eq!(outcome.nodes[0].node_name, "Good");
        assert!(matches!(
            outcome.warnings[0],
            LoadError::NoValidExport { ref node, .. } if node == "Empty"
        ));
        assert!(matches!(
            outcome.warnings[1],
            LoadError::EntryLoadFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_reload_observes_edits() {
        let dir = tempdir().unwrap();
        let pkg = write_package(dir.path(), "pkg", json!(["Hot.node.json"]));
        write_node(&pkg, "Hot.node.json", json!({ "Hot": { "displayName": "v1" } }));

        let loader = loader();
        let first = loader.reload(&pkg).await;
        assert_eq!(first.nodes[0].implementation.description()["displayName"], "v1");
        assert_eq!(loader.cache().len(), 1);

        write_node(&pkg, "Hot.node.json", json!({ "Hot": { "displayName": "v2" } }));
        let second = loader.reload(&pkg).await;
        assert_eq!(second.nodes[0].implementation.description()["displayName"], "v2");
    }

    #[tokio::test]
    async fn test_load_all_nodes_from_disk_and_embedded() {
        let dir = tempdir().unwrap();
        let base = write_package(
            dir.path(),
            "n8n-nodes-base",
            json!(["dist/nodes/Slack/Slack.node.json", "dist/nodes/Gone/Gone.node.json"]),
        );
        write_node(
            &base,
            "dist/nodes/Slack/Slack.node.json",
            json!({ "Slack": { "name": "slack" } }),
        );

        let embedded_manifest = PackageManifest::parse(
            r#"{"n8n":{"nodes":{"Agent":"dist/Agent.node.js"}}}"#,
            Path::new("package.json"),
        )
        .unwrap();

        let loader = NodeLoader::new()
            .with_resolution(
                ModuleResolution::new()
                    .search_root(dir.path())
                    .embedded("@n8n/n8n-nodes-langchain", embedded_manifest),
            )
            .with_strategy(
                StrategyChain::new()
                    .strategy(FactoryTable::new().register_file("Agent.node.js", || {
                        ModuleExports::new().with_export(
                            "Agent",
                            NodeImplementation::declarative(json!({ "name": "agent" })),
                        )
                    }))
                    .strategy(JsonModules),
            );

        let outcome = loader.load_all_nodes().await;

        let names: Vec<(&str, &str)> = outcome
            .nodes
            .iter()
            .map(|n| (n.package_name.as_str(), n.node_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("n8n-nodes-base", "Slack"),
                ("@n8n/n8n-nodes-langchain", "Agent"),
            ]
        );
        assert!(
            outcome
                .nodes
                .iter()
                .all(|n| n.source_type == SourceType::Official && n.source_path.is_none())
        );
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_missing_core_package_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let base = write_package(dir.path(), "present", json!(["P.node.json"]));
        write_node(&base, "P.node.json", json!({ "P": {} }));

        let loader = NodeLoader::new()
            .with_resolution(ModuleResolution::new().search_root(dir.path()))
            .with_core_packages(["absent", "present"]);

        let outcome = loader.load_all_nodes().await;
        assert_eq!(outcome.nodes.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            LoadError::PackageNotFound { ref package, .. } if package == "absent"
        ));
    }
}
