//! Loader strategies: how a resolved entry file becomes [`ModuleExports`].
//!
//! Nothing is introspected at runtime. A file is either a declarative JSON
//! module read from disk ([`JsonModules`]) or is looked up in an explicit
//! registration table of compiled-in factories ([`FactoryTable`]).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::LoadError;
use super::module::ModuleExports;
use crate::common::normalize;

#[async_trait]
pub trait ModuleStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn handles(&self, path: &Path) -> bool;

    async fn load(&self, path: &Path) -> Result<ModuleExports, LoadError>;
}

/// Declarative node modules (`*.node.json`): a JSON object mapping export
/// names to node descriptions. Always reads the current file contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModules;

#[async_trait]
impl ModuleStrategy for JsonModules {
    fn name(&self) -> &str {
        "json"
    }

    fn handles(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("json")
    }

    async fn load(&self, path: &Path) -> Result<ModuleExports, LoadError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::entry_load(path, e))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| LoadError::entry_load(path, e))?;
        ModuleExports::from_json(value).map_err(|e| LoadError::entry_load(path, e))
    }
}

pub type ModuleFactory = Arc<dyn Fn() -> ModuleExports + Send + Sync>;

/// Registration table of compiled-in modules.
///
/// Lookups try the exact (normalised) path first, then the file name, so one
/// registration can serve a package wherever it is installed.
#[derive(Clone, Default)]
pub struct FactoryTable {
    by_path: HashMap<PathBuf, ModuleFactory>,
    by_file_name: HashMap<String, ModuleFactory>,
}

impl FactoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_path<F>(mut self, path: impl AsRef<Path>, factory: F) -> Self
    where
        F: Fn() -> ModuleExports + Send + Sync + 'static,
    {
        self.by_path
            .insert(normalize(path.as_ref()), Arc::new(factory));
        self
    }

    pub fn register_file<F>(mut self, file_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> ModuleExports + Send + Sync + 'static,
    {
        self.by_file_name.insert(file_name.into(), Arc::new(factory));
        self
    }

    pub fn len(&self) -> usize {
        self.by_path.len() + self.by_file_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, path: &Path) -> Option<&ModuleFactory> {
        self.by_path.get(&normalize(path)).or_else(|| {
            path.file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| self.by_file_name.get(n))
        })
    }
}

impl std::fmt::Debug for FactoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryTable")
            .field("paths", &self.by_path.keys().collect::<Vec<_>>())
            .field("file_names", &self.by_file_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ModuleStrategy for FactoryTable {
    fn name(&self) -> &str {
        "factory"
    }

    fn handles(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    async fn load(&self, path: &Path) -> Result<ModuleExports, LoadError> {
        self.lookup(path)
            .map(|factory| factory())
            .ok_or_else(|| LoadError::entry_load(path, "no factory registered for this file"))
    }
}

/// Delegates to the first strategy that handles a path.
#[derive(Clone, Default)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn ModuleStrategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: impl ModuleStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

impl std::fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyChain")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[async_trait]
impl ModuleStrategy for StrategyChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn handles(&self, path: &Path) -> bool {
        self.strategies.iter().any(|s| s.handles(path))
    }

    async fn load(&self, path: &Path) -> Result<ModuleExports, LoadError> {
        for strategy in &self.strategies {
            if strategy.handles(path) {
                tracing::debug!(strategy = strategy.name(), path = %path.display(), "Loading module");
                return strategy.load(path).await;
            }
        }
        Err(LoadError::entry_load(
            path,
            "no loader strategy handles this file",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::module::NodeImplementation;
    use serde_json::json;
    use tempfile::tempdir;

    fn exports(name: &str) -> ModuleExports {
        ModuleExports::new().with_export(
            name,
            NodeImplementation::declarative(json!({ "name": name })),
        )
    }

    #[tokio::test]
    async fn test_json_modules_load() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Weather.node.json");
        std::fs::write(&file, r#"{"Weather":{"name":"weather","displayName":"Weather"}}"#)
            .unwrap();

        let loaded = JsonModules.load(&file).await.unwrap();
        assert_eq!(loaded.names(), vec!["Weather"]);
        assert_eq!(loaded.get("Weather").unwrap().description()["displayName"], "Weather");
    }

    #[tokio::test]
    async fn test_json_modules_invalid() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Broken.node.json");
        std::fs::write(&file, "{ broken").unwrap();

        let err = JsonModules.load(&file).await.unwrap_err();
        assert!(matches!(err, LoadError::EntryLoadFailed { .. }));
    }

    #[test]
    fn test_json_modules_handles_extension() {
        assert!(JsonModules.handles(Path::new("/a/A.node.json")));
        assert!(!JsonModules.handles(Path::new("/a/A.node.js")));
    }

    #[tokio::test]
    async fn test_factory_table_lookup() {
        let table = FactoryTable::new()
            .register_path("/pkgs/base/dist/./Exact.node.js", || exports("Exact"))
            .register_file("Slack.node.js", || exports("Slack"));

        assert_eq!(table.len(), 2);
        assert!(table.handles(Path::new("/pkgs/base/dist/Exact.node.js")));
        assert!(table.handles(Path::new("/anywhere/Slack.node.js")));
        assert!(!table.handles(Path::new("/anywhere/Other.node.js")));

        let loaded = table.load(Path::new("/x/Slack.node.js")).await.unwrap();
        assert_eq!(loaded.names(), vec!["Slack"]);

        let err = table.load(Path::new("/x/Other.node.js")).await.unwrap_err();
        assert!(matches!(err, LoadError::EntryLoadFailed { .. }));
    }

    #[tokio::test]
    async fn test_chain_dispatch() {
        let chain = StrategyChain::new()
            .strategy(FactoryTable::new().register_file("Compiled.node.js", || exports("Compiled")))
            .strategy(JsonModules);

        assert_eq!(chain.strategy_names(), vec!["factory", "json"]);
        assert!(chain.handles(Path::new("/p/Compiled.node.js")));
        assert!(chain.handles(Path::new("/p/Any.node.json")));

        let loaded = chain.load(Path::new("/p/Compiled.node.js")).await.unwrap();
        assert_eq!(loaded.names(), vec!["Compiled"]);

        let err = chain.load(Path::new("/p/Unknown.node.ts")).await.unwrap_err();
        assert!(err.to_string().contains("no loader strategy"));
    }
}
