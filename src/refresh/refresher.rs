use std::sync::Arc;

use super::json_store::JsonFileNodeStore;
use super::parser::{DescriptionParser, NodeParser};
use super::store::{NodeRepository, NodeStore};
use super::variant::{SuffixToolVariantGenerator, ToolVariantGenerator};
use super::RefreshResult;
use crate::common::SourceType;
use crate::config::{ConfigProvider, RefreshSettings};
use crate::nodes::{LoadedNode, NodeLoader};
use crate::{Error, Result};

/// Re-indexes custom node packages into a [`NodeStore`].
///
/// Each run deletes every custom record, loads the configured packages again
/// and persists what loads. Only a store that cannot be opened fails the run;
/// everything else is reported in [`RefreshResult::errors`].
pub struct CustomNodeRefresher {
    loader: NodeLoader,
    parser: Arc<dyn NodeParser>,
    variants: Arc<dyn ToolVariantGenerator>,
    store: Arc<dyn NodeStore>,
    settings: RefreshSettings,
}

impl CustomNodeRefresher {
    pub fn new(store: impl NodeStore + 'static) -> Self {
        Self {
            loader: NodeLoader::new(),
            parser: Arc::new(DescriptionParser),
            variants: Arc::new(SuffixToolVariantGenerator),
            store: Arc::new(store),
            settings: RefreshSettings::default(),
        }
    }

    /// Builds a refresher backed by [`JsonFileNodeStore`] from configuration.
    pub async fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        let settings = RefreshSettings::load(config).await?;
        let store = JsonFileNodeStore::from_settings(&settings);
        Ok(Self::new(store).with_settings(settings))
    }

    pub fn with_loader(mut self, loader: NodeLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_parser(mut self, parser: impl NodeParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn with_variant_generator(mut self, generator: impl ToolVariantGenerator + 'static) -> Self {
        self.variants = Arc::new(generator);
        self
    }

    pub fn with_settings(mut self, settings: RefreshSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_paths(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.settings = self.settings.with_paths(paths);
        self
    }

    pub fn loader(&self) -> &NodeLoader {
        &self.loader
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    /// Runs one refresh. `override_paths`, when given, replaces the configured
    /// paths; an explicit empty list refreshes nothing.
    pub async fn refresh(&self, override_paths: Option<Vec<String>>) -> Result<RefreshResult> {
        let paths: Vec<String> = override_paths
            .unwrap_or_else(|| self.settings.custom_node_paths.clone())
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if paths.is_empty() {
            tracing::info!("No custom node paths configured");
            return Ok(RefreshResult::default());
        }

        tracing::info!(paths = ?paths, store = self.store.name(), "Refreshing custom nodes");

        let mut repository = self.store.open().await.map_err(Error::StoreUnavailable)?;
        let mut result = self.run(repository.as_mut(), &paths).await;

        if let Err(e) = repository.close().await {
            result.error(format!("Failed to close node store: {e}"));
        }

        tracing::info!(
            deleted = result.deleted,
            loaded = result.loaded,
            errors = result.errors.len(),
            "Custom node refresh finished"
        );
        Ok(result)
    }

    async fn run(&self, repository: &mut dyn NodeRepository, paths: &[String]) -> RefreshResult {
        let mut result = RefreshResult::default();

        match repository.delete_custom_nodes().await {
            Ok(deleted) => {
                tracing::info!(deleted, "Deleted custom nodes");
                result.deleted = deleted;
            }
            Err(e) => result.error(format!("Failed to delete custom nodes: {e}")),
        }

        let outcome = self.loader.load_custom_nodes(paths).await;
        for error in &outcome.errors {
            result.error(error.to_string());
        }

        if outcome.nodes.is_empty() {
            tracing::info!("No custom nodes found");
            return result;
        }

        for node in &outcome.nodes {
            self.persist(repository, node, &mut result).await;
        }

        result
    }

    async fn persist(
        &self,
        repository: &mut dyn NodeRepository,
        node: &LoadedNode,
        result: &mut RefreshResult,
    ) {
        let mut parsed = match self.parser.parse(&node.implementation, &node.package_name) {
            Ok(parsed) => parsed,
            Err(e) => {
                result.error(format!("Failed to process {}: {e}", node.node_name));
                return;
            }
        };

        if !parsed.has_required_fields() {
            result.error(format!("Missing required fields for {}", node.node_name));
            return;
        }

        parsed.set_provenance(node.source_type, node.source_path.clone());

        if parsed.is_tool_variant_eligible()
            && let Some(mut variant) = self.variants.generate(&parsed)
        {
            parsed.has_tool_variant = true;
            variant.set_provenance(SourceType::Custom, node.source_path.clone());
            match repository.save_node(&variant).await {
                Ok(()) => {
                    result.loaded += 1;
                    tracing::debug!(node = %variant.node_type, "Saved tool variant");
                }
                Err(e) => result.error(format!(
                    "Failed to save Tool variant for {}: {e}",
                    node.node_name
                )),
            }
        }

        match repository.save_node(&parsed).await {
            Ok(()) => {
                result.loaded += 1;
                tracing::debug!(node = %parsed.node_type, "Saved node");
            }
            Err(e) => result.error(format!("Failed to process {}: {e}", node.node_name)),
        }
    }
}

impl std::fmt::Debug for CustomNodeRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomNodeRefresher")
            .field("loader", &self.loader)
            .field("store", &self.store.name())
            .field("settings", &self.settings)
            .finish()
    }
}
