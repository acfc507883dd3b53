//! # node-catalog
//!
//! Discovery, loading and re-indexing of node packages for an automation
//! platform.
//!
//! Node packages are directories with a `package.json` that declares node
//! entry files under `n8n.nodes`. This crate resolves package locations,
//! loads their entries through pluggable loader strategies with cache
//! invalidation for hot reload, and refreshes a persisted node catalogue
//! with per-item error reporting.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use node_catalog::config::ConfigBuilder;
//! use node_catalog::refresh::CustomNodeRefresher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), node_catalog::Error> {
//!     let config = ConfigBuilder::new().env().build();
//!     let refresher = CustomNodeRefresher::from_config(&config).await?;
//!     let result = refresher.refresh(None).await?;
//!     println!("{}", result.message());
//!     for error in &result.errors {
//!         eprintln!("  {}", error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Loading Without Persisting
//!
//! ```rust,no_run
//! use node_catalog::nodes::NodeLoader;
//!
//! # async fn example() {
//! let loader = NodeLoader::new();
//! let outcome = loader.load_custom_nodes(&["/opt/custom-nodes/*"]).await;
//! for node in &outcome.nodes {
//!     println!("{} / {}", node.package_name, node.node_name);
//! }
//! for warning in &outcome.warnings {
//!     eprintln!("skipped: {}", warning);
//! }
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod nodes;
pub mod refresh;

pub use common::{SourceType, derive_node_name};
pub use config::{
    CompositeConfigProvider, ConfigBuilder, ConfigError, ConfigProvider, EnvConfigProvider,
    MemoryConfigProvider, RefreshSettings,
};
pub use nodes::{
    CustomNodeSource, LoadError, LoadOutcome, LoadedNode, ModuleCache, ModuleExports,
    ModuleStrategy, NodeImplementation, NodeLoader, PathResolver,
};
pub use refresh::{
    CustomNodeRefresher, DescriptionParser, JsonFileNodeStore, MemoryNodeStore, NodeParser,
    NodeRepository, NodeStore, ParsedNode, RefreshResult, StoreError, SuffixToolVariantGenerator,
    ToolVariantGenerator,
};

/// Error type for node-catalog operations.
///
/// Loading and persistence failures of individual packages or nodes are not
/// errors at this level; they are reported through
/// [`LoadOutcome`] and [`RefreshResult`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The node store could not be located or opened.
    #[error("Node store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
