//! Node package discovery and module loading.
//!
//! Two loaders share one [`ModuleCache`]:
//! - [`NodeLoader::load_all_nodes`] reads the built-in packages through
//!   [`ModuleResolution`]
//! - [`NodeLoader::load_custom_nodes`] reads packages from configured paths
//!   resolved by [`PathResolver`], invalidating each package first so that
//!   on-disk edits are observed
//!
//! A package is a directory with a `package.json` that lists its node entry
//! files under `n8n.nodes`:
//!
//! ```text
//! /opt/custom-nodes/
//! └── n8n-nodes-acme/
//!     ├── package.json        {"name": "n8n-nodes-acme",
//!     │                        "n8n": {"nodes": ["dist/nodes/Weather/Weather.node.json"]}}
//!     └── dist/nodes/Weather/
//!         └── Weather.node.json
//! ```
//!
//! Entry files are turned into [`ModuleExports`] by a [`ModuleStrategy`].
//! Failures never abort a batch; they are collected in [`LoadOutcome`].

mod cache;
mod error;
mod loader;
mod manifest;
mod module;
mod resolution;
mod resolver;
mod strategy;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use cache::ModuleCache;
pub use error::LoadError;
pub use loader::{DEFAULT_CORE_PACKAGES, LoadOutcome, NodeLoader};
pub use manifest::{MANIFEST_FILE, NodeList, PackageManifest, PlatformSection};
pub use module::{
    DEFAULT_EXPORT, DeclarativeNode, ModuleExports, NodeDefinition, NodeImplementation,
};
pub use resolution::{ModuleResolution, ResolvedPackage};
pub use resolver::{PathResolver, Resolution, WILDCARD_SUFFIX};
pub use strategy::{FactoryTable, JsonModules, ModuleFactory, ModuleStrategy, StrategyChain};

use crate::common::SourceType;

/// A custom package location that passed path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomNodeSource {
    /// Directory name of the package.
    pub name: String,
    pub path: PathBuf,
}

/// One node produced by a loader, with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedNode {
    pub package_name: String,
    pub node_name: String,
    pub implementation: NodeImplementation,
    pub source_type: SourceType,
    /// Package directory for custom nodes; `None` for built-in ones.
    pub source_path: Option<PathBuf>,
}

impl LoadedNode {
    pub fn description(&self) -> &serde_json::Value {
        self.implementation.description()
    }

    pub fn is_custom(&self) -> bool {
        self.source_type.is_custom()
    }
}
