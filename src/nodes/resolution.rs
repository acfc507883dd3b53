//! Standard module resolution for built-in packages.
//!
//! Built-in packages are looked up by identifier under a list of search
//! roots (`<root>/<identifier>/package.json`, e.g. a `node_modules`
//! directory). Packages compiled into the binary can be registered as
//! embedded manifests instead; their entry points are virtual paths served
//! by a [`FactoryTable`](super::FactoryTable).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::LoadError;
use super::manifest::PackageManifest;
use crate::common::resolve_relative;

const MODULES_DIR: &str = "node_modules";

#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub name: String,
    pub root: PathBuf,
    pub manifest: PackageManifest,
    pub embedded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleResolution {
    search_roots: Vec<PathBuf>,
    embedded: HashMap<String, PackageManifest>,
}

impl ModuleResolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolution rooted at `./node_modules` of the working directory.
    pub fn from_current_dir() -> Self {
        match std::env::current_dir() {
            Ok(cwd) => Self::new().search_root(cwd.join(MODULES_DIR)),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot determine working directory");
                Self::new()
            }
        }
    }

    pub fn search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_roots.push(root.into());
        self
    }

    pub fn embedded(mut self, name: impl Into<String>, manifest: PackageManifest) -> Self {
        self.embedded.insert(name.into(), manifest);
        self
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    pub async fn resolve_package(&self, identifier: &str) -> Result<ResolvedPackage, LoadError> {
        let mut searched = Vec::with_capacity(self.search_roots.len());

        for root in &self.search_roots {
            let candidate = root.join(identifier);
            if PackageManifest::exists_in(&candidate) {
                let manifest = PackageManifest::load(&candidate).await?;
                return Ok(ResolvedPackage {
                    name: identifier.to_string(),
                    root: candidate,
                    manifest,
                    embedded: false,
                });
            }
            searched.push(candidate);
        }

        if let Some(manifest) = self.embedded.get(identifier) {
            return Ok(ResolvedPackage {
                name: identifier.to_string(),
                root: PathBuf::from(identifier),
                manifest: manifest.clone(),
                embedded: true,
            });
        }

        Err(LoadError::PackageNotFound {
            package: identifier.to_string(),
            searched,
        })
    }

    /// Resolves a manifest entry inside `package`. On-disk entries must exist.
    pub async fn resolve_entry(
        &self,
        package: &ResolvedPackage,
        entry: &str,
    ) -> Result<PathBuf, LoadError> {
        let path = resolve_relative(&package.root, entry);
        if package.embedded || file_exists(&path).await {
            Ok(path)
        } else {
            Err(LoadError::EntryFileMissing { path })
        }
    }
}

pub(crate) async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
