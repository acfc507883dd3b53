use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use super::module::ModuleExports;
use crate::common::normalize;

/// Loaded modules keyed by normalised file path.
///
/// Clones share the same entries. A package must be invalidated before its
/// files are loaded again, otherwise the previous exports are served.
#[derive(Debug, Clone, Default)]
pub struct ModuleCache {
    entries: Arc<DashMap<PathBuf, ModuleExports>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<ModuleExports> {
        self.entries.get(&normalize(path)).map(|e| e.value().clone())
    }

    pub fn insert(&self, path: &Path, exports: ModuleExports) {
        self.entries.insert(normalize(path), exports);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&normalize(path))
    }

    /// Removes every entry under `package_path`. Returns the number removed.
    pub fn invalidate(&self, package_path: &Path) -> usize {
        let prefix = normalize(package_path);
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(&prefix));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(path = %prefix.display(), removed, "Invalidated cached modules");
        }
        removed
    }

    /// Removes a single file's entry.
    pub fn evict(&self, file: &Path) -> bool {
        self.entries.remove(&normalize(file)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
