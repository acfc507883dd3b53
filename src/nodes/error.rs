use std::path::PathBuf;

/// Failures while resolving or loading node packages.
///
/// None of these abort a batch: each one reduces the nodes produced by a
/// single path, package or entry and is reported as a warning or a
/// package-level error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Parent directory does not exist: {}", path.display())]
    ParentDirectoryMissing { path: PathBuf },

    #[error("Path does not exist: {}", path.display())]
    PathMissing { path: PathBuf },

    #[error("No package.json found in: {}", path.display())]
    ManifestMissing { path: PathBuf },

    #[error("Failed to read manifest {}: {reason}", path.display())]
    ManifestUnreadable { path: PathBuf, reason: String },

    #[error("No n8n.nodes array found in {package}/package.json")]
    NodeListMissing { package: String },

    #[error("Node file not found: {}", path.display())]
    EntryFileMissing { path: PathBuf },

    #[error("Failed to load node from {}: {reason}", path.display())]
    EntryLoadFailed { path: PathBuf, reason: String },

    #[error("No valid export found for {node} in {package}")]
    NoValidExport { node: String, package: String },

    #[error("Package '{package}' not found (searched {} locations)", searched.len())]
    PackageNotFound {
        package: String,
        searched: Vec<PathBuf>,
    },

    #[error("Failed to scan directory {}: {reason}", path.display())]
    ScanFailed { path: PathBuf, reason: String },
}

impl LoadError {
    pub(crate) fn entry_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::EntryLoadFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
