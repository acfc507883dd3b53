use std::path::{Path, PathBuf};

use super::manifest::PackageManifest;
use super::{CustomNodeSource, LoadError};
use crate::common::absolute;

/// Suffix marking a parent directory whose children are packages.
pub const WILDCARD_SUFFIX: &str = "/*";

/// Sources found by [`PathResolver::resolve`] plus every path that was skipped.
#[derive(Debug, Default)]
pub struct Resolution {
    pub sources: Vec<CustomNodeSource>,
    pub warnings: Vec<LoadError>,
}

/// Turns configured path entries into package locations.
///
/// An entry is either a package directory (`/opt/nodes/n8n-nodes-acme`)
/// or a parent directory followed by `/*`, whose immediate children are
/// inspected. Only directories containing a `package.json` are returned.
/// Wildcard children are visited in lexicographic order. Relative entries are
/// anchored at the working directory, so every source path is absolute.
pub struct PathResolver;

impl PathResolver {
    pub fn resolve<S: AsRef<str>>(raw_paths: &[S]) -> Resolution {
        let mut resolution = Resolution::default();

        for raw in raw_paths {
            let trimmed = raw.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }

            match trimmed.strip_suffix(WILDCARD_SUFFIX) {
                Some(parent) => Self::scan_children(&absolute(Path::new(parent)), &mut resolution),
                None => Self::resolve_direct(&absolute(Path::new(trimmed)), &mut resolution),
            }
        }

        resolution
    }

    fn resolve_direct(path: &Path, resolution: &mut Resolution) {
        if !path.exists() {
            Self::skip(resolution, LoadError::PathMissing {
                path: path.to_path_buf(),
            });
            return;
        }

        if !PackageManifest::exists_in(path) {
            Self::skip(resolution, LoadError::ManifestMissing {
                path: path.to_path_buf(),
            });
            return;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        resolution.sources.push(CustomNodeSource {
            name,
            path: path.to_path_buf(),
        });
    }

    fn scan_children(parent: &Path, resolution: &mut Resolution) {
        if !parent.exists() {
            Self::skip(resolution, LoadError::ParentDirectoryMissing {
                path: parent.to_path_buf(),
            });
            return;
        }

        let children = match Self::child_directories(parent) {
            Ok(children) => children,
            Err(e) => {
                Self::skip(resolution, LoadError::ScanFailed {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        for (name, path) in children {
            if PackageManifest::exists_in(&path) {
                resolution.sources.push(CustomNodeSource { name, path });
            } else {
                Self::skip(resolution, LoadError::ManifestMissing { path });
            }
        }
    }

    fn child_directories(parent: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(parent)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                children.push((name, parent.join(entry.file_name())));
            }
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children)
    }

    fn skip(resolution: &mut Resolution, warning: LoadError) {
        tracing::warn!("Skipping custom node path: {}", warning);
        resolution.warnings.push(warning);
    }
}
