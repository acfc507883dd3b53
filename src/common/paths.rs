use std::path::{Component, Path, PathBuf};

/// Resolve `relative` against `root` and normalise `.` / `..` lexically.
///
/// Absolute `relative` values replace `root`, mirroring how package managers
/// resolve entry points. The filesystem is not consulted.
pub fn resolve_relative(root: &Path, relative: &str) -> PathBuf {
    normalize(&root.join(relative))
}

/// Anchor `path` at the working directory and normalise it lexically.
///
/// Falls back to the normalised input when the working directory is
/// unavailable.
pub fn absolute(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(absolute) => normalize(&absolute),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Could not make path absolute");
            normalize(path)
        }
    }
}

pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
