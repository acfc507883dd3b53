use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::ParsedNode;
use super::store::{NodeRepository, NodeStore, StoreError};
use crate::config::RefreshSettings;

const DATA_DIR: &str = "data";
const DATA_FILE: &str = "nodes.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct NodeDocument {
    #[serde(default)]
    nodes: Vec<ParsedNode>,
}

/// Node catalogue kept in a single JSON document.
///
/// The document is looked up at the explicit path first, then at
/// `<working dir>/data/nodes.json`, then at `data/nodes.json` next to the
/// installed binary (`<exe dir>/../data/nodes.json`). The store never creates
/// the document on `open`; see [`JsonFileNodeStore::initialize`].
///
/// Every save and delete rewrites the document before returning, so a failed
/// write is reported against the operation that caused it.
#[derive(Debug, Clone, Default)]
pub struct JsonFileNodeStore {
    explicit: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    install_dir: Option<PathBuf>,
}

impl JsonFileNodeStore {
    pub fn new() -> Self {
        Self {
            explicit: None,
            working_dir: std::env::current_dir().ok(),
            install_dir: std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf)),
        }
    }

    /// Default lookup, preferring `settings.database_path` when set.
    pub fn from_settings(settings: &RefreshSettings) -> Self {
        let store = Self::new();
        match &settings.database_path {
            Some(path) => store.with_path(path),
            None => store,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn without_install_dir(mut self) -> Self {
        self.install_dir = None;
        self
    }

    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(3);
        candidates.extend(self.explicit.clone());
        candidates.extend(
            [&self.working_dir, &self.install_dir]
                .into_iter()
                .flatten()
                .map(|dir| dir.join(DATA_DIR).join(DATA_FILE)),
        );
        candidates
    }

    /// Returns the first existing candidate.
    pub async fn locate(&self) -> Result<PathBuf, StoreError> {
        let candidates = self.candidates();
        for candidate in &candidates {
            if tokio::fs::try_exists(candidate).await.unwrap_or(false) {
                if let Some(explicit) = &self.explicit
                    && explicit != candidate
                {
                    tracing::warn!(
                        requested = %explicit.display(),
                        using = %candidate.display(),
                        "Node database not found at requested path, falling back"
                    );
                }
                return Ok(candidate.clone());
            }
        }
        Err(StoreError::NotFound {
            searched: candidates,
        })
    }

    /// Where [`initialize`](Self::initialize) puts a new catalogue: the
    /// explicit path, else `<working dir>/data/nodes.json`.
    pub fn default_location(&self) -> Option<PathBuf> {
        self.explicit.clone().or_else(|| {
            self.working_dir
                .as_ref()
                .map(|dir| dir.join(DATA_DIR).join(DATA_FILE))
        })
    }

    /// Creates an empty catalogue at [`default_location`](Self::default_location)
    /// unless one exists there, returning its path.
    pub async fn initialize(&self) -> Result<PathBuf, StoreError> {
        let path = self.default_location().ok_or_else(|| StoreError::NotFound {
            searched: Vec::new(),
        })?;
        Self::create(&path).await?;
        tracing::info!(path = %path.display(), "Node database ready");
        Ok(path)
    }

    /// Writes an empty catalogue at `path` unless one already exists.
    pub async fn create(path: &Path) -> Result<(), StoreError> {
        if tokio::fs::try_exists(path).await? {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_atomic(path, &NodeDocument::default()).await
    }
}

#[async_trait]
impl NodeStore for JsonFileNodeStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn open(&self) -> Result<Box<dyn NodeRepository>, StoreError> {
        let path = self.locate().await?;
        let content = tokio::fs::read_to_string(&path).await?;
        let document: NodeDocument = if content.trim().is_empty() {
            NodeDocument::default()
        } else {
            serde_json::from_str(&content)?
        };

        tracing::info!(path = %path.display(), records = document.nodes.len(), "Opened node store");

        Ok(Box::new(JsonFileRepository {
            path,
            nodes: document.nodes,
            open: true,
        }))
    }
}

struct JsonFileRepository {
    path: PathBuf,
    nodes: Vec<ParsedNode>,
    open: bool,
}

impl JsonFileRepository {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    /// Writes `nodes` and adopts them only once they are on disk.
    async fn commit(&mut self, nodes: Vec<ParsedNode>) -> Result<(), StoreError> {
        let document = NodeDocument { nodes };
        write_atomic(&self.path, &document).await?;
        tracing::trace!(path = %self.path.display(), records = document.nodes.len(), "Flushed node store");
        self.nodes = document.nodes;
        Ok(())
    }
}

#[async_trait]
impl NodeRepository for JsonFileRepository {
    async fn delete_custom_nodes(&mut self) -> Result<usize, StoreError> {
        self.ensure_open()?;
        let kept: Vec<ParsedNode> = self
            .nodes
            .iter()
            .filter(|node| !node.is_custom())
            .cloned()
            .collect();
        let removed = self.nodes.len() - kept.len();
        if removed > 0 {
            self.commit(kept).await?;
        }
        Ok(removed)
    }

    async fn save_node(&mut self, node: &ParsedNode) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut nodes = self.nodes.clone();
        match nodes.iter_mut().find(|n| n.node_type == node.node_type) {
            Some(existing) => *existing = node.clone(),
            None => nodes.push(node.clone()),
        }
        self.commit(nodes).await
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        if std::mem::replace(&mut self.open, false) {
            tracing::debug!(path = %self.path.display(), records = self.nodes.len(), "Closed node store");
        }
        Ok(())
    }
}

/// Writes to a uniquely named sibling and renames it over `path`. The
/// temporary file is removed when either step fails.
async fn write_atomic(path: &Path, document: &NodeDocument) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(document)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DATA_FILE.to_string());
    let temp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let written = match tokio::fs::write(&temp, content).await {
        Ok(()) => tokio::fs::rename(&temp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }
    Ok(())
}
