//! Node store backends.
//!
//! A [`NodeStore`] locates and opens the persisted catalogue; the returned
//! [`NodeRepository`] handle is owned by one refresh run and closed before it
//! returns.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::record::ParsedNode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Node database not found (searched: {}). Create one with `refresh-custom-nodes --init`.", display_paths(searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("Node store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected for {node_type}: {reason}")]
    Rejected { node_type: String, reason: String },

    #[error("Store is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
pub trait NodeStore: Send + Sync {
    fn name(&self) -> &str;

    async fn open(&self) -> Result<Box<dyn NodeRepository>, StoreError>;
}

/// Handle to an open store. Saves upsert by `node_type`.
#[async_trait]
pub trait NodeRepository: Send {
    /// Removes every record with custom provenance, returning how many.
    async fn delete_custom_nodes(&mut self) -> Result<usize, StoreError>;

    async fn save_node(&mut self, node: &ParsedNode) -> Result<(), StoreError>;

    async fn close(&mut self) -> Result<(), StoreError>;
}

/// In-process store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeStore {
    records: Arc<RwLock<HashMap<String, ParsedNode>>>,
    unavailable: Option<String>,
    close_failure: Option<String>,
    rejected: Arc<HashSet<String>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `open` fail with `reason`.
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    /// Makes every `close` fail with `reason`. Records are kept.
    pub fn fail_close(mut self, reason: impl Into<String>) -> Self {
        self.close_failure = Some(reason.into());
        self
    }

    /// Makes saves of `node_type` fail.
    pub fn reject_saves_for(mut self, node_type: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.rejected).insert(node_type.into());
        self
    }

    pub async fn insert(&self, node: ParsedNode) {
        self.records.write().await.insert(node.node_type.clone(), node);
    }

    pub async fn get(&self, node_type: &str) -> Option<ParsedNode> {
        self.records.read().await.get(node_type).cloned()
    }

    /// All records ordered by node type.
    pub async fn records(&self) -> Vec<ParsedNode> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.node_type.cmp(&b.node_type));
        records
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open(&self) -> Result<Box<dyn NodeRepository>, StoreError> {
        if let Some(reason) = &self.unavailable {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryRepository {
            store: self.clone(),
            open: true,
        }))
    }
}

struct MemoryRepository {
    store: MemoryNodeStore,
    open: bool,
}

impl MemoryRepository {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }
}

#[async_trait]
impl NodeRepository for MemoryRepository {
    async fn delete_custom_nodes(&mut self) -> Result<usize, StoreError> {
        self.ensure_open()?;
        let mut records = self.store.records.write().await;
        let before = records.len();
        records.retain(|_, node| !node.is_custom());
        Ok(before - records.len())
    }

    async fn save_node(&mut self, node: &ParsedNode) -> Result<(), StoreError> {
        self.ensure_open()?;
        if self.store.rejected.contains(&node.node_type) {
            return Err(StoreError::Rejected {
                node_type: node.node_type.clone(),
                reason: "configured to fail".into(),
            });
        }
        self.store
            .records
            .write()
            .await
            .insert(node.node_type.clone(), node.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        if std::mem::replace(&mut self.open, false) {
            self.store.closed.fetch_add(1, Ordering::SeqCst);
        }
        match &self.store.close_failure {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}
