//! Custom node refresh pipeline.
//!
//! [`CustomNodeRefresher::refresh`] deletes every custom record from the
//! [`NodeStore`], loads the configured packages through the
//! [`NodeLoader`](crate::nodes::NodeLoader), and persists each node through
//! the collaborator seams:
//!
//! - [`NodeParser`] turns a loaded implementation into a [`ParsedNode`]
//! - [`ToolVariantGenerator`] derives the AI-callable variant of eligible nodes
//! - [`NodeRepository`] stores and deletes records
//!
//! ```rust,no_run
//! use node_catalog::refresh::{CustomNodeRefresher, JsonFileNodeStore};
//!
//! # async fn example() -> node_catalog::Result<()> {
//! let refresher = CustomNodeRefresher::new(JsonFileNodeStore::new())
//!     .with_paths(["/opt/custom-nodes/*"]);
//! let result = refresher.refresh(None).await?;
//! println!("{}", result.message());
//! # Ok(())
//! # }
//! ```

mod json_store;
mod parser;
mod record;
mod refresher;
mod store;
mod variant;

use serde::{Deserialize, Serialize};

pub use json_store::JsonFileNodeStore;
pub use parser::{DescriptionParser, NodeParser, ParseError};
pub use record::ParsedNode;
pub use refresher::CustomNodeRefresher;
pub use store::{MemoryNodeStore, NodeRepository, NodeStore, StoreError};
pub use variant::{SuffixToolVariantGenerator, ToolVariantGenerator};

/// Summary of one refresh run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResult {
    /// Custom records removed before loading.
    pub deleted: usize,
    /// Records persisted, tool variants included.
    pub loaded: usize,
    pub errors: Vec<String>,
}

impl RefreshResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message(&self) -> String {
        let mut message = format!(
            "Refreshed custom nodes: {} deleted, {} loaded",
            self.deleted, self.loaded
        );
        if !self.errors.is_empty() {
            message.push_str(&format!(", {} errors", self.errors.len()));
        }
        message
    }

    pub(crate) fn error(&mut self, message: String) {
        tracing::error!("{}", message);
        self.errors.push(message);
    }
}

impl std::fmt::Display for RefreshResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
