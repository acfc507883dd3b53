//! Pluggable configuration provider system.
//!
//! ```rust,no_run
//! use node_catalog::config::{ConfigBuilder, RefreshSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigBuilder::new().env().build();
//! let settings = RefreshSettings::load(&config).await?;
//! println!("{:?}", settings.custom_node_paths);
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod memory;
pub mod provider;
pub mod settings;

pub use composite::CompositeConfigProvider;
pub use env::EnvConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{
    CUSTOM_NODE_PATHS_KEY, NODE_DB_PATH_KEY, RefreshSettings, parse_custom_node_paths,
};

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Builds a [`CompositeConfigProvider`]; providers added first win.
#[derive(Default)]
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(mut self) -> Self {
        self.providers.push(Box::new(EnvConfigProvider::new()));
        self
    }

    pub fn env_with_prefix(mut self, prefix: &str) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::prefixed(prefix)));
        self
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> CompositeConfigProvider {
        let mut composite = CompositeConfigProvider::new();
        for provider in self.providers {
            composite.add_provider(provider);
        }
        composite
    }
}
