//! Environment Variable Configuration Provider
//!
//! Dotted keys map to upper-snake variables: `custom.node.paths` is read from
//! `CUSTOM_NODE_PATHS`.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

/// Read-only environment variable configuration provider.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let base = key.to_uppercase().replace('.', "_");
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, base),
            None => base,
        }
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.env_key(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_conversion() {
        let provider = EnvConfigProvider::new();
        assert_eq!(provider.env_key("custom.node.paths"), "CUSTOM_NODE_PATHS");
        assert_eq!(provider.env_key("node.db.path"), "NODE_DB_PATH");

        let provider = EnvConfigProvider::prefixed("CATALOG_");
        assert_eq!(provider.env_key("node.db.path"), "CATALOG_NODE_DB_PATH");
    }

    #[tokio::test]
    async fn test_env_provider_get() {
        let provider = EnvConfigProvider::prefixed("NODE_CATALOG_TEST_");

        // SAFETY: Test-only environment setup
        unsafe { std::env::set_var("NODE_CATALOG_TEST_CUSTOM_NODE_PATHS", "/a,/b") };
        let value = provider.get_raw("custom.node.paths").await.unwrap();
        assert_eq!(value, Some("/a,/b".to_string()));
        unsafe { std::env::remove_var("NODE_CATALOG_TEST_CUSTOM_NODE_PATHS") };
    }

    #[tokio::test]
    async fn test_env_provider_not_found() {
        let provider = EnvConfigProvider::prefixed("NONEXISTENT_PREFIX_");
        let value = provider.get_raw("some.key").await.unwrap();
        assert_eq!(value, None);
    }
}
