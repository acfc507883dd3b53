//! Composite Configuration Provider
//!
//! Earlier providers take precedence over later ones.

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_provider(&mut self, provider: Box<dyn ConfigProvider>) {
        self.providers.push(provider);
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        for provider in &self.providers {
            if let Some(value) = provider.get_raw(key).await? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for CompositeConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeConfigProvider")
            .field("provider_names", &self.provider_names())
            .finish()
    }
}
