//! Configuration Provider Trait

use super::ConfigResult;

/// Read-side configuration source.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Get a raw configuration value
    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Convenience reads on top of [`ConfigProvider::get_raw`]
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a raw value, treating blank strings as absent
    fn get_non_blank(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<String>>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self
                .get_raw(key)
                .await?
                .filter(|value| !value.trim().is_empty()))
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}
