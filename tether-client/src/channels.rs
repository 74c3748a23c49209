//! Notification channel endpoints and cache

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Method;
use tether_core::dto::channel::ChannelConfig;
use tracing::debug;

use crate::PlatformClient;
use crate::error::Result;

/// Explicitly invalidated cache for the notification channel configuration
///
/// Clones share the same slot, so every clone of a [`PlatformClient`] sees
/// the same cached value and the same invalidation.
#[derive(Debug, Clone, Default)]
pub struct ChannelCache {
    slot: Arc<RwLock<Option<Arc<ChannelConfig>>>>,
}

impl ChannelCache {
    /// The cached configuration, if any
    pub fn get(&self) -> Option<Arc<ChannelConfig>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the cached configuration
    pub fn store(&self, config: ChannelConfig) -> Arc<ChannelConfig> {
        let config = Arc::new(config);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&config));
        config
    }

    /// Drop the cached configuration so the next lookup refetches it
    pub fn invalidate(&self) {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl PlatformClient {
    // =============================================================================
    // Notification Channels
    // =============================================================================

    /// Fetch the notification channel configuration, bypassing the cache
    pub async fn list_channels(&self) -> Result<ChannelConfig> {
        let response = self.request(Method::GET, "/channels").send().await?;

        self.handle_response(response).await
    }

    /// Notification channel configuration, fetched once and then cached
    ///
    /// Call [`ChannelCache::invalidate`] on [`PlatformClient::channel_cache`]
    /// to force a refetch (e.g. after the auth key was rotated).
    pub async fn channels(&self) -> Result<Arc<ChannelConfig>> {
        if let Some(config) = self.channel_cache.get() {
            return Ok(config);
        }

        debug!("Fetching notification channel configuration");
        let config = self.list_channels().await?;
        Ok(self.channel_cache.store(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> ChannelConfig {
        ChannelConfig {
            endpoint: endpoint.to_string(),
            auth_key: None,
            channels: vec![],
        }
    }

    #[test]
    fn test_cache_starts_empty() {
        assert!(ChannelCache::default().get().is_none());
    }

    #[test]
    fn test_store_and_invalidate() {
        let cache = ChannelCache::default();
        cache.store(config("ws://one"));
        assert_eq!(cache.get().unwrap().endpoint, "ws://one");

        cache.store(config("ws://two"));
        assert_eq!(cache.get().unwrap().endpoint, "ws://two");

        cache.invalidate();
        assert!(cache.get().is_none());

        // Invalidating an empty cache is fine
        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[tokio::test]
    async fn test_channels_served_from_cache() {
        // Unroutable base URL: any actual request would fail
        let client = PlatformClient::new("http://127.0.0.1:9");
        client.channel_cache().store(config("ws://cached"));

        let channels = client.channels().await.unwrap();
        assert_eq!(channels.endpoint, "ws://cached");
    }
}
