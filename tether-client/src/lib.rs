//! Tether Client
//!
//! A type-safe client for the job platform API, built around waiting on the
//! result of a remote job run.
//!
//! Results are obtained by polling the run status endpoint, optionally sped
//! up by a push notification channel that wakes the waiter as soon as the
//! platform announces the run has finished.
//!
//! # Example
//!
//! ```no_run
//! use tether_client::{PlatformClient, WaitConfig, transport};
//! use tether_core::domain::run::JobRunIdentity;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PlatformClient::new("https://api.example.com");
//!     let transport = transport::default_transport();
//!
//!     let waiter = client
//!         .watch_run(JobRunIdentity::new(1, 20), transport.as_ref(), &WaitConfig::default())
//!         .await;
//!
//!     let status = waiter.result().await?;
//!     println!("Run finished: {}", status.state);
//!     Ok(())
//! }
//! ```

mod channels;
pub mod config;
pub mod error;
mod jobs;
pub mod transport;
pub mod waiter;

// Re-export commonly used types
pub use channels::ChannelCache;
pub use config::WaitConfig;
pub use error::{ClientError, Result};
pub use waiter::{JobFailure, ResultWaiter, StatusSource, WaitError, WaiterState};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the job platform API
///
/// Methods are organized into logical groups:
/// - Job runs (status, listing, waiting)
/// - Notification channels
#[derive(Debug, Clone)]
pub struct PlatformClient {
    /// Base URL of the API (e.g., "https://api.example.com")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token sent with every request
    api_key: Option<String>,
    /// Notification channel configuration, fetched on first use
    channel_cache: ChannelCache,
}

impl PlatformClient {
    /// Create a new platform client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "https://api.example.com")
    ///
    /// # Example
    /// ```
    /// use tether_client::PlatformClient;
    ///
    /// let client = PlatformClient::new("https://api.example.com");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new platform client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use tether_client::PlatformClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = PlatformClient::with_client("https://api.example.com", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            api_key: None,
            channel_cache: ChannelCache::default(),
        }
    }

    /// Authenticate every request with the given API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cache holding the notification channel configuration
    pub fn channel_cache(&self) -> &ChannelCache {
        &self.channel_cache
    }

    /// Start a request against `path`, relative to the base URL
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);

        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
