//! Configuration module
//!
//! Handles CLI configuration: where the platform API lives and how to
//! authenticate against it.

use tether_client::PlatformClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the platform API
    pub api_url: String,

    /// API key sent as a bearer token
    pub api_key: Option<String>,
}

impl Config {
    /// Build a platform client from this configuration
    pub fn client(&self) -> PlatformClient {
        let client = PlatformClient::new(&self.api_url);
        match &self.api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        }
    }
}
