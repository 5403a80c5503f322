//! Resolver configuration
//!
//! Settings that shape the HTTP transport shared by every provider adapter.
//! Loaded from `repobridge.toml`; a missing file yields the defaults.

pub mod store;

pub use store::ConfigStore;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scheme used to reach provider APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiScheme {
    #[default]
    Https,
    /// Plain HTTP, for local servers and unencrypted self-hosted instances
    Http,
}

impl ApiScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiScheme::Https => "https",
            ApiScheme::Http => "http",
        }
    }
}

/// Transport settings for the repository resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// `User-Agent` sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub scheme: ApiScheme,

    /// Request timeout; unset leaves timeouts to the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_user_agent() -> String {
    format!("repobridge/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            scheme: ApiScheme::default(),
            timeout_secs: None,
        }
    }
}

impl ResolverConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse repobridge.toml: {}", e))
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the HTTP client shared by all adapters.
    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
