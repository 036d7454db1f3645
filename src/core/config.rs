//! Service endpoints and session configuration
//!
//! `ServiceConfig` says where the collaborators live; `RemoteConfig` is what the
//! backend hands out from `GET /config` at session start.

use std::time::Duration;

use serde::Deserialize;

/// Locations and network policy for the external services
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Base URL of the routing backend (`/config`, `/find_path`, `/chat`)
    pub backend_url: String,

    /// Base URL of the geocoding provider
    pub geocoder_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Retries for idempotent lookups that fail at the transport level
    pub max_retries: u32,

    /// First backoff delay; doubles on each retry
    pub retry_base_delay: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            geocoder_url: "https://api.geoapify.com".to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1000),
        }
    }
}

impl ServiceConfig {
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = trim_base(url.into());
        self
    }

    pub fn with_geocoder_url(mut self, url: impl Into<String>) -> Self {
        self.geocoder_url = trim_base(url.into());
        self
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay = base_delay;
        self
    }

    pub fn config_url(&self) -> String {
        format!("{}/config", self.backend_url)
    }

    pub fn find_path_url(&self) -> String {
        format!("{}/find_path", self.backend_url)
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.backend_url)
    }

    pub fn geocode_url(&self) -> String {
        format!("{}/v1/geocode/search", self.geocoder_url)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Session configuration served by `GET /config`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    /// Tile token for the map renderer; passed through untouched
    #[serde(default)]
    pub mapbox_access_token: Option<String>,

    /// Key for the geocoding provider
    #[serde(default)]
    pub geoapify_api_key: Option<String>,
}
