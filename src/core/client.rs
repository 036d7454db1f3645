//! HTTP clients for the backend and the geocoding provider

use std::time::Duration;

use log::{debug, warn};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::chat::{ChatReply, ChatService};
use crate::core::config::{RemoteConfig, ServiceConfig};
use crate::core::coordinator::RoutingService;
use crate::core::error::{Error, Result};
use crate::core::geo::GeoPoint;
use crate::core::resolver::Geocoder;
use crate::core::route::{PathResponse, RouteRequest};

/// Shared HTTP client; per-call timeouts come from `ServiceConfig`
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("yyc-route/{}", env!("YYC_ROUTE_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {e}");
            Client::new()
        })
});

/// Execute an idempotent operation, retrying transport failures with exponential backoff
async fn retry_on_network_error<F, Fut, T>(config: &ServiceConfig, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(Error::NetworkFailure(msg)) if attempt < config.max_retries => {
                attempt += 1;
                let delay = config.retry_base_delay * (1 << (attempt - 1));
                warn!("Network error (attempt {attempt}): {msg}. Retrying in {delay:?}...");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Non-blank `error` field of a response body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|ErrorBody { error }| error)
        .filter(|error| !error.trim().is_empty())
}

/// Map a non-success response to `ServiceError`, keeping the server's message when it sent one
fn service_error(status: StatusCode, body: &str) -> Error {
    Error::ServiceError(error_message(body).unwrap_or_else(|| format!("HTTP error! Status: {status}")))
}

/// Client for the routing backend: `/config`, `/find_path` and `/chat`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ServiceConfig,
}

impl HttpBackend {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            client: GLOBAL_CLIENT.clone(),
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Fetch the session configuration; any failure here aborts session start
    pub async fn fetch_config(&self) -> Result<RemoteConfig> {
        let url = self.config.config_url();
        let fetched = retry_on_network_error(&self.config, || async {
            let response = self.client.get(&url).timeout(self.config.request_timeout).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::ConfigUnavailable(format!("{url} returned {status}")));
            }
            Ok(response.json::<RemoteConfig>().await?)
        })
        .await;

        fetched.map_err(|e| match e {
            Error::ConfigUnavailable(_) => e,
            other => Error::ConfigUnavailable(other.to_string()),
        })
    }
}

impl RoutingService for HttpBackend {
    async fn find_path(&self, request: &RouteRequest) -> Result<PathResponse> {
        let url = self.config.find_path_url();
        debug!("Initiating find_path with start={} end={}", request.start, request.end);

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("find_path responded {status} with {} bytes", body.len());

        if !status.is_success() {
            return Err(service_error(status, &body));
        }
        PathResponse::parse(&body)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

impl ChatService for HttpBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        let response = self
            .client
            .post(self.config.chat_url())
            .timeout(self.config.request_timeout)
            .json(&ChatRequest { message })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only a stated reason is worth showing in the conversation
            return Err(match error_message(&body) {
                Some(reason) => Error::ServiceError(reason),
                None => Error::InvalidResponse(format!("chat returned {status}")),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Geoapify forward geocoder
#[derive(Debug, Clone)]
pub struct GeoapifyGeocoder {
    client: Client,
    config: ServiceConfig,
    api_key: String,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Deserialize)]
struct GeocodeFeature {
    geometry: GeocodeGeometry,
}

#[derive(Deserialize)]
struct GeocodeGeometry {
    coordinates: [f64; 2],
}

impl GeoapifyGeocoder {
    pub fn new(config: ServiceConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: GLOBAL_CLIENT.clone(),
            config,
            api_key: api_key.into(),
        }
    }
}

impl Geocoder for GeoapifyGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>> {
        let url = self.config.geocode_url();
        let data = retry_on_network_error(&self.config, || async {
            let response = self
                .client
                .get(&url)
                .timeout(self.config.request_timeout)
                .query(&[("text", query), ("limit", "1"), ("apiKey", self.api_key.as_str())])
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::ServiceError(format!("geocoder returned {status}")));
            }
            Ok(response.json::<GeocodeResponse>().await?)
        })
        .await?;

        let point = data
            .features
            .first()
            .map(|feature| GeoPoint::from_lon_lat(feature.geometry.coordinates));
        debug!("Geocoding result for \"{query}\": {point:?}");
        Ok(point)
    }
}
