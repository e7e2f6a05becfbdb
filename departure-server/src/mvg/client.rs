//! MVG HTTP client.
//!
//! Provides async methods for the MVG location search and departure
//! endpoints. Concurrency is bounded by a semaphore so a burst of page
//! loads cannot flood the upstream API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::domain::{Departure, GlobalId};

use super::api::TransitApi;
use super::error::MvgError;
use super::types::Location;

/// Default base URL of the v2 API.
pub const DEFAULT_V2_BASE_URL: &str = "https://www.mvg.de/api/fib/v2";

/// Default base URL of the v3 API.
pub const DEFAULT_V3_BASE_URL: &str = "https://www.mvg.de/api/bgw-pt/v3";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How many bytes of an unparseable body end up in the error.
const BODY_SNIPPET_LEN: usize = 500;

/// API revision, which decides the endpoint paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// `/location` and `/departure`.
    #[default]
    V2,
    /// `/locations` and `/departures`.
    V3,
}

impl ApiVersion {
    /// Path of the location search endpoint.
    pub fn location_path(self) -> &'static str {
        match self {
            ApiVersion::V2 => "location",
            ApiVersion::V3 => "locations",
        }
    }

    /// Path of the departures endpoint.
    pub fn departure_path(self) -> &'static str {
        match self {
            ApiVersion::V2 => "departure",
            ApiVersion::V3 => "departures",
        }
    }

    /// Production base URL for this revision.
    pub fn default_base_url(self) -> &'static str {
        match self {
            ApiVersion::V2 => DEFAULT_V2_BASE_URL,
            ApiVersion::V3 => DEFAULT_V3_BASE_URL,
        }
    }
}

/// Configuration for the MVG client.
#[derive(Debug, Clone)]
pub struct MvgConfig {
    /// Base URL for the API (defaults to the production API of `version`)
    pub base_url: String,
    /// API revision
    pub version: ApiVersion,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MvgConfig {
    /// Create a config for the production API of the given revision.
    pub fn new(version: ApiVersion) -> Self {
        Self {
            base_url: version.default_base_url().to_string(),
            version,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for MvgConfig {
    fn default() -> Self {
        Self::new(ApiVersion::default())
    }
}

/// MVG API client.
#[derive(Debug, Clone)]
pub struct MvgClient {
    http: reqwest::Client,
    base_url: String,
    version: ApiVersion,
    semaphore: Arc<Semaphore>,
}

impl MvgClient {
    /// Create a new MVG client with the given configuration.
    pub fn new(config: MvgConfig) -> Result<Self, MvgError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            version: config.version,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Full URL of an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Search locations by free text.
    pub async fn get_locations(&self, query: &str) -> Result<Vec<Location>, MvgError> {
        let url = self.endpoint(self.version.location_path());
        self.get_json(&url, &[("query", query.to_string())]).await
    }

    /// Get upcoming departures for a station.
    ///
    /// # Arguments
    ///
    /// * `station` - Global station id
    /// * `limit` - Maximum number of departures to return
    pub async fn get_departures(
        &self,
        station: &GlobalId,
        limit: u16,
    ) -> Result<Vec<Departure>, MvgError> {
        let url = self.endpoint(self.version.departure_path());
        self.get_json(
            &url,
            &[
                ("globalId", station.as_str().to_string()),
                ("limit", limit.to_string()),
                ("offsetInMinutes", "0".to_string()),
            ],
        )
        .await
    }

    /// GET a URL and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, MvgError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| MvgError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        tracing::debug!(url = %url, "requesting");

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MvgError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| MvgError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_SNIPPET_LEN).collect()),
        })
    }
}

#[async_trait]
impl TransitApi for MvgClient {
    async fn locations(&self, query: &str) -> Result<Vec<Location>, MvgError> {
        self.get_locations(query).await
    }

    async fn departures(
        &self,
        station: &GlobalId,
        limit: u16,
    ) -> Result<Vec<Departure>, MvgError> {
        self.get_departures(station, limit).await
    }
}
