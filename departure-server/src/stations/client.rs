//! MVG station directory (ZDM) client.

use serde::{Deserialize, Serialize};

use crate::domain::TransportType;

use super::error::StationError;

/// Default base URL of the station directory.
pub const DEFAULT_ZDM_BASE_URL: &str = "https://www.mvg.de/.rest/zdm";

/// One station of the directory listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub place: Option<String>,
    /// Global station id, e.g. `de:09162:1110`.
    pub id: String,
    pub diva_id: Option<i64>,
    #[serde(default)]
    pub products: Vec<TransportType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Configuration for the station directory client.
#[derive(Debug, Clone)]
pub struct StationClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StationClientConfig {
    /// Create a config for the production directory.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_ZDM_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for StationClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the MVG station directory.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: reqwest::Client,
    base_url: String,
}

impl StationClient {
    /// Create a new directory client.
    pub fn new(config: StationClientConfig) -> Result<Self, StationError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch every station of the directory.
    pub async fn fetch_all(&self) -> Result<Vec<DirectoryEntry>, StationError> {
        let url = format!("{}/stations", self.base_url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| StationError::Json {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = StationClientConfig::new();
        assert_eq!(config.base_url, DEFAULT_ZDM_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_with_base_url() {
        let config = StationClientConfig::new().with_base_url("http://localhost:8080");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn deserialize_entry() {
        let json = r#"{
            "name": "Forstenrieder Allee",
            "place": "München",
            "id": "de:09162:1110",
            "divaId": 1110,
            "abbreviation": "FA",
            "tariffZones": "m",
            "products": ["UBAHN", "BUS"],
            "latitude": 48.08982,
            "longitude": 11.51648
        }"#;

        let entry: DirectoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "de:09162:1110");
        assert_eq!(entry.diva_id, Some(1110));
        assert_eq!(
            entry.products,
            vec![TransportType::UBahn, TransportType::Bus]
        );
    }
}
