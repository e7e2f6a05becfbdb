//! Mock transit API for running without network access.
//!
//! Loads sample location and departure data from JSON files and serves it
//! as if it came from the live API.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Departure, GlobalId, Station};

use super::api::TransitApi;
use super::convert::convert_location;
use super::error::MvgError;
use super::types::Location;

/// File holding the location search results.
pub const LOCATIONS_FILE: &str = "locations.json";

/// File name stem for a station's departures.
///
/// Colons are not portable in file names, so `de:09162:1110` is stored as
/// `de_09162_1110.json`.
pub fn fixture_stem(id: &GlobalId) -> String {
    id.as_str().replace(':', "_")
}

#[derive(Debug, Default)]
struct MockData {
    locations: Vec<Location>,
    departures: HashMap<GlobalId, Vec<Departure>>,
}

/// Transit API that serves data from JSON files.
///
/// Expects a directory with `locations.json` (an array of location search
/// records) and one `{stem}.json` departure array per station, see
/// [`fixture_stem`]. The files are read once, at construction.
#[derive(Clone)]
pub struct MockTransitApi {
    data: Arc<MockData>,
}

impl MockTransitApi {
    /// Create a mock by loading JSON files from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, MvgError> {
        let data = load(data_dir.as_ref())?;
        tracing::debug!(
            locations = data.locations.len(),
            stations = data.departures.len(),
            "loaded mock data"
        );
        Ok(Self {
            data: Arc::new(data),
        })
    }

    /// Stations among the location fixtures, for a fixed directory.
    pub fn stations(&self) -> Vec<Station> {
        self.data
            .locations
            .iter()
            .filter_map(|l| convert_location(l).ok())
            .collect()
    }
}

fn load(data_dir: &Path) -> Result<MockData, MvgError> {
    let mut data = MockData::default();

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        MvgError::NotConfigured(format!("failed to read mock data directory: {e}"))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            MvgError::NotConfigured(format!("failed to read directory entry: {e}"))
        })?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let json = std::fs::read_to_string(&path)
            .map_err(|e| MvgError::NotConfigured(format!("failed to read {path:?}: {e}")))?;

        let parse_error = |e: serde_json::Error| MvgError::Json {
            message: format!("{path:?}: {e}"),
            body: None,
        };

        if path.file_name().and_then(|s| s.to_str()) == Some(LOCATIONS_FILE) {
            data.locations = serde_json::from_str(&json).map_err(parse_error)?;
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MvgError::NotConfigured(format!("invalid filename: {path:?}")))?;

        let id = GlobalId::parse(&stem.replace('_', ":")).map_err(|_| {
            MvgError::NotConfigured(format!("invalid station id in filename: {stem}"))
        })?;

        let departures: Vec<Departure> = serde_json::from_str(&json).map_err(parse_error)?;
        data.departures.insert(id, departures);
    }

    if data.departures.is_empty() {
        return Err(MvgError::NotConfigured(format!(
            "no departure files found in {data_dir:?}"
        )));
    }

    Ok(data)
}

#[async_trait]
impl TransitApi for MockTransitApi {
    /// Case-insensitive substring match on the location name.
    async fn locations(&self, query: &str) -> Result<Vec<Location>, MvgError> {
        let needle = query.trim().to_lowercase();

        Ok(self
            .data
            .locations
            .iter()
            .filter(|l| {
                l.name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    /// Static departures, truncated to `limit`.
    async fn departures(
        &self,
        station: &GlobalId,
        limit: u16,
    ) -> Result<Vec<Departure>, MvgError> {
        let departures = self.data.departures.get(station).ok_or_else(|| MvgError::Api {
            status: 404,
            message: format!("no mock data for station {station}"),
        })?;

        Ok(departures.iter().take(limit as usize).cloned().collect())
    }
}
