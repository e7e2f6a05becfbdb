//! In-memory station directory with search.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{GlobalId, Station};

use super::client::{DirectoryEntry, StationClient};
use super::error::StationError;

/// Upper bound for search results.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Thread-safe station directory.
///
/// Holds every station known to MVG with support for background refresh.
/// The list is replaced whole on refresh.
#[derive(Clone)]
pub struct StationDirectory {
    inner: Arc<RwLock<Vec<Station>>>,
    client: Option<StationClient>,
}

impl StationDirectory {
    /// Create a directory by fetching from the API.
    pub async fn fetch(client: StationClient) -> Result<Self, StationError> {
        let entries = client.fetch_all().await?;

        Ok(Self {
            inner: Arc::new(RwLock::new(build_directory(entries))),
            client: Some(client),
        })
    }

    /// Create an empty directory that can still be refreshed later.
    pub fn empty(client: StationClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
            client: Some(client),
        }
    }

    /// Create a directory with a fixed station list (mock mode, tests).
    pub fn fixed(stations: Vec<Station>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(stations)),
            client: None,
        }
    }

    /// Refresh the station data from the API.
    ///
    /// On success, replaces the current list. On failure, the existing list
    /// is preserved and the error is returned.
    pub async fn refresh(&self) -> Result<usize, StationError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| StationError::NotConfigured("fixed station directory".to_string()))?;

        let stations = build_directory(client.fetch_all().await?);
        let count = stations.len();

        let mut guard = self.inner.write().await;
        *guard = stations;

        Ok(count)
    }

    /// Look up a station by global id.
    pub async fn get(&self, id: &GlobalId) -> Option<Station> {
        let guard = self.inner.read().await;
        guard.iter().find(|s| &s.global_id == id).cloned()
    }

    /// Every station, in directory order.
    pub async fn all(&self) -> Vec<Station> {
        self.inner.read().await.clone()
    }

    /// Get the number of stations in the directory.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the directory is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Search stations by name. See [`search_stations`].
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Station> {
        let guard = self.inner.read().await;
        search_stations(&guard, query, limit)
    }
}

/// Case-insensitive station search.
///
/// Names starting with the query rank before names merely containing it;
/// within a rank, results are ordered by name. At most `limit` results are
/// returned, and `limit` itself is capped at [`MAX_SEARCH_LIMIT`]. A blank
/// query matches nothing.
pub fn search_stations(stations: &[Station], query: &str, limit: usize) -> Vec<Station> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(bool, String, &Station)> = stations
        .iter()
        .filter_map(|s| {
            let name = s.name.to_lowercase();
            if name.starts_with(&needle) {
                Some((true, name, s))
            } else if name.contains(&needle) {
                Some((false, name, s))
            } else {
                None
            }
        })
        .collect();

    hits.sort_by(|a, b| match b.0.cmp(&a.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });

    hits.into_iter()
        .take(limit.min(MAX_SEARCH_LIMIT))
        .map(|(_, _, s)| s.clone())
        .collect()
}

/// Convert directory entries into stations, dropping invalid and duplicate
/// ids.
fn build_directory(entries: Vec<DirectoryEntry>) -> Vec<Station> {
    let mut seen = HashSet::new();

    entries
        .into_iter()
        .filter_map(|e| {
            let global_id = GlobalId::parse(&e.id).ok()?;
            if !seen.insert(global_id.clone()) {
                return None;
            }
            Some(Station {
                name: e.name,
                place: e.place,
                global_id,
                diva_id: e.diva_id,
                transport_types: e.products,
                latitude: e.latitude,
                longitude: e.longitude,
            })
        })
        .collect()
}
