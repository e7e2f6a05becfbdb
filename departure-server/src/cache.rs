//! Caching layer for transit API responses.
//!
//! Location lookups change rarely and are cached for an hour. Departures are
//! cached briefly for on-demand API requests. The board pollers use a layer
//! without a departure cache ([`CacheConfig::locations_only`]), so every poll
//! cycle reaches upstream.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::{Departure, GlobalId};
use crate::mvg::{Location, MvgError, TransitApi};

/// Cache key for departure lists: (station, requested limit).
type DepartureKey = (GlobalId, u16);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for location search results.
    pub location_ttl: Duration,

    /// TTL for departure lists; `None` passes every request through.
    pub departure_ttl: Option<Duration>,

    /// Maximum number of cached entries per kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location_ttl: Duration::from_secs(60 * 60),
            departure_ttl: Some(Duration::from_secs(30)),
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    /// Cache location lookups only.
    pub fn locations_only() -> Self {
        Self {
            departure_ttl: None,
            ..Self::default()
        }
    }
}

/// Transit API with caching.
///
/// Wraps any [`TransitApi`] and caches successful responses. Errors are
/// never cached.
pub struct CachedTransitApi {
    inner: Arc<dyn TransitApi>,
    locations: MokaCache<String, Arc<Vec<Location>>>,
    departures: Option<MokaCache<DepartureKey, Arc<Vec<Departure>>>>,
}

impl CachedTransitApi {
    /// Create a new cached API.
    pub fn new(inner: Arc<dyn TransitApi>, config: &CacheConfig) -> Self {
        let locations = MokaCache::builder()
            .time_to_live(config.location_ttl)
            .max_capacity(config.max_capacity)
            .build();

        let departures = config.departure_ttl.map(|ttl| {
            MokaCache::builder()
                .time_to_live(ttl)
                .max_capacity(config.max_capacity)
                .build()
        });

        Self {
            inner,
            locations,
            departures,
        }
    }
}

#[async_trait]
impl TransitApi for CachedTransitApi {
    async fn locations(&self, query: &str) -> Result<Vec<Location>, MvgError> {
        let key = query.trim().to_lowercase();

        if let Some(cached) = self.locations.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let locations = Arc::new(self.inner.locations(query).await?);
        self.locations.insert(key, locations.clone()).await;

        Ok(locations.as_ref().clone())
    }

    async fn departures(
        &self,
        station: &GlobalId,
        limit: u16,
    ) -> Result<Vec<Departure>, MvgError> {
        let Some(cache) = &self.departures else {
            return self.inner.departures(station, limit).await;
        };
        let key = (station.clone(), limit);

        if let Some(cached) = cache.get(&key).await {
            tracing::debug!(station = %station, "departures served from cache");
            return Ok(cached.as_ref().clone());
        }

        let departures = Arc::new(self.inner.departures(station, limit).await?);
        cache.insert(key, departures.clone()).await;

        Ok(departures.as_ref().clone())
    }
}
