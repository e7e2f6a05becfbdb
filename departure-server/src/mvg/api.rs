//! Seam between the board and the transit API.

use async_trait::async_trait;

use crate::domain::{Departure, GlobalId};

use super::error::MvgError;
use super::types::Location;

/// Read access to a transit operator's API.
///
/// Implemented by the live [`MvgClient`](super::MvgClient), the
/// [`CachedTransitApi`](crate::cache::CachedTransitApi) wrapper and the
/// file-backed [`MockTransitApi`](super::MockTransitApi).
#[async_trait]
pub trait TransitApi: Send + Sync {
    /// Search locations (stations, addresses, POIs) by free text.
    async fn locations(&self, query: &str) -> Result<Vec<Location>, MvgError>;

    /// Upcoming departures at a station, at most `limit` of them.
    async fn departures(&self, station: &GlobalId, limit: u16)
    -> Result<Vec<Departure>, MvgError>;
}
