//! MVG station directory.
//!
//! Provides the list of all stations (name, place, global id, products),
//! fetched from the MVG ZDM endpoint at startup and refreshed daily. Backs
//! the station search and id lookups of the web layer.

mod client;
mod directory;
mod error;

pub use client::{DEFAULT_ZDM_BASE_URL, DirectoryEntry, StationClient, StationClientConfig};
pub use directory::{MAX_SEARCH_LIMIT, StationDirectory, search_stations};
pub use error::StationError;
