//! Application state for the web layer.

use std::sync::Arc;

use crate::board::BoardRegistry;
use crate::config::ServerConfig;
use crate::mvg::TransitApi;
use crate::stations::StationDirectory;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// One polled board per requested station
    pub boards: Arc<BoardRegistry>,

    /// Transit API (departures cached briefly) for on-demand requests
    pub api: Arc<dyn TransitApi>,

    /// Station directory for search and id lookups
    pub directory: StationDirectory,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        boards: Arc<BoardRegistry>,
        api: Arc<dyn TransitApi>,
        directory: StationDirectory,
        config: ServerConfig,
    ) -> Self {
        Self {
            boards,
            api,
            directory,
            config: Arc::new(config),
        }
    }
}
