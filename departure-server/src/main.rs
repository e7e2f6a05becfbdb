use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use departure_server::board::BoardRegistry;
use departure_server::cache::{CacheConfig, CachedTransitApi};
use departure_server::config::ServerConfig;
use departure_server::domain::StationQuery;
use departure_server::mvg::{MockTransitApi, MvgClient, TransitApi};
use departure_server::stations::{StationClient, StationClientConfig, StationDirectory};
use departure_server::web::{AppState, create_router};

/// How often to refresh the station directory (24 hours).
const STATION_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let (upstream, directory) = match &config.mock_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using mock transit data");
            match MockTransitApi::new(dir) {
                Ok(mock) => {
                    let directory = StationDirectory::fixed(mock.stations());
                    let mock: Arc<dyn TransitApi> = Arc::new(mock);
                    (mock, directory)
                }
                Err(e) => {
                    tracing::error!("failed to load mock data: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            tracing::info!(
                base_url = %config.mvg.base_url,
                version = ?config.mvg.version,
                "using live MVG API"
            );
            match MvgClient::new(config.mvg.clone()) {
                Ok(client) => {
                    let client: Arc<dyn TransitApi> = Arc::new(client);
                    (client, load_directory(&config).await)
                }
                Err(e) => {
                    tracing::error!("failed to create MVG client: {e}");
                    std::process::exit(1);
                }
            }
        }
    };

    // Boards poll fresh departures every cycle; only on-demand requests
    // share cached departure lists.
    let board_api: Arc<dyn TransitApi> = Arc::new(CachedTransitApi::new(
        upstream.clone(),
        &CacheConfig::locations_only(),
    ));
    let api: Arc<dyn TransitApi> =
        Arc::new(CachedTransitApi::new(upstream, &CacheConfig::default()));

    let boards = Arc::new(BoardRegistry::new(
        board_api,
        directory.clone(),
        config.poller_config(),
        config.board_limits,
        StationQuery::Name(config.default_station.clone()),
    ));
    spawn_board_sweeper(boards.clone());

    let bind_addr = config.bind_addr;
    let static_dir = config.static_dir.clone();
    let state = AppState::new(boards, api, directory, config);
    let app = create_router(state, static_dir);

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {bind_addr}: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("departure board listening on http://{bind_addr}");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

/// Stop boards nobody has asked for lately.
fn spawn_board_sweeper(boards: Arc<BoardRegistry>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(boards.sweep_interval());
        interval.tick().await;
        loop {
            interval.tick().await;
            let stopped = boards.evict_idle().await;
            if stopped > 0 {
                tracing::info!(stopped, "stopped idle boards");
            }
        }
    });
}

/// Load the station directory and keep it fresh.
///
/// A failed initial load leaves the directory empty; the server still runs.
async fn load_directory(config: &ServerConfig) -> StationDirectory {
    let station_config = StationClientConfig::new()
        .with_base_url(&config.zdm_base_url)
        .with_timeout(config.mvg.timeout_secs);
    let client = match StationClient::new(station_config) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("failed to create station directory client: {e}");
            return StationDirectory::fixed(Vec::new());
        }
    };

    let directory = match StationDirectory::fetch(client.clone()).await {
        Ok(directory) => {
            tracing::info!(stations = directory.len().await, "loaded station directory");
            directory
        }
        Err(e) => {
            tracing::warn!("failed to load station directory: {e}");
            StationDirectory::empty(client)
        }
    };

    // Spawn background task to refresh the directory daily
    let refresh = directory.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATION_REFRESH_INTERVAL);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match refresh.refresh().await {
                Ok(count) => tracing::info!(stations = count, "refreshed station directory"),
                Err(e) => tracing::warn!("failed to refresh station directory: {e}"),
            }
        }
    });

    directory
}
