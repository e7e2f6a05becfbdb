//! HTTP route handlers.

use std::path::Path as FsPath;
use std::time::Duration;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use chrono::Local;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::board::{BoardError, transform_with};
use crate::domain::{GlobalId, StationQuery};
use crate::mvg::MvgError;
use crate::stations::MAX_SEARCH_LIMIT;

use super::dto::*;
use super::reload::next_reload_delay;
use super::state::AppState;
use super::templates::*;

/// How long a board request waits for a new board's first cycle.
const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Page refresh while the board is still loading.
const LOADING_REFRESH_SECS: u64 = 5;

const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<FsPath>) -> Router {
    Router::new()
        .route("/", get(board_page))
        .route("/health", get(health))
        .route("/api/board", get(board_json))
        .route("/api/stations/search", get(search_stations))
        .route("/stations", get(list_stations))
        .route("/stations/:id/departures", get(station_departures))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Work out which station a board request asks for.
///
/// An explicit id wins over a name; neither means the default station.
fn station_query(req: &BoardRequest, default_station: &str) -> Result<StationQuery, AppError> {
    if let Some(raw) = req.station_id.as_deref().filter(|s| !s.trim().is_empty()) {
        let id = GlobalId::parse(raw).map_err(|e| AppError::BadRequest {
            message: format!("Invalid station id {raw:?}: {e}"),
        })?;
        return Ok(StationQuery::Id(id));
    }

    let name = req
        .station
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default_station);

    Ok(StationQuery::Name(name.to_string()))
}

/// The departure board page.
async fn board_page(
    State(state): State<AppState>,
    Query(req): Query<BoardRequest>,
) -> Result<Html<String>, AppError> {
    let query = station_query(&req, &state.config.default_station)?;
    let board = state.boards.board(query).await;
    let snapshot = board.wait_ready(READY_TIMEOUT).await;

    let now = Local::now();
    let reload_in = next_reload_delay(now.naive_local(), state.config.daily_reload_at);
    let refresh_secs = if snapshot.loading {
        LOADING_REFRESH_SECS
    } else {
        state.config.refresh_interval.as_secs()
    };

    let template = BoardTemplate::from_snapshot(
        &snapshot,
        now.timestamp_millis(),
        refresh_secs,
        u64::try_from(reload_in.as_millis()).unwrap_or(u64::MAX),
    );
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;

    Ok(Html(html))
}

/// A station's board as JSON, selected like the board page.
async fn board_json(
    State(state): State<AppState>,
    Query(req): Query<BoardRequest>,
) -> Result<Json<BoardResponse>, AppError> {
    let query = station_query(&req, &state.config.default_station)?;
    let board = state.boards.board(query).await;
    let snapshot = board.wait_ready(READY_TIMEOUT).await;

    Ok(Json(BoardResponse::from_snapshot(&snapshot)))
}

/// Search stations by name.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
    let stations = state.directory.search(&req.q, limit).await;

    Json(StationSearchResponse { stations })
}

/// The whole station directory.
async fn list_stations(State(state): State<AppState>) -> Json<StationSearchResponse> {
    Json(StationSearchResponse {
        stations: state.directory.all().await,
    })
}

/// Transformed departures for any station, independent of the board.
async fn station_departures(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeparturesResponse>, AppError> {
    let station = GlobalId::parse(&id).map_err(|e| AppError::BadRequest {
        message: format!("Invalid station id {id:?}: {e}"),
    })?;

    let mut departures = state
        .api
        .departures(&station, state.config.departure_limit)
        .await?;

    if state.config.hide_cancelled {
        departures.retain(|d| !d.cancelled);
    }

    if departures.is_empty() {
        return Err(AppError::NotFound {
            message: BoardError::NoDepartures.message().reason.to_string(),
        });
    }

    let options = state.config.poller_config().transform;
    let lines = transform_with(&departures, &options);

    Ok(Json(DeparturesResponse { station, lines }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<MvgError> for AppError {
    fn from(e: MvgError) -> Self {
        match e {
            MvgError::Api { status: 404, .. } => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            tracing::error!(%status, "{message}");
        } else {
            tracing::debug!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
