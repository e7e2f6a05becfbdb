//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::board::{BoardError, BoardSnapshot, LineGroup};
use crate::domain::{GlobalId, Station};

/// Query parameters of the board page.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRequest {
    /// Station name, resolved through the location search
    pub station: Option<String>,

    /// Exact global station id; wins over `station`
    pub station_id: Option<String>,
}

/// Request to search stations.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Search query
    #[serde(default)]
    pub q: String,

    /// Maximum number of results (default 10, capped at 50)
    pub limit: Option<usize>,
}

/// Response for station search.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<Station>,
}

/// A board error with its user-facing message.
#[derive(Debug, Serialize)]
pub struct BoardErrorBody {
    /// Stable code, e.g. `NO_DEPARTURE_DATA`
    pub code: &'static str,
    pub reason: &'static str,
    pub action: &'static str,
}

impl From<BoardError> for BoardErrorBody {
    fn from(error: BoardError) -> Self {
        let message = error.message();
        Self {
            code: error.code(),
            reason: message.reason,
            action: message.action,
        }
    }
}

/// The published board.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    /// Completed refresh cycles of this board
    pub cycle: u64,

    /// Station as requested
    pub query: String,

    pub station: Option<Station>,

    pub lines: Vec<LineGroup>,

    pub error: Option<BoardErrorBody>,

    pub loading: bool,

    /// Epoch milliseconds of the last completed refresh
    pub updated_at: Option<i64>,
}

impl BoardResponse {
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        Self {
            cycle: snapshot.cycle,
            query: snapshot.query.to_string(),
            station: snapshot.station.clone(),
            lines: snapshot.lines.clone(),
            error: snapshot.error.map(BoardErrorBody::from),
            loading: snapshot.loading,
            updated_at: snapshot.updated_at_ms,
        }
    }
}

/// On-demand departures for one station.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    pub station: GlobalId,
    pub lines: Vec<LineGroup>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationQuery;

    #[test]
    fn board_request_accepts_camel_case_id() {
        let req: BoardRequest =
            serde_json::from_str(r#"{"stationId": "de:09162:470"}"#).unwrap();
        assert_eq!(req.station_id.as_deref(), Some("de:09162:470"));
        assert!(req.station.is_none());
    }

    #[test]
    fn failed_snapshot_serializes_error_message() {
        let snapshot = BoardSnapshot::failed(
            2,
            StationQuery::Name("Nowhere".to_string()),
            None,
            BoardError::StationNotFound,
            1_700_000_000_000,
        );

        let json = serde_json::to_value(BoardResponse::from_snapshot(&snapshot)).unwrap();
        assert_eq!(json["cycle"], 2);
        assert_eq!(json["query"], "Nowhere");
        assert_eq!(json["error"]["code"], "NO_TARGET_STATION_IN_RESULTS");
        assert_eq!(
            json["error"]["reason"],
            "could not find a departure station in your location"
        );
        assert_eq!(json["lines"].as_array().unwrap().len(), 0);
        assert_eq!(json["updatedAt"], 1_700_000_000_000_i64);
    }
}
