//! Immutable board state as published by the poller.

use crate::domain::{Station, StationQuery};

use super::error::BoardError;
use super::transform::LineGroup;

/// One published state of the board.
///
/// Snapshots are never mutated; the poller replaces them whole.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    /// Number of completed cycles of this board; 0 while loading.
    pub cycle: u64,
    /// What the user asked for.
    pub query: StationQuery,
    /// The resolved station, if resolution got that far.
    pub station: Option<Station>,
    pub lines: Vec<LineGroup>,
    /// Set when the last cycle failed. `lines` is then empty.
    pub error: Option<BoardError>,
    /// No cycle has completed for this board yet.
    pub loading: bool,
    /// Epoch milliseconds of the cycle that produced this snapshot.
    pub updated_at_ms: Option<i64>,
}

impl BoardSnapshot {
    pub fn loading(query: StationQuery) -> Self {
        Self {
            cycle: 0,
            query,
            station: None,
            lines: Vec::new(),
            error: None,
            loading: true,
            updated_at_ms: None,
        }
    }

    pub fn ready(
        cycle: u64,
        query: StationQuery,
        station: Station,
        lines: Vec<LineGroup>,
        updated_at_ms: i64,
    ) -> Self {
        Self {
            cycle,
            query,
            station: Some(station),
            lines,
            error: None,
            loading: false,
            updated_at_ms: Some(updated_at_ms),
        }
    }

    pub fn failed(
        cycle: u64,
        query: StationQuery,
        station: Option<Station>,
        error: BoardError,
        updated_at_ms: i64,
    ) -> Self {
        Self {
            cycle,
            query,
            station,
            lines: Vec::new(),
            error: Some(error),
            loading: false,
            updated_at_ms: Some(updated_at_ms),
        }
    }

    /// Title for the page: the station name, or the raw query before the
    /// station is known.
    pub fn title(&self) -> String {
        match &self.station {
            Some(station) => station.display_name(),
            None => self.query.to_string(),
        }
    }
}
