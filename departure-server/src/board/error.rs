//! User-facing board errors.

use serde::Serialize;

use crate::mvg::MvgError;

/// What went wrong while refreshing the board.
///
/// Each variant maps to a fixed message pair shown in the error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The location search failed or returned garbage.
    #[error("could not fetch data for departure station")]
    StationLookup,

    /// The location search worked but found no station.
    #[error("could not find a departure station in your location")]
    StationNotFound,

    /// The departure request failed or returned garbage.
    #[error("could not fetch departures for provided station")]
    DepartureFetch,

    /// The departure request worked but the board is empty.
    #[error("no departures found for this station")]
    NoDepartures,

    /// The upstream servers could not be reached at all.
    #[error("could not communicate with upstream servers")]
    Network,
}

/// Reason and suggested action shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    pub reason: &'static str,
    pub action: &'static str,
}

const CHECK_CONNECTION: &str =
    "Please verify that you are connected to the internet or wait awhile and try again";
const CHECK_STATION: &str =
    "Please verify that your station is correct or wait awhile and try again";

impl BoardError {
    /// Classify a client error raised while resolving a station.
    pub fn from_lookup(err: &MvgError) -> Self {
        if err.is_transport() {
            BoardError::Network
        } else {
            BoardError::StationLookup
        }
    }

    /// Classify a client error raised while fetching departures.
    pub fn from_fetch(err: &MvgError) -> Self {
        if err.is_transport() {
            BoardError::Network
        } else {
            BoardError::DepartureFetch
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::StationLookup => "NO_DEPARTURE_STATION_DATA",
            BoardError::StationNotFound => "NO_TARGET_STATION_IN_RESULTS",
            BoardError::DepartureFetch => "NO_DEPARTURE_DATA",
            BoardError::NoDepartures => "NO_DEPARTURES_FOR_STATION",
            BoardError::Network => "GENERIC_NETWORK_ERROR",
        }
    }

    /// Message pair for the banner.
    pub fn message(&self) -> ErrorMessage {
        let reason = match self {
            BoardError::StationLookup => "could not fetch data for departure station",
            BoardError::StationNotFound => "could not find a departure station in your location",
            BoardError::DepartureFetch => "could not fetch departures for provided station",
            BoardError::NoDepartures => "no departures found for this station",
            BoardError::Network => "could not communicate with upstream servers",
        };
        let action = match self {
            BoardError::StationNotFound | BoardError::NoDepartures => CHECK_STATION,
            _ => CHECK_CONNECTION,
        };
        ErrorMessage { reason, action }
    }
}
