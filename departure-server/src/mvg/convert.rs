//! Conversion from MVG DTOs to domain types.

use crate::domain::{GlobalId, Station};

use super::types::Location;

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Record is not a station
    #[error("not a station: {0}")]
    NotAStation(String),

    /// Failed to parse a global id
    #[error("invalid global id: {0}")]
    InvalidGlobalId(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Convert a location search record into a station.
pub fn convert_location(location: &Location) -> Result<Station, ConversionError> {
    if !location.is_station() {
        return Err(ConversionError::NotAStation(location.kind.clone()));
    }

    let raw_id = location
        .global_id
        .as_deref()
        .ok_or(ConversionError::MissingField("globalId"))?;
    let global_id =
        GlobalId::parse(raw_id).map_err(|_| ConversionError::InvalidGlobalId(raw_id.to_string()))?;

    let name = location
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or(ConversionError::MissingField("name"))?;

    Ok(Station {
        name,
        place: location.place.clone(),
        global_id,
        diva_id: location.diva_id,
        transport_types: location.transport_types.clone(),
        latitude: location.latitude,
        longitude: location.longitude,
    })
}

/// The first usable station among location search results.
///
/// Non-station records are skipped silently; malformed station records are
/// skipped with a warning.
pub fn first_station(locations: &[Location]) -> Option<Station> {
    locations
        .iter()
        .filter(|l| l.is_station())
        .find_map(|l| match convert_location(l) {
            Ok(station) => Some(station),
            Err(e) => {
                tracing::warn!(name = ?l.name, error = %e, "skipping malformed station record");
                None
            }
        })
}
