//! Station identifier and station types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TransportType;

/// Error returned when parsing an invalid global station id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid global station id: {reason}")]
pub struct InvalidGlobalId {
    reason: &'static str,
}

/// A global station id as used by the MVG API, e.g. `de:09162:1110`.
///
/// Any `GlobalId` is non-empty, contains no whitespace and is at most
/// 64 bytes long.
///
/// # Examples
///
/// ```
/// use departure_server::domain::GlobalId;
///
/// let id = GlobalId::parse("de:09162:1110").unwrap();
/// assert_eq!(id.as_str(), "de:09162:1110");
///
/// // Surrounding whitespace is trimmed
/// assert_eq!(GlobalId::parse(" de:09162:6 ").unwrap().as_str(), "de:09162:6");
///
/// assert!(GlobalId::parse("").is_err());
/// assert!(GlobalId::parse("de 09162").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GlobalId(String);

impl GlobalId {
    /// Maximum accepted length in bytes.
    pub const MAX_LEN: usize = 64;

    /// Parse a global id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidGlobalId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidGlobalId {
                reason: "must not be empty",
            });
        }

        if s.len() > Self::MAX_LEN {
            return Err(InvalidGlobalId {
                reason: "must be at most 64 bytes",
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(InvalidGlobalId {
                reason: "must not contain whitespace",
            });
        }

        Ok(GlobalId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GlobalId {
    type Error = InvalidGlobalId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        GlobalId::parse(&s)
    }
}

impl From<GlobalId> for String {
    fn from(id: GlobalId) -> Self {
        id.0
    }
}

impl fmt::Debug for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalId({})", self.0)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A canonical station that departures can be fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub name: String,
    pub place: Option<String>,
    pub global_id: GlobalId,
    pub diva_id: Option<i64>,
    #[serde(default)]
    pub transport_types: Vec<TransportType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Station {
    /// A station known only by its id.
    ///
    /// Used when a board is requested by id and the station directory has
    /// no entry for it; the id doubles as the display name.
    pub fn from_id(global_id: GlobalId) -> Self {
        Self {
            name: global_id.as_str().to_string(),
            place: None,
            global_id,
            diva_id: None,
            transport_types: Vec::new(),
            latitude: None,
            longitude: None,
        }
    }

    /// Name for display, with the place appended when it is known.
    pub fn display_name(&self) -> String {
        match &self.place {
            Some(place) if !place.is_empty() => format!("{}, {}", self.name, place),
            _ => self.name.clone(),
        }
    }
}

/// The station a user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StationQuery {
    /// Free-text station name, resolved through the location search.
    Name(String),
    /// Exact global id.
    Id(GlobalId),
}

impl fmt::Display for StationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationQuery::Name(name) => f.write_str(name),
            StationQuery::Id(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(GlobalId::parse("de:09162:1110").is_ok());
        assert!(GlobalId::parse("de:09162:6").is_ok());
        assert!(GlobalId::parse("x").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(GlobalId::parse("").is_err());
        assert!(GlobalId::parse("   ").is_err());
    }

    #[test]
    fn reject_inner_whitespace() {
        assert!(GlobalId::parse("de: 09162").is_err());
        assert!(GlobalId::parse("de:\t1").is_err());
    }

    #[test]
    fn reject_overlong() {
        let long = "a".repeat(GlobalId::MAX_LEN + 1);
        assert!(GlobalId::parse(&long).is_err());
        assert!(GlobalId::parse(&long[1..]).is_ok());
    }

    #[test]
    fn display_and_debug() {
        let id = GlobalId::parse("de:09162:70").unwrap();
        assert_eq!(format!("{id}"), "de:09162:70");
        assert_eq!(format!("{id:?}"), "GlobalId(de:09162:70)");
    }

    #[test]
    fn deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<GlobalId>("\"de:1\"").is_ok());
        assert!(serde_json::from_str::<GlobalId>("\"\"").is_err());
    }

    #[test]
    fn station_display_name() {
        let mut station = Station::from_id(GlobalId::parse("de:09162:1110").unwrap());
        assert_eq!(station.display_name(), "de:09162:1110");

        station.name = "Forstenrieder Allee".to_string();
        station.place = Some("München".to_string());
        assert_eq!(station.display_name(), "Forstenrieder Allee, München");

        station.place = Some(String::new());
        assert_eq!(station.display_name(), "Forstenrieder Allee");
    }

    #[test]
    fn station_deserializes_from_api_shape() {
        let json = r#"{
            "name": "Marienplatz",
            "place": "München",
            "globalId": "de:09162:2",
            "divaId": 2,
            "transportTypes": ["UBAHN", "SBAHN", "BUS"],
            "latitude": 48.13725,
            "longitude": 11.57542
        }"#;

        let station: Station = serde_json::from_str(json).unwrap();
        assert_eq!(station.global_id.as_str(), "de:09162:2");
        assert_eq!(station.diva_id, Some(2));
        assert_eq!(station.transport_types.len(), 3);
    }

    #[test]
    fn query_display() {
        assert_eq!(StationQuery::Name("Moosach".into()).to_string(), "Moosach");
        let id = GlobalId::parse("de:09162:470").unwrap();
        assert_eq!(StationQuery::Id(id).to_string(), "de:09162:470");
    }
}
