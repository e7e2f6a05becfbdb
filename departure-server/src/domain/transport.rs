//! Transport modes reported by the MVG API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport mode of a line or station.
///
/// Values the API may add later are kept as [`TransportType::Unknown`]
/// instead of failing deserialization, so a new mode never breaks a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportType {
    UBahn,
    SBahn,
    Tram,
    Bus,
    RegionalBus,
    Bahn,
    Schiff,
    Ruftaxi,
    Unknown(String),
}

impl TransportType {
    /// Wire name as used by the API, e.g. `"UBAHN"`.
    pub fn as_str(&self) -> &str {
        match self {
            TransportType::UBahn => "UBAHN",
            TransportType::SBahn => "SBAHN",
            TransportType::Tram => "TRAM",
            TransportType::Bus => "BUS",
            TransportType::RegionalBus => "REGIONAL_BUS",
            TransportType::Bahn => "BAHN",
            TransportType::Schiff => "SCHIFF",
            TransportType::Ruftaxi => "RUFTAXI",
            TransportType::Unknown(other) => other,
        }
    }

    /// Whether this mode belongs to the rail-transit category shown first
    /// on the board.
    pub fn is_rail_transit(&self) -> bool {
        matches!(self, TransportType::UBahn)
    }
}

impl From<String> for TransportType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "UBAHN" => TransportType::UBahn,
            "SBAHN" => TransportType::SBahn,
            "TRAM" => TransportType::Tram,
            "BUS" => TransportType::Bus,
            "REGIONAL_BUS" => TransportType::RegionalBus,
            "BAHN" => TransportType::Bahn,
            "SCHIFF" => TransportType::Schiff,
            "RUFTAXI" => TransportType::Ruftaxi,
            _ => TransportType::Unknown(s),
        }
    }
}

impl From<TransportType> for String {
    fn from(t: TransportType) -> Self {
        match t {
            TransportType::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_modes() {
        assert_eq!(TransportType::from("UBAHN".to_string()), TransportType::UBahn);
        assert_eq!(TransportType::from("BUS".to_string()), TransportType::Bus);
        assert_eq!(
            TransportType::from("REGIONAL_BUS".to_string()),
            TransportType::RegionalBus
        );
    }

    #[test]
    fn unknown_mode_is_preserved() {
        let t: TransportType = serde_json::from_str("\"SEILBAHN\"").unwrap();
        assert_eq!(t, TransportType::Unknown("SEILBAHN".to_string()));
        assert!(!t.is_rail_transit());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"SEILBAHN\"");
    }

    #[test]
    fn only_ubahn_is_rail_transit() {
        assert!(TransportType::UBahn.is_rail_transit());
        assert!(!TransportType::SBahn.is_rail_transit());
        assert!(!TransportType::Tram.is_rail_transit());
        assert!(!TransportType::Bus.is_rail_transit());
    }

    #[test]
    fn lowercase_is_not_recognised() {
        // The API always sends upper case; anything else is a different mode.
        assert_eq!(
            TransportType::from("ubahn".to_string()),
            TransportType::Unknown("ubahn".to_string())
        );
    }
}
