//! MVG API response DTOs.
//!
//! These map to the JSON of the location search. The search mixes stations,
//! addresses and points of interest, so almost every field is optional and
//! only records with `type == "STATION"` become domain stations.

use serde::{Deserialize, Serialize};

use crate::domain::TransportType;

/// Record type of a station in the location search.
pub const LOCATION_TYPE_STATION: &str = "STATION";

/// One result of the location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// "STATION", "ADDRESS", "POI", ...
    #[serde(rename = "type")]
    pub kind: String,

    pub name: Option<String>,

    /// Municipality, e.g. "München".
    pub place: Option<String>,

    /// Only present on stations.
    pub global_id: Option<String>,

    pub diva_id: Option<i64>,

    #[serde(default)]
    pub transport_types: Vec<TransportType>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub surrounding_plan_link: Option<String>,

    pub aliases: Option<String>,

    pub tariff_zones: Option<String>,
}

impl Location {
    /// Whether this record is a station.
    pub fn is_station(&self) -> bool {
        self.kind == LOCATION_TYPE_STATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_mixed_results() {
        let json = r#"[
            {
                "type": "STATION",
                "latitude": 48.08982,
                "longitude": 11.51648,
                "place": "München",
                "name": "Forstenrieder Allee",
                "globalId": "de:09162:1110",
                "divaId": 1110,
                "hasZoomData": true,
                "transportTypes": ["UBAHN", "BUS"],
                "surroundingPlanLink": "FA",
                "aliases": "Forstenried",
                "tariffZones": "m"
            },
            {
                "type": "ADDRESS",
                "latitude": 48.1,
                "longitude": 11.5,
                "place": "München",
                "name": "Forstenrieder Allee 1"
            }
        ]"#;

        let locations: Vec<Location> = serde_json::from_str(json).unwrap();
        assert_eq!(locations.len(), 2);
        assert!(locations[0].is_station());
        assert!(!locations[1].is_station());
        assert_eq!(locations[0].global_id.as_deref(), Some("de:09162:1110"));
        assert!(locations[1].transport_types.is_empty());
    }
}
