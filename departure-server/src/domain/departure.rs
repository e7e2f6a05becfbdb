//! Departure records as delivered by the transit API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::TransportType;

/// Planned departure time, kept only for display.
///
/// The v2 API sends epoch milliseconds, older revisions sent a string.
/// Never used for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlannedTime {
    EpochMillis(i64),
    Text(String),
}

/// One scheduled or real-time departure event.
///
/// `realtime_departure_time` is the only field used for temporal ordering.
/// Fields the board does not interpret (platform, occupancy, messages, ...)
/// are kept in `extra` so the record re-serializes without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Line identifier, e.g. "U3" or "58".
    pub label: String,

    pub destination: String,

    pub transport_type: TransportType,

    /// Real-time departure, epoch milliseconds.
    pub realtime_departure_time: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_departure_time: Option<PlannedTime>,

    #[serde(default)]
    pub delay_in_minutes: i32,

    #[serde(default)]
    pub cancelled: bool,

    /// Replacement service (Schienenersatzverkehr).
    #[serde(default)]
    pub sev: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Departure {
    /// Create a departure with only the fields the board interprets.
    pub fn new(
        label: impl Into<String>,
        destination: impl Into<String>,
        transport_type: TransportType,
        realtime_departure_time: i64,
    ) -> Self {
        Self {
            label: label.into(),
            destination: destination.into(),
            transport_type,
            realtime_departure_time,
            planned_departure_time: None,
            delay_in_minutes: 0,
            cancelled: false,
            sev: false,
            extra: Map::new(),
        }
    }

    /// Whether the departure should carry a "delayed" badge.
    ///
    /// Cancelled departures are never shown as delayed.
    pub fn is_delayed(&self) -> bool {
        self.delay_in_minutes > 0 && !self.cancelled
    }
}
