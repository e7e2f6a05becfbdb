//! Domain types for the departure board.
//!
//! Stations, departures and transport modes as the board understands them.
//! Identifier types enforce their invariants at construction time.

mod departure;
mod station;
mod transport;

pub use departure::{Departure, PlannedTime};
pub use station::{GlobalId, InvalidGlobalId, Station, StationQuery};
pub use transport::TransportType;
