//! MVG (Münchner Verkehrsgesellschaft) API client.
//!
//! Two endpoints matter to the board:
//! - the location search, which resolves a free-text station name to a
//!   global station id (results mix stations, addresses and POIs)
//! - the departure list for a global station id, at a bounded count
//!
//! Both are reached through the [`TransitApi`] trait so the board can run
//! against the live API, a cache in front of it, or file-backed fixtures.

mod api;
mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use api::TransitApi;
pub use client::{ApiVersion, DEFAULT_V2_BASE_URL, DEFAULT_V3_BASE_URL, MvgClient, MvgConfig};
pub use convert::{ConversionError, convert_location, first_station};
pub use error::MvgError;
pub use mock::{LOCATIONS_FILE, MockTransitApi, fixture_stem};
pub use types::{LOCATION_TYPE_STATION, Location};
