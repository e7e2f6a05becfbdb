//! The departure board.
//!
//! The pure core ([`transform`], [`format_remaining`], [`Collation`]) turns
//! raw departures into display order. A [`poller`] keeps a published
//! [`BoardSnapshot`] fresh for one station, and the [`BoardRegistry`] runs
//! one poller per requested station.

mod collate;
mod error;
pub mod poller;
mod registry;
mod remaining;
mod snapshot;
mod transform;

pub use collate::{Collation, DEFAULT_LOCALE};
pub use error::{BoardError, ErrorMessage};
pub use poller::{BoardHandle, PollerConfig, spawn};
pub use registry::{BoardLimits, BoardRegistry, DEFAULT_BOARD_IDLE, DEFAULT_MAX_BOARDS};
pub use remaining::{Count, IMMINENT_THRESHOLD_MS, Remaining, format_remaining};
pub use snapshot::BoardSnapshot;
pub use transform::{
    DEPARTURES_PER_DESTINATION, DestinationGroup, LineGroup, LineOrder, TransformOptions, arrange,
    transform, transform_with,
};
