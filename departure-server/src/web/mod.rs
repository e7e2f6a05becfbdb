//! Web layer for the departure board.
//!
//! Serves the board page, its JSON twin, station search and on-demand
//! departures.

mod dto;
mod reload;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use reload::next_reload_delay;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
