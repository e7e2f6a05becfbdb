//! MVG departure board server.
//!
//! Polls the departures of one Munich public transport station, groups them
//! by line and destination, and serves the result as a self-refreshing
//! board page for kiosk displays.

pub mod board;
pub mod cache;
pub mod config;
pub mod domain;
pub mod mvg;
pub mod stations;
pub mod web;
