//! Askama templates for the web frontend.

use askama::Template;

use crate::board::{BoardSnapshot, Count, ErrorMessage, LineGroup, Remaining, format_remaining};
use crate::domain::Departure;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// The departure board.
#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate {
    pub title: String,
    /// Value for the station search field.
    pub station_value: String,
    pub rows: Vec<RowView>,
    pub error: Option<ErrorMessage>,
    pub loading: bool,
    /// Seconds until the page re-fetches itself.
    pub refresh_secs: u64,
    /// Milliseconds until the daily full reload.
    pub reload_in_ms: u64,
    /// Local time of the last refresh, `HH:MM:SS`.
    pub updated_at: Option<String>,
}

impl BoardTemplate {
    /// Build the page for a snapshot as of `now_ms`.
    pub fn from_snapshot(
        snapshot: &BoardSnapshot,
        now_ms: i64,
        refresh_secs: u64,
        reload_in_ms: u64,
    ) -> Self {
        let updated_at = snapshot
            .updated_at_ms
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string());

        Self {
            title: snapshot.title(),
            station_value: snapshot
                .station
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| snapshot.query.to_string()),
            rows: build_rows(&snapshot.lines, now_ms),
            error: snapshot.error.map(|e| e.message()),
            loading: snapshot.loading && snapshot.error.is_none(),
            refresh_secs,
            reload_in_ms,
            updated_at,
        }
    }
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// One table row: a single departure, possibly opening a line and/or
/// destination cell that spans the following rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub line: Option<SpanCell>,
    pub destination: Option<SpanCell>,
    pub departure: DepartureView,
}

/// A cell spanning `rowspan` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanCell {
    pub text: String,
    pub rowspan: usize,
}

/// Badges and countdown of one departure.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureView {
    pub sev: bool,
    pub cancelled: bool,
    pub delayed: bool,
    pub remaining: RemainingView,
}

impl DepartureView {
    pub fn new(departure: &Departure, now_ms: i64) -> Self {
        Self {
            sev: departure.sev,
            cancelled: departure.cancelled,
            delayed: departure.is_delayed(),
            remaining: RemainingView::new(format_remaining(
                departure.realtime_departure_time,
                now_ms,
            )),
        }
    }
}

/// Countdown as rendered: "now", or up to two value/unit parts.
#[derive(Debug, Clone, PartialEq)]
pub struct RemainingView {
    pub imminent: bool,
    pub parts: Vec<UnitView>,
}

/// A number with its unit, e.g. `5 mins`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitView {
    pub value: i64,
    pub unit: &'static str,
}

impl RemainingView {
    /// Hours are shown when non-zero; minutes are shown when non-zero or
    /// when there are no hours.
    pub fn new(remaining: Remaining) -> Self {
        match remaining {
            Remaining::Imminent => Self {
                imminent: true,
                parts: Vec::new(),
            },
            Remaining::Pending { hours, minutes } => {
                let mut parts = Vec::with_capacity(2);
                if hours.value > 0 {
                    parts.push(unit(hours, "hr", "hrs"));
                }
                if minutes.value > 0 || hours.value == 0 {
                    parts.push(unit(minutes, "min", "mins"));
                }
                Self {
                    imminent: false,
                    parts,
                }
            }
        }
    }
}

fn unit(count: Count, singular: &'static str, plural: &'static str) -> UnitView {
    UnitView {
        value: count.value,
        unit: if count.singular { singular } else { plural },
    }
}

/// Flatten lines into table rows.
pub fn build_rows(lines: &[LineGroup], now_ms: i64) -> Vec<RowView> {
    let mut rows = Vec::new();

    for line in lines {
        let mut line_cell = Some(SpanCell {
            text: line.label.clone(),
            rowspan: line.departure_count(),
        });

        for dest in &line.destinations {
            let mut dest_cell = Some(SpanCell {
                text: dest.destination.clone(),
                rowspan: dest.departures.len(),
            });

            for departure in &dest.departures {
                rows.push(RowView {
                    line: line_cell.take(),
                    destination: dest_cell.take(),
                    departure: DepartureView::new(departure, now_ms),
                });
            }
        }
    }

    rows
}
