//! Grouping and ordering of departures for the board.
//!
//! Turns a flat departure list into lines → destinations → the soonest
//! departures, in display order:
//!
//! 1. Departures are grouped by line label, then by destination, both in
//!    order of first appearance.
//! 2. Lines with at least one U-Bahn departure come first; otherwise the
//!    order from step 1 (or label order, see [`LineOrder`]) is kept.
//! 3. Destinations within a line are sorted by name using [`Collation`].
//! 4. Departures within a destination are sorted by real-time departure and
//!    capped at [`DEPARTURES_PER_DESTINATION`].
//!
//! The transform is pure: the same input always yields the same output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Departure;

use super::collate::{Collation, DEFAULT_LOCALE};

/// How many departures are kept per destination.
pub const DEPARTURES_PER_DESTINATION: usize = 2;

/// Base order of lines before the U-Bahn partition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineOrder {
    /// Order of first appearance in the input.
    #[default]
    FirstSeen,
    /// Line labels by collation; independent of input order.
    Label,
}

/// Options for [`transform_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub line_order: LineOrder,
    /// BCP-47 locale used to collate names.
    pub locale: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            line_order: LineOrder::default(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// All departures of one line, grouped by destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineGroup {
    pub label: String,
    pub destinations: Vec<DestinationGroup>,
}

impl LineGroup {
    /// Whether any departure of this line is U-Bahn.
    pub fn has_rail_transit(&self) -> bool {
        self.destinations
            .iter()
            .flat_map(|d| &d.departures)
            .any(|dep| dep.transport_type.is_rail_transit())
    }

    /// Number of departures across all destinations.
    pub fn departure_count(&self) -> usize {
        self.destinations.iter().map(|d| d.departures.len()).sum()
    }
}

/// The soonest departures of one line towards one destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationGroup {
    pub destination: String,
    pub departures: Vec<Departure>,
}

/// Transform with the default options (first-seen line order, German
/// collation).
pub fn transform(departures: &[Departure]) -> Vec<LineGroup> {
    transform_with(departures, &TransformOptions::default())
}

/// Transform departures into display order.
pub fn transform_with(departures: &[Departure], options: &TransformOptions) -> Vec<LineGroup> {
    let collation = Collation::for_locale(&options.locale);
    arrange(departures, &collation, options.line_order)
}

/// Group, order and cap departures using an existing collation.
pub fn arrange(
    departures: &[Departure],
    collation: &Collation,
    line_order: LineOrder,
) -> Vec<LineGroup> {
    let mut lines = group(departures);

    if line_order == LineOrder::Label {
        lines.sort_by(|a, b| collation.compare(&a.label, &b.label));
    }

    // Stable: equal-priority lines keep their relative order.
    lines.sort_by_key(|line| !line.has_rail_transit());

    for line in &mut lines {
        line.destinations
            .sort_by(|a, b| collation.compare(&a.destination, &b.destination));

        for dest in &mut line.destinations {
            dest.departures.sort_by_key(|d| d.realtime_departure_time);
            dest.departures.truncate(DEPARTURES_PER_DESTINATION);
        }
    }

    lines
}

/// Fold departures into lines and destinations in first-seen order.
fn group(departures: &[Departure]) -> Vec<LineGroup> {
    let mut lines: Vec<LineGroup> = Vec::new();
    let mut line_index: HashMap<&str, usize> = HashMap::new();
    let mut dest_index: HashMap<(usize, &str), usize> = HashMap::new();

    for dep in departures {
        let li = *line_index.entry(dep.label.as_str()).or_insert_with(|| {
            lines.push(LineGroup {
                label: dep.label.clone(),
                destinations: Vec::new(),
            });
            lines.len() - 1
        });

        let destinations = &mut lines[li].destinations;
        let di = *dest_index
            .entry((li, dep.destination.as_str()))
            .or_insert_with(|| {
                destinations.push(DestinationGroup {
                    destination: dep.destination.clone(),
                    departures: Vec::new(),
                });
                destinations.len() - 1
            });

        destinations[di].departures.push(dep.clone());
    }

    lines
}
