//! Time remaining until a departure.

use serde::Serialize;

/// Below this many milliseconds a departure is shown as leaving now.
pub const IMMINENT_THRESHOLD_MS: i64 = 60_000;

const MS_PER_MINUTE: i64 = 60_000;

/// A count together with its grammatical number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Count {
    pub value: i64,
    pub singular: bool,
}

impl Count {
    fn new(value: i64) -> Self {
        Self {
            value,
            singular: value == 1,
        }
    }
}

/// Countdown to a departure, independent of display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Remaining {
    /// Less than a minute left, or already due.
    Imminent,
    /// Whole hours and minutes left.
    Pending { hours: Count, minutes: Count },
}

/// Countdown from `now_ms` to `target_ms` (both epoch milliseconds).
pub fn format_remaining(target_ms: i64, now_ms: i64) -> Remaining {
    let diff = target_ms.saturating_sub(now_ms);

    if diff < IMMINENT_THRESHOLD_MS {
        return Remaining::Imminent;
    }

    let total_minutes = diff / MS_PER_MINUTE;

    Remaining::Pending {
        hours: Count::new(total_minutes / 60),
        minutes: Count::new(total_minutes % 60),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn imminent_iff_under_threshold(now in -1_000_000_000_000i64..2_000_000_000_000, diff in -10_000_000i64..100_000_000) {
            let r = format_remaining(now + diff, now);
            prop_assert_eq!(r == Remaining::Imminent, diff < IMMINENT_THRESHOLD_MS);
        }

        #[test]
        fn decomposition_matches_total(now in 0i64..2_000_000_000_000, diff in IMMINENT_THRESHOLD_MS..100_000_000) {
            let Remaining::Pending { hours, minutes } = format_remaining(now + diff, now) else {
                return Err(TestCaseError::fail("expected pending"));
            };
            let total = diff / 60_000;
            prop_assert_eq!(hours.value, total / 60);
            prop_assert_eq!(minutes.value, total % 60);
            prop_assert!(minutes.value < 60);
            prop_assert_eq!(hours.singular, hours.value == 1);
            prop_assert_eq!(minutes.singular, minutes.value == 1);
        }
    }
}
