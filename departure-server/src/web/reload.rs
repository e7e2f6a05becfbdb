//! Daily full page reload.
//!
//! A kiosk board runs for weeks; reloading once a day picks up new static
//! assets and clears any client-side drift.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Time from `now` until the next occurrence of `reload_at`.
///
/// If `now` is exactly `reload_at`, the next occurrence is a full day away.
/// Both are local wall-clock times.
pub fn next_reload_delay(now: NaiveDateTime, reload_at: NaiveTime) -> Duration {
    let today = now.date().and_time(reload_at);
    let next = if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    };

    (next - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn later_today() {
        assert_eq!(
            next_reload_delay(at(1, 30, 0), time(3, 0)),
            Duration::from_secs(90 * 60)
        );
    }

    #[test]
    fn across_midnight() {
        assert_eq!(
            next_reload_delay(at(23, 0, 0), time(3, 0)),
            Duration::from_secs(4 * 60 * 60)
        );
    }

    #[test]
    fn exactly_now_is_a_full_day() {
        assert_eq!(
            next_reload_delay(at(3, 0, 0), time(3, 0)),
            Duration::from_secs(24 * 60 * 60)
        );
    }

    #[test]
    fn just_after_is_almost_a_day() {
        assert_eq!(
            next_reload_delay(at(3, 0, 1), time(3, 0)),
            Duration::from_secs(24 * 60 * 60 - 1)
        );
    }

    proptest! {
        #[test]
        fn delay_is_within_one_day(
            h in 0u32..24, m in 0u32..60, s in 0u32..60,
            rh in 0u32..24, rm in 0u32..60,
        ) {
            let delay = next_reload_delay(at(h, m, s), time(rh, rm));
            prop_assert!(delay > Duration::ZERO);
            prop_assert!(delay <= Duration::from_secs(24 * 60 * 60));
        }
    }
}
