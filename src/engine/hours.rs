//! Market-calendar arithmetic.
//!
//! Expiration-date selection for the spread strategies and the sleep
//! arithmetic used between trading sessions. Session windows themselves
//! come from the brokerage API (`Brokerage::next_open_hours`); this
//! module only does date math.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use std::time::Duration;

use crate::types::SessionHours;

/// Sleep applied once the daily position cap is hit: 6.5 hours, the
/// length of a full equities session.
pub const POSITION_CAP_SLEEP_SECS: u64 = 23_400;

/// Find the expiration date falling on `weekday_num` (Monday = 0)
/// whose distance from `today` lies inside `[min_days, max_days]`.
///
/// Scans outward from the near end of the range and returns the first
/// matching date, so a 30–45 day window with weekday 4 yields the
/// nearest Friday at least 30 days out.
pub fn nearest_weekday_expiration(
    today: NaiveDate,
    weekday_num: u8,
    min_days: i64,
    max_days: i64,
) -> Option<NaiveDate> {
    for offset in min_days..=max_days {
        let date = today + ChronoDuration::days(offset);
        if date.weekday().num_days_from_monday() == weekday_num as u32 {
            return Some(date);
        }
    }
    None
}

/// How long to sleep after a trading session ends.
///
/// If the daily position cap was reached, back off for a full session
/// length. Otherwise wait a quarter of the time until the next open —
/// the short wait forces a fresh login at least once per day, which the
/// brokerage session requires.
pub fn post_session_wait(
    hours: &SessionHours,
    now: chrono::DateTime<chrono::Utc>,
    position_cap_reached: bool,
) -> Duration {
    if position_cap_reached {
        return Duration::from_secs(POSITION_CAP_SLEEP_SECS);
    }
    Duration::from_secs(hours.seconds_until_open(now) / 4)
}
