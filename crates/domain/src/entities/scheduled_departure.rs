//! Planned departure from a route's timetable

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// A timetable row. `departure_time` is relayed verbatim from the backend and
/// is usually, but not always, `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduledDeparture {
    pub route_code: String,
    pub route_name: String,
    /// Variant code, e.g. `500T_D_D0`
    pub route_variant: String,
    pub direction: String,
    /// Day-type code (`H` weekdays, `C` Saturday, `P` Sunday)
    pub day_type: String,
    pub service_type: String,
    pub departure_time: String,
}

impl ScheduledDeparture {
    /// `hours * 60 + minutes` of `departure_time`, or `None` if it is not two
    /// integers separated by `:`.
    ///
    /// Fields are taken as they are: `24:30` is minute 1470 and `12:75` is
    /// minute 795.
    pub fn minute_of_day(&self) -> Option<i64> {
        let (hours, minutes) = self.departure_time.split_once(':')?;
        let hours: i64 = hours.trim().parse().ok()?;
        let minutes: i64 = minutes.trim().parse().ok()?;
        hours.checked_mul(60)?.checked_add(minutes)
    }

    /// Minutes from `now` until this departure
    ///
    /// A departure earlier in the day counts as tomorrow's (one day is added
    /// once). Results that are still negative are unknown.
    pub fn minutes_until(&self, now: NaiveTime) -> Option<u32> {
        let now = i64::from(now.hour() * 60 + now.minute());
        let mut diff = self.minute_of_day()?.checked_sub(now)?;
        if diff < 0 {
            diff += MINUTES_PER_DAY;
        }
        u32::try_from(diff).ok()
    }
}
