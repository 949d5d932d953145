//! Small conversions shared by the views.

use chrono::{DateTime, TimeDelta, Utc};

/// Renders a duration as `"D HH:MM:SS"`.
///
/// Negative durations keep a negative day count and a positive remainder,
/// so `-1s` renders as `"-1 23:59:59"`.
pub fn format_timedelta(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let days = total.div_euclid(86_400);
    let seconds = total.rem_euclid(86_400);
    let hours = seconds / 3600;
    let minutes = seconds % 3600 / 60;
    let seconds = seconds % 60;
    format!("{days} {hours:02}:{minutes:02}:{seconds:02}")
}

/// Epoch seconds to a UTC timestamp. `None` when out of range.
pub fn from_timestamp(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

/// Seconds to a duration. `None` when out of range.
pub(crate) fn seconds(seconds: i64) -> Option<TimeDelta> {
    TimeDelta::try_seconds(seconds)
}
