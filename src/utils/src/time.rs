use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};

/// TIME_FORMAT is the layout of timestamps in import and export files.
/// Timestamps are always interpreted and rendered in UTC.
pub const TIME_FORMAT: &'static str = "%Y-%m-%dT%H:%M";

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// parse_time parses `s` using TIME_FORMAT and returns unix nanoseconds.
///
/// Every field must be zero padded, so a parsed value always renders back
/// to the same text.
pub fn parse_time(s: &str) -> anyhow::Result<i64> {
    let dt = NaiveDateTime::parse_from_str(s, TIME_FORMAT)?;
    if dt.format(TIME_FORMAT).to_string() != s {
        return Err(anyhow!("timestamp does not match {}: {}", TIME_FORMAT, s));
    }

    dt.and_utc()
        .timestamp_nanos_opt()
        .ok_or_else(|| anyhow!("timestamp out of range: {}", s))
}

pub fn unix_nano_to_time(unix_nano: i64) -> NaiveDateTime {
    let secs = unix_nano.div_euclid(NANOS_PER_SEC);
    let nsecs = unix_nano.rem_euclid(NANOS_PER_SEC);
    // every i64 nanosecond value lies inside chrono's supported range
    DateTime::from_timestamp(secs, nsecs as u32)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

/// format_time renders unix nanoseconds using TIME_FORMAT.
pub fn format_time(unix_nano: i64) -> String {
    unix_nano_to_time(unix_nano).format(TIME_FORMAT).to_string()
}

/// format_elapsed renders a duration the way operators read timing notices,
/// e.g. `1.503ms` or `2.1s`.
pub fn format_elapsed(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{}µs", trim_float(nanos as f64 / 1e3))
    } else if nanos < 1_000_000_000 {
        format!("{}ms", trim_float(nanos as f64 / 1e6))
    } else {
        format!("{}s", trim_float(d.as_secs_f64()))
    }
}

fn trim_float(v: f64) -> String {
    let s = format!("{:.3}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
