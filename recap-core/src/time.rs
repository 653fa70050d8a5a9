//! Timezone-aware day/range boundary computation and timestamp parsing.
//!
//! Day boundaries are computed in a named IANA timezone and converted to
//! UTC instants; range checks are inclusive on both ends.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone used when the configuration does not name one.
pub const DEFAULT_TIMEZONE: &str = "Asia/Taipei";

/// Epoch values at or above this are treated as milliseconds.
const EPOCH_MILLIS_CUTOFF: f64 = 1e12;

/// Resolve an IANA timezone name, falling back to the default on failure.
pub fn resolve_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!(
                timezone = name,
                "Unknown timezone, falling back to {}",
                DEFAULT_TIMEZONE
            );
            chrono_tz::Asia::Taipei
        }
    }
}

/// Midnight of `date` in `tz`, as a zoned instant.
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        // Midnight skipped by a DST transition: fall back to the UTC reading
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Last representable millisecond of `date` in `tz`.
fn local_end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    match date.succ_opt() {
        Some(next) => local_midnight(next, tz) - Duration::milliseconds(1),
        None => local_midnight(date, tz) + Duration::days(1) - Duration::milliseconds(1),
    }
}

/// UTC bounds of one local day: `[00:00:00.000, 23:59:59.999]`.
pub fn day_range(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        local_midnight(date, tz).with_timezone(&Utc),
        local_end_of_day(date, tz).with_timezone(&Utc),
    )
}

/// UTC bounds spanning start-of-`from` through end-of-`to`.
pub fn date_range(from: NaiveDate, to: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        local_midnight(from, tz).with_timezone(&Utc),
        local_end_of_day(to, tz).with_timezone(&Utc),
    )
}

/// Inclusive range check.
pub fn is_within_range(ts: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    ts >= start && ts <= end
}

/// `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a timestamp out of an arbitrary JSON value.
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` strings
/// (read as UTC), bare dates, and numeric epochs (seconds or milliseconds).
/// Anything else yields `None`.
pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => parse_timestamp_str(s),
        serde_json::Value::Number(n) => parse_epoch(n.as_f64()?),
        _ => None,
    }
}

/// String form of [`parse_timestamp`].
pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    // Numeric strings carry epoch seconds or milliseconds
    s.parse::<f64>().ok().and_then(parse_epoch)
}

fn parse_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() || n <= 0.0 {
        return None;
    }
    let millis = if n >= EPOCH_MILLIS_CUTOFF { n } else { n * 1000.0 };
    Utc.timestamp_millis_opt(millis as i64).single()
}
