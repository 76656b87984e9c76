//! `generatedAt` stamps for selection documents.
//!
//! A run is reproducible only if its stamp is, so the stamp is chosen by the
//! caller: an explicit value, else a `SOURCE_DATE_EPOCH`, else the clock.

use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 86_400;

/// Pick the `generatedAt` value for a run.
///
/// `explicit` wins verbatim. A `source_date_epoch` that does not parse as
/// Unix seconds is ignored and the clock is used.
pub fn resolve_generated_at(explicit: Option<&str>, source_date_epoch: Option<&str>) -> String {
    if let Some(stamp) = explicit {
        return stamp.to_string();
    }
    match source_date_epoch.and_then(parse_epoch) {
        Some(secs) => unix_to_iso8601(secs),
        None => {
            tracing::debug!("no fixed timestamp given, using the system clock");
            now_iso8601()
        }
    }
}

pub fn now_iso8601() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    unix_to_iso8601(secs)
}

/// `YYYY-MM-DDTHH:MM:SSZ` for Unix seconds.
pub fn unix_to_iso8601(secs: u64) -> String {
    let (year, month, day) = date_from_days(secs / SECS_PER_DAY);
    let rem = secs % SECS_PER_DAY;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

/// Decimal Unix seconds, surrounding whitespace allowed.
pub fn parse_epoch(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Days since 1970-01-01 to a proleptic Gregorian date (Hinnant's
/// days-to-civil, restricted to non-negative days).
fn date_from_days(days: u64) -> (u64, u64, u64) {
    let shifted = days + 719_468;
    let era = shifted / 146_097;
    let day_of_era = shifted % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
