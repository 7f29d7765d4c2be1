//! Journal timestamps: the canonical `YYYY-MM-DD HH:MM` text form and relative
//! offsets such as `5m`, `2h` or `1h30m`.

use crate::error::{DoingError, DoingResult};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Format used for entry timestamps and `@done(...)` values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

static OFFSET_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)([a-zA-Z]+)").unwrap());

/// Parses a canonical journal timestamp (e.g. `2025-08-15 12:34`) as local time.
///
/// Ambiguous local times (DST fold) resolve to the earliest instant. Times that
/// do not exist locally are rejected.
pub fn parse(text: &str) -> DoingResult<DateTime<Local>> {
    let text = text.trim();
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|_| {
        DoingError::format(format!(
            "invalid timestamp `{text}`, expected `YYYY-MM-DD HH:MM`"
        ))
    })?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| DoingError::format(format!("`{text}` does not exist in local time")))
}

/// Renders an instant in the canonical journal form.
pub fn format(instant: &DateTime<Local>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Resolves a backdating offset against `anchor`.
///
/// Accepts `<integer><unit>` groups where the unit is `m` (minutes), `h` (hours)
/// or `d` (days). Groups may be chained: `1h30m` is ninety minutes.
///
/// ```
/// # use chrono::{Local, TimeZone};
/// # use doing_core::timestamp::parse_relative;
/// let anchor = Local.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap();
/// let back = parse_relative("1h30m", anchor).unwrap();
/// assert_eq!(back, Local.with_ymd_and_hms(2025, 8, 15, 10, 30, 0).unwrap());
/// ```
pub fn parse_relative(text: &str, anchor: DateTime<Local>) -> DoingResult<DateTime<Local>> {
    let compact: String = text.split_whitespace().collect();
    let invalid = || {
        DoingError::format(format!(
            "invalid offset `{}`, expected something like `5m`, `2h` or `1d`",
            text.trim()
        ))
    };
    if compact.is_empty() {
        return Err(invalid());
    }

    let mut consumed = 0;
    let mut total = Duration::zero();
    for caps in OFFSET_PART.captures_iter(&compact) {
        let whole = caps.get(0).ok_or_else(invalid)?;
        if whole.start() != consumed {
            return Err(invalid());
        }
        consumed = whole.end();

        let amount: i64 = caps[1].parse().map_err(|_| invalid())?;
        let part = match &caps[2] {
            "m" => Duration::try_minutes(amount),
            "h" => Duration::try_hours(amount),
            "d" => Duration::try_days(amount),
            _ => None,
        }
        .ok_or_else(invalid)?;
        total = total.checked_add(&part).ok_or_else(invalid)?;
    }
    if consumed != compact.len() {
        return Err(invalid());
    }

    anchor.checked_sub_signed(total).ok_or_else(invalid)
}

/// Drops seconds and sub-second precision.
pub fn round_to_minute(instant: DateTime<Local>) -> DateTime<Local> {
    instant
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(instant)
}
