//! Clock-style duration display and ISO-8601 duration parsing
//!
//! Video durations arrive as ISO-8601 (`PT4M13S`) and are shown to users as
//! `m:ss`, or `h:mm:ss` once they reach an hour.

/// Format whole seconds as `m:ss` (under one hour) or `h:mm:ss`
///
/// # Examples
///
/// ```
/// use moodtunes_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0), "0:00");
/// assert_eq!(format_clock(253), "4:13");
/// assert_eq!(format_clock(3661), "1:01:01");
/// ```
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Format milliseconds with [`format_clock`], truncating partial seconds
pub fn format_clock_ms(millis: u64) -> String {
    format_clock(millis / 1000)
}

/// Parse an ISO-8601 duration (`P[nD]T[nH][nM][nS]`) into whole seconds
///
/// Fractional seconds are truncated. Years, months and weeks are rejected since
/// they have no fixed length. Returns `None` for anything malformed.
///
/// # Examples
///
/// ```
/// use moodtunes_common::human_time::parse_iso8601_duration;
///
/// assert_eq!(parse_iso8601_duration("PT4M13S"), Some(253));
/// assert_eq!(parse_iso8601_duration("PT1H"), Some(3600));
/// assert_eq!(parse_iso8601_duration("P1DT2S"), Some(86_402));
/// assert_eq!(parse_iso8601_duration("4:13"), None);
/// ```
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let rest = value.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut total: f64 = 0.0;
    total += sum_components(date_part, &[('D', 86_400.0)])?;
    if let Some(time) = time_part {
        total += sum_components(time, &[('H', 3600.0), ('M', 60.0), ('S', 1.0)])?;
    }

    Some(total as u64)
}

/// Sum `<number><unit>` pairs; units must appear in the given order, at most once
fn sum_components(part: &str, units: &[(char, f64)]) -> Option<f64> {
    let mut total = 0.0;
    let mut number = String::new();
    let mut next_unit = 0;

    for ch in part.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            number.push(if ch == ',' { '.' } else { ch });
            continue;
        }

        let offset = units[next_unit..].iter().position(|(u, _)| *u == ch)?;
        let (_, scale) = units[next_unit + offset];
        if number.is_empty() {
            return None;
        }
        let amount: f64 = number.parse().ok()?;
        total += amount * scale;
        number.clear();
        next_unit += offset + 1;
    }

    // Trailing digits without a unit
    if !number.is_empty() {
        return None;
    }

    Some(total)
}
