use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// `YYYY-MM-DD` followed by a `T` or space separator.
const DATE_PREFIX_LEN: usize = 11;

/// Parse an ISO-8601 timestamp into the wall-clock time of its own offset.
///
/// A trailing `Z` is read as `+00:00`. Returns `None` for anything that does
/// not parse; callers decide what to fall back to.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = with_minutes(&trimmed.replace('Z', "+00:00"));

    if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
        return Some(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&value, format) {
            return Some(dt.naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Widen an hour-only time (`2025-12-16T22`, `2025-12-16 22+08:00`) to
/// minute precision so the fixed formats can read it.
fn with_minutes(value: &str) -> String {
    let Some(time) = value.get(DATE_PREFIX_LEN..) else {
        return value.to_string();
    };
    let separator = value.as_bytes()[DATE_PREFIX_LEN - 1];
    let hour_only = time.len() >= 2
        && time.as_bytes()[..2].iter().all(u8::is_ascii_digit)
        && matches!(time.as_bytes().get(2), None | Some(b'+') | Some(b'-'));

    if (separator == b'T' || separator == b' ') && hour_only {
        format!("{}:00{}", &value[..DATE_PREFIX_LEN + 2], &time[2..])
    } else {
        value.to_string()
    }
}

/// Resolve an optional raw timestamp, substituting `fallback` when it is
/// absent or malformed.
pub fn resolve_timestamp(raw: Option<&str>, fallback: NaiveDateTime) -> NaiveDateTime {
    raw.and_then(parse_timestamp).unwrap_or(fallback)
}
