use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Current instant as a naive UTC timestamp, the form persisted by the store.
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Parses the date formats accepted from API clients.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS[.f]` and plain
/// `YYYY-MM-DD` dates (interpreted as midnight UTC).
pub fn parse_flexible_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Serde helper for optional timestamps sent in any format accepted by
/// [`parse_flexible_datetime`]. Empty strings deserialize to `None`.
pub fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_flexible_datetime(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", s))),
    }
}

/// First instant of the month `months` before the month containing `now`.
pub fn start_of_month_offset(now: NaiveDateTime, months: u32) -> NaiveDateTime {
    let mut year = now.year();
    let mut month = now.month() as i32 - months as i32;
    while month < 1 {
        month += 12;
        year -= 1;
    }
    NaiveDate::from_ymd_opt(year, month as u32, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now - Duration::days(30 * months as i64))
}

/// `YYYY-MM` bucket key of a timestamp.
pub fn month_key(at: NaiveDateTime) -> String {
    at.format("%Y-%m").to_string()
}
