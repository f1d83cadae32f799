use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Current local wall-clock instant
pub fn now_local() -> DateTime<Local> {
    Local::now()
}

/// Parse a `YYYY-MM-DD` date as produced by a date input
pub fn parse_form_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse an `HH:MM` or `HH:MM:SS` time as produced by a time input
pub fn parse_form_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Interpret a wall-clock date and time in the local timezone.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times
/// skipped by a DST jump have no instant and yield `None`.
pub fn local_instant(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&date.and_time(time)).earliest()
}

/// Parse an instant sent by the agenda backend into local wall-clock time.
///
/// Accepts RFC 3339 with an offset, a bare `YYYY-MM-DDTHH:MM[:SS]` and an
/// all-day `YYYY-MM-DD` (midnight).
pub fn parse_backend_instant(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Local).naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(value, format) {
            return Some(instant);
        }
    }

    parse_form_date(value).and_then(|date| date.and_hms_opt(0, 0, 0))
}
