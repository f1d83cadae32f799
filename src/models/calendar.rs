use chrono::NaiveDateTime;
use serde::Serialize;

use super::appointment::AppointmentRecord;
use crate::utils::parse_backend_instant;

/// An appointment in the shape the calendar widget renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// The record as the backend sent it
    pub resource: AppointmentRecord,
}

impl CalendarEvent {
    /// Map a backend record; `None` when its start instant is unreadable.
    ///
    /// A missing or unreadable end falls back to the start.
    pub fn from_record(record: AppointmentRecord) -> Option<Self> {
        let start = parse_backend_instant(&record.start)?;
        let end = record
            .end
            .as_deref()
            .and_then(parse_backend_instant)
            .unwrap_or(start);

        Some(Self {
            title: record.title.clone(),
            start,
            end,
            resource: record,
        })
    }
}

/// Map every readable record, logging the ones that cannot be placed on the calendar
pub fn to_calendar_events(records: Vec<AppointmentRecord>) -> Vec<CalendarEvent> {
    records
        .into_iter()
        .filter_map(|record| {
            let raw_start = record.start.clone();
            let event = CalendarEvent::from_record(record);
            if event.is_none() {
                tracing::warn!(start = %raw_start, "Skipping appointment with unreadable start");
            }
            event
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: &str, end: Option<&str>) -> AppointmentRecord {
        AppointmentRecord {
            id: Some("evt-1".to_string()),
            title: "Consulta Maria".to_string(),
            start: start.to_string(),
            end: end.map(str::to_string),
            description: None,
        }
    }

    #[test]
    fn test_end_defaults_to_start() {
        let event = CalendarEvent::from_record(record("2030-06-10T10:00:00", None)).unwrap();

        assert_eq!(event.title, "Consulta Maria");
        assert_eq!(event.start, event.end);
        assert_eq!(event.resource.id.as_deref(), Some("evt-1"));
    }

    #[test]
    fn test_explicit_end_is_kept() {
        let event =
            CalendarEvent::from_record(record("2030-06-10T10:00:00", Some("2030-06-10T11:30:00"))).unwrap();

        assert_eq!((event.end - event.start).num_minutes(), 90);
    }

    #[test]
    fn test_unreadable_records_are_skipped() {
        let events = to_calendar_events(vec![
            record("2030-06-10T10:00:00", None),
            record("quando der", None),
            record("2030-06-11", Some("lixo")),
        ]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].start, events[1].end);
    }
}
