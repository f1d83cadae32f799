use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::utils::{local_instant, message_of, parse_form_date, parse_form_time, validate_email, validate_title};

/// Fields of the new-appointment form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Title,
    Date,
    StartTime,
    EndTime,
    Description,
    PatientEmail,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Date => "date",
            FormField::StartTime => "startTime",
            FormField::EndTime => "endTime",
            FormField::Description => "description",
            FormField::PatientEmail => "patientEmail",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A new value for one field of the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Title(String),
    Date(Option<NaiveDate>),
    StartTime(Option<NaiveTime>),
    EndTime(Option<NaiveTime>),
    Description(String),
    PatientEmail(String),
}

impl FieldUpdate {
    /// Build an update from raw form input.
    ///
    /// Date and time inputs that do not parse clear the field, which
    /// validation then reports as missing.
    pub fn from_input(field: FormField, raw: &str) -> Self {
        match field {
            FormField::Title => FieldUpdate::Title(raw.to_string()),
            FormField::Date => FieldUpdate::Date(parse_form_date(raw)),
            FormField::StartTime => FieldUpdate::StartTime(parse_form_time(raw)),
            FormField::EndTime => FieldUpdate::EndTime(parse_form_time(raw)),
            FormField::Description => FieldUpdate::Description(raw.to_string()),
            FormField::PatientEmail => FieldUpdate::PatientEmail(raw.to_string()),
        }
    }

    pub fn field(&self) -> FormField {
        match self {
            FieldUpdate::Title(_) => FormField::Title,
            FieldUpdate::Date(_) => FormField::Date,
            FieldUpdate::StartTime(_) => FormField::StartTime,
            FieldUpdate::EndTime(_) => FormField::EndTime,
            FieldUpdate::Description(_) => FormField::Description,
            FieldUpdate::PatientEmail(_) => FormField::PatientEmail,
        }
    }
}

/// Field-level messages from one validation pass; a missing key means valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<FormField, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// The in-progress appointment held while the creation dialog is open.
///
/// Treated as a value: every change produces a new draft via [`AppointmentDraft::with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub description: String,
    pub patient_email: String,
}

impl AppointmentDraft {
    /// Copy of this draft with one field replaced
    pub fn with(&self, update: FieldUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FieldUpdate::Title(value) => next.title = value,
            FieldUpdate::Date(value) => next.date = value,
            FieldUpdate::StartTime(value) => next.start_time = value,
            FieldUpdate::EndTime(value) => next.end_time = value,
            FieldUpdate::Description(value) => next.description = value,
            FieldUpdate::PatientEmail(value) => next.patient_email = value,
        }
        next
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Run every check against the draft as of `now`; checks never short-circuit each other
    pub fn validate_at(&self, now: DateTime<Local>) -> FormErrors {
        let mut errors = FormErrors::new();

        if let Err(error) = validate_title(&self.title) {
            errors.insert(FormField::Title, message_of(&error));
        }

        if self.date.is_none() {
            errors.insert(FormField::Date, "A data é obrigatória.");
        }
        if self.start_time.is_none() {
            errors.insert(FormField::StartTime, "A hora inicial é obrigatória.");
        }
        if self.end_time.is_none() {
            errors.insert(FormField::EndTime, "A hora final é obrigatória.");
        }

        if let (Some(date), Some(start)) = (self.date, self.start_time) {
            // a wall-clock time skipped by a DST jump has no instant to compare
            if local_instant(date, start).is_some_and(|starts_at| starts_at < now) {
                errors.insert(FormField::Date, "A data e hora não podem ser no passado.");
            }
        }

        // Compared as bare times of day: an appointment crossing midnight is
        // reported as ending before it starts.
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end <= start {
                errors.insert(FormField::EndTime, "A hora final deve ser maior que a inicial.");
            }
        }

        if let Err(error) = validate_email(&self.patient_email) {
            errors.insert(FormField::PatientEmail, message_of(&error));
        }

        errors
    }

    /// Wire payload for the scheduling backend, if date and both times are set.
    ///
    /// Both instants share the draft's date; no timezone is attached.
    pub fn to_request(&self) -> Option<CreateAppointmentRequest> {
        let date = self.date?;

        Some(CreateAppointmentRequest {
            title: self.title.clone(),
            starts_at: date.and_time(self.start_time?),
            ends_at: date.and_time(self.end_time?),
            description: self.description.clone(),
            patient_email: self.patient_email.clone(),
        })
    }
}

/// Body of `POST /api/agenda/criar`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "dataInicio")]
    pub starts_at: NaiveDateTime,
    #[serde(rename = "dataFim")]
    pub ends_at: NaiveDateTime,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "emailPaciente")]
    pub patient_email: String,
}

/// One entry of `GET /api/agenda/listar`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "inicio")]
    pub start: String,
    #[serde(rename = "fim", default)]
    pub end: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn valid_draft() -> AppointmentDraft {
        AppointmentDraft {
            title: "Consulta".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 6, 10),
            start_time: Some(time(10, 0)),
            end_time: Some(time(11, 0)),
            description: String::new(),
            patient_email: "p@x.com".to_string(),
        }
    }

    fn now() -> DateTime<Local> {
        at(2030, 6, 1, 9, 0)
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        assert!(valid_draft().validate_at(now()).is_empty());
    }

    #[test]
    fn test_empty_draft_reports_every_required_field() {
        let errors = AppointmentDraft::default().validate_at(now());

        for field in [
            FormField::Title,
            FormField::Date,
            FormField::StartTime,
            FormField::EndTime,
            FormField::PatientEmail,
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains(FormField::Description));
    }

    #[test]
    fn test_checks_do_not_short_circuit() {
        let draft = AppointmentDraft {
            title: " ".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 5, 1),
            start_time: Some(time(15, 0)),
            end_time: Some(time(14, 0)),
            patient_email: "nope".to_string(),
            ..AppointmentDraft::default()
        };

        let errors = draft.validate_at(now());
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(FormField::Date), Some("A data e hora não podem ser no passado."));
        assert_eq!(errors.get(FormField::EndTime), Some("A hora final deve ser maior que a inicial."));
    }

    #[test]
    fn test_long_title_is_rejected_whatever_its_content() {
        for filler in ["a", "ç", "1 "] {
            let draft = valid_draft().with(FieldUpdate::Title(filler.repeat(300)));
            let errors = draft.validate_at(now());
            assert_eq!(
                errors.get(FormField::Title),
                Some("O título não pode ter mais de 255 caracteres.")
            );
        }
    }

    #[test]
    fn test_start_in_the_past_is_rejected() {
        let now = at(2030, 6, 10, 10, 0);

        let one_minute_early = valid_draft().with(FieldUpdate::StartTime(Some(time(9, 59))));
        assert!(one_minute_early.validate_at(now).contains(FormField::Date));

        let yesterday = valid_draft().with(FieldUpdate::Date(NaiveDate::from_ymd_opt(2030, 6, 9)));
        assert!(yesterday.validate_at(now).contains(FormField::Date));
    }

    #[test]
    fn test_start_at_or_after_now_is_accepted() {
        let now = at(2030, 6, 10, 10, 0);

        assert!(!valid_draft().validate_at(now).contains(FormField::Date));
        assert!(!valid_draft()
            .validate_at(now - Duration::seconds(30))
            .contains(FormField::Date));
    }

    #[test]
    fn test_end_time_must_follow_start_time() {
        let equal = valid_draft().with(FieldUpdate::EndTime(Some(time(10, 0))));
        assert!(equal.validate_at(now()).contains(FormField::EndTime));

        let earlier = valid_draft().with(FieldUpdate::EndTime(Some(time(9, 30))));
        assert!(earlier.validate_at(now()).contains(FormField::EndTime));

        let later = valid_draft().with(FieldUpdate::EndTime(Some(time(10, 1))));
        assert!(!later.validate_at(now()).contains(FormField::EndTime));
    }

    #[test]
    fn test_end_time_check_ignores_the_date() {
        // 23:00 -> 01:00 cannot be expressed: the draft has a single date and
        // the comparison only looks at times of day.
        let overnight = valid_draft()
            .with(FieldUpdate::StartTime(Some(time(23, 0))))
            .with(FieldUpdate::EndTime(Some(time(1, 0))));
        assert!(overnight.validate_at(now()).contains(FormField::EndTime));

        for date in [NaiveDate::from_ymd_opt(2030, 6, 10), NaiveDate::from_ymd_opt(2031, 1, 1)] {
            let draft = overnight.with(FieldUpdate::Date(date));
            assert!(draft.validate_at(now()).contains(FormField::EndTime));
        }
    }

    #[test]
    fn test_email_shapes() {
        assert!(!valid_draft()
            .with(FieldUpdate::PatientEmail("a@b.co".to_string()))
            .validate_at(now())
            .contains(FormField::PatientEmail));

        for bad in ["", "pb.co", "p@bco", "p @b.co"] {
            let draft = valid_draft().with(FieldUpdate::PatientEmail(bad.to_string()));
            assert!(draft.validate_at(now()).contains(FormField::PatientEmail), "{bad:?}");
        }
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let original = valid_draft();
        let changed = original.with(FieldUpdate::Description("retorno".to_string()));

        assert_eq!(original.description, "");
        assert_eq!(changed.description, "retorno");
        assert_eq!(changed.title, original.title);
    }

    #[test]
    fn test_from_input_parses_and_clears() {
        assert_eq!(
            FieldUpdate::from_input(FormField::StartTime, "08:15"),
            FieldUpdate::StartTime(Some(time(8, 15)))
        );
        assert_eq!(
            FieldUpdate::from_input(FormField::Date, "31/12/2030"),
            FieldUpdate::Date(None)
        );
        assert_eq!(FieldUpdate::from_input(FormField::Title, " x ").field(), FormField::Title);
    }

    #[test]
    fn test_request_serializes_backend_field_names() {
        let request = valid_draft()
            .with(FieldUpdate::Description("primeira consulta".to_string()))
            .to_request()
            .unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["titulo"], "Consulta");
        assert_eq!(json["dataInicio"], "2030-06-10T10:00:00");
        assert_eq!(json["dataFim"], "2030-06-10T11:00:00");
        assert_eq!(json["descricao"], "primeira consulta");
        assert_eq!(json["emailPaciente"], "p@x.com");
    }

    #[test]
    fn test_request_needs_date_and_times() {
        assert!(AppointmentDraft::default().to_request().is_none());
        assert!(valid_draft().with(FieldUpdate::EndTime(None)).to_request().is_none());
    }

    #[test]
    fn test_form_errors_serialize_with_field_keys() {
        let mut errors = FormErrors::new();
        errors.insert(FormField::PatientEmail, "Insira um e-mail válido.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["patientEmail"], "Insira um e-mail válido.");
    }

    #[test]
    fn test_record_defaults_optional_fields() {
        let record: AppointmentRecord =
            serde_json::from_str(r#"{"titulo":"Retorno","inicio":"2030-06-10T10:00:00"}"#).unwrap();

        assert_eq!(record.title, "Retorno");
        assert_eq!(record.end, None);
        assert_eq!(record.id, None);
    }
}
