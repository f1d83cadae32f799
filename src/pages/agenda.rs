//! Agenda page: the calendar, the new-appointment dialog and the notices they raise.

use std::sync::Arc;

use crate::models::{to_calendar_events, CalendarEvent};
use crate::pages::appointment_form::{AppointmentFormController, Outcome};
use crate::pages::notice::Notice;
use crate::services::{ApiError, SchedulingService};

const CREATED_MESSAGE: &str = "Agendamento criado com sucesso!";
const CREATE_FAILED_MESSAGE: &str = "Erro ao criar evento. Tente novamente.";
const DELETE_FAILED_MESSAGE: &str = "Erro ao excluir evento.";

pub struct AgendaPage {
    scheduling: Arc<dyn SchedulingService>,
    login_path: String,
    events: Vec<CalendarEvent>,
    dialog: Option<AppointmentFormController>,
    notice: Option<Notice>,
    redirect: Option<String>,
}

impl AgendaPage {
    pub fn new(scheduling: Arc<dyn SchedulingService>, login_path: impl Into<String>) -> Self {
        Self {
            scheduling,
            login_path: login_path.into(),
            events: Vec::new(),
            dialog: None,
            notice: None,
            redirect: None,
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Hand the pending notice to the host, which shows it once
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Path the host must navigate to, set once the session has expired
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub fn dialog(&self) -> Option<&AppointmentFormController> {
        self.dialog.as_ref()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    /// Reload the calendar. Failures other than an expired session keep the current events.
    pub async fn refresh(&mut self) {
        match self.scheduling.list_appointments().await {
            Ok(records) => {
                self.events = to_calendar_events(records);
                tracing::debug!(events = self.events.len(), "Calendar refreshed");
            }
            Err(ApiError::Unauthorized) => self.expire_session(),
            Err(error) => tracing::warn!(error = %error, "Could not load appointments"),
        }
    }

    /// Open the dialog with a fresh draft
    pub fn open_dialog(&mut self) -> &AppointmentFormController {
        self.dialog
            .insert(AppointmentFormController::new(self.scheduling.clone()))
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Submit the open dialog and apply its outcome to the page.
    ///
    /// Returns `None` when no dialog is open.
    pub async fn submit_appointment(&mut self) -> Option<Outcome> {
        let outcome = self.dialog.as_ref()?.submit().await;

        match &outcome {
            Outcome::Created => {
                self.notice = Some(Notice::success(CREATED_MESSAGE));
                self.dialog = None;
                self.refresh().await;
            }
            Outcome::SessionExpired => self.expire_session(),
            Outcome::Failed(_) => self.notice = Some(Notice::error(CREATE_FAILED_MESSAGE)),
            Outcome::Rejected(_) | Outcome::Ignored => {}
        }

        Some(outcome)
    }

    /// Delete one appointment and reload the calendar
    pub async fn delete_appointment(&mut self, id: &str) -> bool {
        match self.scheduling.delete_appointment(id).await {
            Ok(()) => {
                self.refresh().await;
                true
            }
            Err(ApiError::Unauthorized) => {
                self.expire_session();
                false
            }
            Err(error) => {
                tracing::warn!(id, error = %error, "Could not delete appointment");
                self.notice = Some(Notice::error(DELETE_FAILED_MESSAGE));
                false
            }
        }
    }

    fn expire_session(&mut self) {
        tracing::info!(login_path = %self.login_path, "Session expired, redirecting to login");
        self.redirect = Some(self.login_path.clone());
    }
}
