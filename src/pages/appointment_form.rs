//! New-appointment dialog: holds the draft, validates it and submits it once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

use crate::models::{AppointmentDraft, FieldUpdate, FormErrors, FormField};
use crate::services::{ApiError, SchedulingService};
use crate::utils::now_local;

/// Where the form is in its submission lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    /// Terminal: the appointment exists, the dialog should close
    Created,
    /// Terminal: the host must send the user to the login page
    SessionExpired,
}

/// Result of one `submit` call, rendered by the host page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    SessionExpired,
    /// The backend refused or could not be reached; the draft is kept for a retry
    Failed(String),
    /// Validation failed; nothing was sent
    Rejected(FormErrors),
    /// A submission is already in flight or the dialog session has ended
    Ignored,
}

#[derive(Debug, Default)]
struct FormState {
    draft: AppointmentDraft,
    errors: FormErrors,
    phase: FormPhase,
}

fn lock(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Leaves `Submitting` however the request ends, including when the
/// submitting future is dropped mid-flight.
struct SubmittingGuard<'a> {
    state: &'a Mutex<FormState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.phase == FormPhase::Submitting {
            state.phase = FormPhase::Idle;
        }
    }
}

/// Controller behind the "Novo Agendamento" dialog.
///
/// One instance lives for one dialog session. All methods take `&self`; the
/// lock is never held across the backend call.
pub struct AppointmentFormController {
    scheduling: Arc<dyn SchedulingService>,
    state: Mutex<FormState>,
}

impl AppointmentFormController {
    pub fn new(scheduling: Arc<dyn SchedulingService>) -> Self {
        Self {
            scheduling,
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn draft(&self) -> AppointmentDraft {
        lock(&self.state).draft.clone()
    }

    /// Errors from the latest validation pass
    pub fn errors(&self) -> FormErrors {
        lock(&self.state).errors.clone()
    }

    pub fn phase(&self) -> FormPhase {
        lock(&self.state).phase
    }

    /// Whether the confirm button should be disabled and show progress
    pub fn is_submitting(&self) -> bool {
        self.phase() == FormPhase::Submitting
    }

    /// Replace one field of the draft. Does not validate.
    pub fn update_field(&self, update: FieldUpdate) {
        tracing::trace!(field = %update.field(), "Draft field updated");
        let mut state = lock(&self.state);
        state.draft = state.draft.with(update);
    }

    /// Replace one field from raw form input
    pub fn update_input(&self, field: FormField, raw: &str) {
        self.update_field(FieldUpdate::from_input(field, raw));
    }

    pub fn validate(&self) -> FormErrors {
        self.validate_at(now_local())
    }

    /// Validate against `now` and publish the result as the form's error state
    pub fn validate_at(&self, now: DateTime<Local>) -> FormErrors {
        let mut state = lock(&self.state);
        let errors = state.draft.validate_at(now);
        state.errors = errors.clone();
        errors
    }

    /// Validate, then send the draft to the scheduling backend
    pub async fn submit(&self) -> Outcome {
        let request = {
            let mut state = lock(&self.state);

            if state.phase != FormPhase::Idle {
                tracing::debug!(phase = ?state.phase, "Ignoring appointment submit");
                return Outcome::Ignored;
            }

            let errors = state.draft.validate_at(now_local());
            state.errors = errors.clone();
            if !errors.is_empty() {
                tracing::debug!(invalid_fields = errors.len(), "Appointment draft rejected");
                return Outcome::Rejected(errors);
            }

            let Some(request) = state.draft.to_request() else {
                return Outcome::Rejected(errors);
            };
            state.phase = FormPhase::Submitting;
            request
        };

        let _submitting = SubmittingGuard { state: &self.state };
        let result = self.scheduling.create_appointment(&request).await;

        // released before `_submitting`, which then only resets a failed attempt
        let mut state = lock(&self.state);
        match result {
            Ok(()) => {
                state.draft = AppointmentDraft::default();
                state.errors = FormErrors::new();
                state.phase = FormPhase::Created;
                Outcome::Created
            }
            Err(ApiError::Unauthorized) => {
                state.phase = FormPhase::SessionExpired;
                Outcome::SessionExpired
            }
            Err(error) => {
                tracing::error!(error = %error, "Appointment submission failed");
                Outcome::Failed(error.to_string())
            }
        }
    }
}
