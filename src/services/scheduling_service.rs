use async_trait::async_trait;

use crate::models::{AppointmentRecord, CreateAppointmentRequest};
use crate::services::api_client::{ApiClient, ApiError};

const LIST_PATH: &str = "api/agenda/listar";
const CREATE_PATH: &str = "api/agenda/criar";
const DELETE_PATH: &str = "api/agenda/deletar";

/// Appointment operations offered by the agenda backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchedulingService: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, ApiError>;
    async fn create_appointment(&self, request: &CreateAppointmentRequest) -> Result<(), ApiError>;
    async fn delete_appointment(&self, id: &str) -> Result<(), ApiError>;
}

/// Whether a successful create reply carries the backend's error wording
fn reply_reports_failure(reply: &str) -> bool {
    reply
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
        .starts_with("erro")
}

/// [`SchedulingService`] backed by the dashboard REST API
pub struct HttpSchedulingService {
    api: ApiClient,
}

impl HttpSchedulingService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SchedulingService for HttpSchedulingService {
    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, ApiError> {
        let records: Vec<AppointmentRecord> = self.api.get_json(LIST_PATH, &[]).await?;
        tracing::info!(count = records.len(), "Appointments loaded");
        Ok(records)
    }

    async fn create_appointment(&self, request: &CreateAppointmentRequest) -> Result<(), ApiError> {
        let reply = self.api.post_json(CREATE_PATH, request).await?;
        // the backend answers some failures with 200 and an error text; only the status is trusted
        if reply_reports_failure(&reply) {
            tracing::warn!(starts_at = %request.starts_at, reply = %reply.trim(), "Create accepted with an error reply");
        } else {
            tracing::info!(starts_at = %request.starts_at, reply = %reply.trim(), "Appointment created");
        }
        Ok(())
    }

    async fn delete_appointment(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete(DELETE_PATH, id).await?;
        tracing::info!(id, "Appointment deleted");
        Ok(())
    }
}
