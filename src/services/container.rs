use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    ApiClient, ApiError, HttpReportService, HttpSchedulingService, ReportService, SchedulingService,
};

/// Service container for dependency injection
///
/// Builds one shared [`ApiClient`] from configuration and hands out the
/// backend collaborators the pages depend on.
#[derive(Clone)]
pub struct ServiceContainer {
    scheduling_service: Arc<dyn SchedulingService>,
    report_service: Arc<dyn ReportService>,
}

impl ServiceContainer {
    /// Wire the HTTP implementations against `config.backend`
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.backend)?;
        tracing::debug!(base_url = %api.base_url(), "Backend client ready");

        Ok(Self {
            scheduling_service: Arc::new(HttpSchedulingService::new(api.clone())),
            report_service: Arc::new(HttpReportService::new(api)),
        })
    }

    /// Assemble a container from existing implementations (tests, alternative backends)
    pub fn from_parts(
        scheduling_service: Arc<dyn SchedulingService>,
        report_service: Arc<dyn ReportService>,
    ) -> Self {
        Self {
            scheduling_service,
            report_service,
        }
    }

    pub fn scheduling_service(&self) -> Arc<dyn SchedulingService> {
        self.scheduling_service.clone()
    }

    pub fn report_service(&self) -> Arc<dyn ReportService> {
        self.report_service.clone()
    }
}
