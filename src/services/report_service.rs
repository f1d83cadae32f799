use async_trait::async_trait;

use crate::models::{CreateExpenseRequest, MonthlyReport};
use crate::services::api_client::{ApiClient, ApiError};

const MONTHLY_PATH: &str = "api/relatorios/mensal";
const EXPENSES_PATH: &str = "api/relatorios/despesas";

/// Financial report operations offered by the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportService: Send + Sync {
    async fn monthly_report(&self, month: u32, year: i32) -> Result<MonthlyReport, ApiError>;
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<(), ApiError>;
}

pub struct HttpReportService {
    api: ApiClient,
}

impl HttpReportService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ReportService for HttpReportService {
    async fn monthly_report(&self, month: u32, year: i32) -> Result<MonthlyReport, ApiError> {
        let query = [("mes", month.to_string()), ("ano", year.to_string())];
        self.api.get_json(MONTHLY_PATH, &query).await
    }

    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<(), ApiError> {
        self.api.post_json(EXPENSES_PATH, request).await?;
        tracing::info!(category = %request.category, amount = request.amount, "Expense recorded");
        Ok(())
    }
}
