//! Monthly financial report page with its expense dialog and spreadsheet export.

use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;

use crate::models::{ExpenseDraft, ExpenseField, MonthlyReport, PieSlice, Workbook};
use crate::pages::notice::Notice;
use crate::services::{ApiError, ReportService};
use crate::utils::{format_brl, format_validation_errors, now_local};

const MISSING_FIELDS_MESSAGE: &str = "Preencha todos os campos da despesa.";
const SAVE_FAILED_MESSAGE: &str = "Erro ao salvar despesa.";
const SAVED_MESSAGE: &str = "Despesa registrada com sucesso!";
const NOTHING_TO_EXPORT_MESSAGE: &str = "Nenhum relatório carregado para exportar.";

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Portuguese name of a month in 1..=12
pub fn month_label(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_NAMES.get(index).copied()
}

/// Colour hint for a summary card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

pub struct ReportsPage {
    reports: Arc<dyn ReportService>,
    login_path: String,
    year: i32,
    month: u32,
    report: Option<MonthlyReport>,
    expense_dialog: Option<ExpenseDraft>,
    notice: Option<Notice>,
    redirect: Option<String>,
}

impl ReportsPage {
    /// Page for `year`, starting on the current month
    pub fn new(reports: Arc<dyn ReportService>, login_path: impl Into<String>, year: i32) -> Self {
        Self {
            reports,
            login_path: login_path.into(),
            year,
            month: now_local().month(),
            report: None,
            expense_dialog: None,
            notice: None,
            redirect: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn report(&self) -> Option<&MonthlyReport> {
        self.report.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Switch to another month and reload; months outside 1..=12 are refused
    pub async fn select_month(&mut self, month: u32) -> bool {
        if month_label(month).is_none() {
            tracing::debug!(month, "Ignoring invalid month selection");
            return false;
        }

        self.month = month;
        self.load().await;
        true
    }

    /// Fetch the report for the selected month
    pub async fn load(&mut self) {
        match self.reports.monthly_report(self.month, self.year).await {
            Ok(report) => self.report = Some(report),
            Err(ApiError::Unauthorized) => {
                self.report = None;
                self.expire_session();
            }
            Err(error) => {
                tracing::warn!(month = self.month, year = self.year, error = %error, "Could not load monthly report");
                self.report = None;
            }
        }
    }

    /// Receita Total, Despesas Totais, Saldo and A Receber, zero when nothing is loaded
    pub fn summary_cards(&self) -> Vec<SummaryCard> {
        let report = self.report.clone().unwrap_or_default();
        let balance_tone = if report.balance < 0.0 {
            Tone::Negative
        } else {
            Tone::Positive
        };

        vec![
            SummaryCard {
                label: "Receita Total",
                value: format_brl(report.total_income),
                tone: Tone::Positive,
            },
            SummaryCard {
                label: "Despesas Totais",
                value: format_brl(report.total_expenses),
                tone: Tone::Negative,
            },
            SummaryCard {
                label: "Saldo",
                value: format_brl(report.balance),
                tone: balance_tone,
            },
            SummaryCard {
                label: "A Receber",
                value: format_brl(report.receivable),
                tone: Tone::Neutral,
            },
        ]
    }

    pub fn income_slices(&self) -> Vec<PieSlice> {
        self.report.as_ref().map(MonthlyReport::income_slices).unwrap_or_default()
    }

    pub fn expense_slices(&self) -> Vec<PieSlice> {
        self.report.as_ref().map(MonthlyReport::expense_slices).unwrap_or_default()
    }

    /// Spreadsheet for the loaded report
    pub fn export(&mut self) -> Option<Workbook> {
        let Some(report) = self.report.as_ref() else {
            self.notice = Some(Notice::info(NOTHING_TO_EXPORT_MESSAGE));
            return None;
        };

        let workbook = Workbook::monthly_report(report, self.month, self.year);
        tracing::info!(file_name = %workbook.file_name, "Report exported");
        Some(workbook)
    }

    pub fn expense_draft(&self) -> Option<&ExpenseDraft> {
        self.expense_dialog.as_ref()
    }

    pub fn is_expense_dialog_open(&self) -> bool {
        self.expense_dialog.is_some()
    }

    pub fn open_expense_dialog(&mut self) {
        self.expense_dialog = Some(ExpenseDraft::default());
    }

    pub fn close_expense_dialog(&mut self) {
        self.expense_dialog = None;
    }

    /// Replace one field of the open expense dialog
    pub fn update_expense(&mut self, field: ExpenseField, value: &str) {
        if let Some(draft) = self.expense_dialog.as_mut() {
            *draft = draft.with(field, value);
        }
    }

    /// Validate and record the expense, then reload the report
    pub async fn save_expense(&mut self) -> bool {
        let Some(draft) = self.expense_dialog.as_ref() else {
            return false;
        };

        let request = match draft.to_request() {
            Ok(request) => request,
            Err(errors) => {
                let missing = errors
                    .field_errors()
                    .values()
                    .flat_map(|errors| errors.iter())
                    .any(|error| error.code == "length");
                let message = if missing {
                    MISSING_FIELDS_MESSAGE.to_string()
                } else {
                    format_validation_errors(&errors)
                };
                self.notice = Some(Notice::error(message));
                return false;
            }
        };

        match self.reports.create_expense(&request).await {
            Ok(()) => {
                self.expense_dialog = None;
                self.notice = Some(Notice::success(SAVED_MESSAGE));
                self.load().await;
                true
            }
            Err(ApiError::Unauthorized) => {
                self.expire_session();
                false
            }
            Err(error) => {
                tracing::error!(error = %error, "Expense could not be saved");
                self.notice = Some(Notice::error(SAVE_FAILED_MESSAGE));
                false
            }
        }
    }

    fn expire_session(&mut self) {
        tracing::info!(login_path = %self.login_path, "Session expired, redirecting to login");
        self.redirect = Some(self.login_path.clone());
    }
}
