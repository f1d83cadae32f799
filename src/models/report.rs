use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::utils::parse_form_date;

/// Amount booked under one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor")]
    pub amount: f64,
}

/// Body of `GET /api/relatorios/mensal`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    #[serde(rename = "receitaTotal", default)]
    pub total_income: f64,
    #[serde(rename = "despesasTotais", default)]
    pub total_expenses: f64,
    #[serde(rename = "saldo", default)]
    pub balance: f64,
    #[serde(rename = "aReceber", default)]
    pub receivable: f64,
    #[serde(rename = "receitasPorCategoria", default)]
    pub income_by_category: Vec<CategoryTotal>,
    #[serde(rename = "despesasPorCategoria", default)]
    pub expenses_by_category: Vec<CategoryTotal>,
}

const INCOME_COLORS: [&str; 3] = ["#10b981", "#34d399", "#6ee7b7"];
const EXPENSE_COLORS: [&str; 3] = ["#ef4444", "#f87171", "#fca5a5"];

/// One wedge of a category pie chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub amount: f64,
    pub color: &'static str,
}

fn slices(total: f64, categories: &[CategoryTotal], palette: &[&'static str]) -> Vec<PieSlice> {
    if total <= 0.0 {
        return Vec::new();
    }

    categories
        .iter()
        .zip(palette.iter().cycle())
        .map(|(category, color)| PieSlice {
            name: category.name.clone(),
            amount: category.amount,
            color: *color,
        })
        .collect()
}

impl MonthlyReport {
    /// Income pie; empty when the month has no income
    pub fn income_slices(&self) -> Vec<PieSlice> {
        slices(self.total_income, &self.income_by_category, &INCOME_COLORS)
    }

    /// Expense pie; empty when the month has no expenses
    pub fn expense_slices(&self) -> Vec<PieSlice> {
        slices(self.total_expenses, &self.expenses_by_category, &EXPENSE_COLORS)
    }
}

/// Fields of the expense dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseField {
    Category,
    Description,
    Amount,
    Date,
}

/// Raw input of the expense dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ExpenseDraft {
    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
    #[validate(length(min = 1, message = "O valor é obrigatório."))]
    pub amount: String,
    #[validate(length(min = 1, message = "A data é obrigatória."))]
    pub date: String,
}

impl ExpenseDraft {
    pub fn with(&self, field: ExpenseField, value: &str) -> Self {
        let mut next = self.clone();
        let slot = match field {
            ExpenseField::Category => &mut next.category,
            ExpenseField::Description => &mut next.description,
            ExpenseField::Amount => &mut next.amount,
            ExpenseField::Date => &mut next.date,
        };
        *slot = value.to_string();
        next
    }

    /// Validate and convert into the backend payload
    pub fn to_request(&self) -> Result<CreateExpenseRequest, ValidationErrors> {
        self.validate()?;

        let mut errors = ValidationErrors::new();

        // pt-BR users type a decimal comma
        let amount = self.amount.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite());
        if amount.is_none() {
            errors.add("amount", invalid("number", "Informe um valor numérico."));
        }

        let paid_on = parse_form_date(&self.date);
        if paid_on.is_none() {
            errors.add("date", invalid("date", "Informe uma data válida."));
        }

        match (amount, paid_on) {
            (Some(amount), Some(paid_on)) => Ok(CreateExpenseRequest {
                description: self.description.clone(),
                category: self.category.clone(),
                amount,
                paid_on,
            }),
            _ => Err(errors),
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Body of `POST /api/relatorios/despesas`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "dataPagamento")]
    pub paid_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> MonthlyReport {
        serde_json::from_value(serde_json::json!({
            "receitaTotal": 1500.0,
            "despesasTotais": 0.0,
            "saldo": 1500.0,
            "aReceber": 300.0,
            "receitasPorCategoria": [
                {"nome": "Consultas", "valor": 900.0},
                {"nome": "Exames", "valor": 300.0},
                {"nome": "Retornos", "valor": 200.0},
                {"nome": "Outros", "valor": 100.0}
            ],
            "despesasPorCategoria": [{"nome": "Aluguel", "valor": 0.0}]
        }))
        .unwrap()
    }

    #[test]
    fn test_report_deserializes_backend_names() {
        let report = sample_report();

        assert_eq!(report.total_income, 1500.0);
        assert_eq!(report.receivable, 300.0);
        assert_eq!(report.income_by_category[0].name, "Consultas");
    }

    #[test]
    fn test_missing_report_fields_default_to_zero() {
        let report: MonthlyReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report, MonthlyReport::default());
    }

    #[test]
    fn test_slice_colors_cycle() {
        let slices = sample_report().income_slices();

        assert_eq!(slices.len(), 4);
        assert_eq!(slices[0].color, "#10b981");
        assert_eq!(slices[3].color, "#10b981");
        assert_eq!(slices[2].color, "#6ee7b7");
    }

    #[test]
    fn test_no_slices_without_total() {
        assert!(sample_report().expense_slices().is_empty());
    }

    fn filled_expense() -> ExpenseDraft {
        ExpenseDraft::default()
            .with(ExpenseField::Category, "Aluguel")
            .with(ExpenseField::Description, "Sala de novembro")
            .with(ExpenseField::Amount, "1200,50")
            .with(ExpenseField::Date, "2025-11-05")
    }

    #[test]
    fn test_expense_request_from_filled_draft() {
        let request = filled_expense().to_request().unwrap();

        assert_eq!(request.amount, 1200.5);
        assert_eq!(request.paid_on, NaiveDate::from_ymd_opt(2025, 11, 5).unwrap());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["categoria"], "Aluguel");
        assert_eq!(json["dataPagamento"], "2025-11-05");
    }

    #[test]
    fn test_expense_requires_every_field() {
        let errors = ExpenseDraft::default().to_request().unwrap_err();
        assert_eq!(errors.field_errors().len(), 4);
    }

    #[test]
    fn test_expense_rejects_non_numeric_amount_and_bad_date() {
        let draft = filled_expense()
            .with(ExpenseField::Amount, "doze")
            .with(ExpenseField::Date, "ontem");

        let errors = draft.to_request().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }
}
