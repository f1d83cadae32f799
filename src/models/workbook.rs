use serde::Serialize;

use super::report::{CategoryTotal, MonthlyReport};

/// A spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

/// One worksheet: a header row followed by data rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    /// Column widths in characters
    pub column_widths: Vec<u16>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Workbook handed to the spreadsheet writer on export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub file_name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Build the monthly financial export for `month`/`year`
    pub fn monthly_report(report: &MonthlyReport, month: u32, year: i32) -> Self {
        let summary = Sheet {
            name: "Resumo Geral".to_string(),
            column_widths: vec![25, 15],
            header: vec!["Indicador".to_string(), "Valor".to_string()],
            rows: vec![
                vec![text("Mês de Referência"), text(&format!("{}/{}", month, year))],
                vec![text("Receita Total"), Cell::Number(report.total_income)],
                vec![text("Despesas Totais"), Cell::Number(report.total_expenses)],
                vec![text("Saldo Final"), Cell::Number(report.balance)],
                vec![text("A Receber"), Cell::Number(report.receivable)],
            ],
        };

        Self {
            file_name: format!("Relatorio_Financeiro_{}_{}.xlsx", month, year),
            sheets: vec![
                summary,
                category_sheet("Detalhe Receitas", &report.income_by_category),
                category_sheet("Detalhe Despesas", &report.expenses_by_category),
            ],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

fn category_sheet(name: &str, categories: &[CategoryTotal]) -> Sheet {
    Sheet {
        name: name.to_string(),
        column_widths: vec![30, 15],
        header: vec!["Categoria".to_string(), "Valor".to_string()],
        rows: categories
            .iter()
            .map(|category| vec![text(&category.name), Cell::Number(category.amount)])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> MonthlyReport {
        MonthlyReport {
            total_income: 2000.0,
            total_expenses: 750.0,
            balance: 1250.0,
            receivable: 400.0,
            income_by_category: vec![CategoryTotal {
                name: "Consultas".to_string(),
                amount: 2000.0,
            }],
            expenses_by_category: vec![
                CategoryTotal {
                    name: "Aluguel".to_string(),
                    amount: 600.0,
                },
                CategoryTotal {
                    name: "Luz".to_string(),
                    amount: 150.0,
                },
            ],
        }
    }

    #[test]
    fn test_workbook_layout() {
        let workbook = Workbook::monthly_report(&report(), 3, 2025);

        assert_eq!(workbook.file_name, "Relatorio_Financeiro_3_2025.xlsx");
        let names: Vec<_> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Resumo Geral", "Detalhe Receitas", "Detalhe Despesas"]);
    }

    #[test]
    fn test_summary_sheet_rows() {
        let workbook = Workbook::monthly_report(&report(), 3, 2025);
        let summary = workbook.sheet("Resumo Geral").unwrap();

        assert_eq!(summary.column_widths, [25, 15]);
        assert_eq!(summary.rows[0][1], Cell::Text("3/2025".to_string()));
        assert_eq!(summary.rows[3], vec![text("Saldo Final"), Cell::Number(1250.0)]);
    }

    #[test]
    fn test_category_sheets_list_every_category() {
        let workbook = Workbook::monthly_report(&report(), 3, 2025);
        let expenses = workbook.sheet("Detalhe Despesas").unwrap();

        assert_eq!(expenses.column_widths, [30, 15]);
        assert_eq!(expenses.rows.len(), 2);
        assert_eq!(expenses.rows[1][0], text("Luz"));
    }
}
