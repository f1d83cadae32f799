/// Format an amount the way the report cards and chart tooltips show it
pub fn format_brl(value: f64) -> String {
    if value.is_finite() {
        format!("R$ {:.2}", value)
    } else {
        "R$ 0.00".to_string()
    }
}
