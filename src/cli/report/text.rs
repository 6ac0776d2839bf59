use comfy_table::{Cell, CellAlignment, Table};

use crate::fmt::{money, weight};
use crate::pipeline::Report;

/// One-line description of what the report covers.
pub fn title(brand: &str, report: &Report) -> String {
    let period = if report.start == report.end {
        report.start.label.clone()
    } else {
        format!("{} to {}", report.start.label, report.end.label)
    };
    format!("{brand} | manager {} | {period}", report.principal)
}

/// Summary table: one row per month plus a total row.
pub fn format_table(report: &Report, currency: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Total Weight", "Total Revenue"]);
    for t in &report.totals {
        table.add_row(vec![
            Cell::new(&t.month_label),
            Cell::new(weight(t.weight_total)).set_alignment(CellAlignment::Right),
            Cell::new(money(t.revenue_total, currency)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(weight(report.total_weight())).set_alignment(CellAlignment::Right),
        Cell::new(money(report.total_revenue(), currency)).set_alignment(CellAlignment::Right),
    ]);
    table.to_string()
}

pub fn format_report(brand: &str, report: &Report, currency: &str) -> String {
    format!("{}\n{}", title(brand, report), format_table(report, currency))
}
