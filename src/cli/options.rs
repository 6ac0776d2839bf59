use colored::Colorize;

use crate::cli::{ReportContext, SelectionArgs};
use crate::error::Result;
use crate::pipeline::{build_report, MonthRange, Report};
use crate::session::require_principal;

/// Render the choices available for the current selection, one section per
/// filter, in the order the filters apply.
pub fn format_options(brand: &str, report: &Report) -> String {
    let list = |items: Vec<&str>| {
        if items.is_empty() {
            "  (none)".to_string()
        } else {
            items.iter().map(|i| format!("  {i}")).collect::<Vec<_>>().join("\n")
        }
    };
    let mut out = format!("Brand: {}\nManager: {}\n", brand.bold(), report.principal);
    out.push_str(&format!(
        "\nSupervisors\n{}\n",
        list(report.supervisors.iter().map(String::as_str).collect())
    ));
    out.push_str(&format!(
        "\nRepresentatives\n{}\n",
        list(report.representatives.iter().map(String::as_str).collect())
    ));
    out.push_str(&format!(
        "\nMonths\n{}",
        list(report.months.iter().map(|m| m.label.as_str()).collect())
    ));
    out
}

pub fn run(selection: &SelectionArgs) -> Result<()> {
    let principal = require_principal()?;
    let ctx = ReportContext::load(selection.brand.as_deref())?;
    let request = ctx.request(principal, selection, MonthRange::default());
    let report = build_report(&ctx.table, &ctx.settings.columns, &request)?;
    println!("{}", format_options(&ctx.brand, &report));
    Ok(())
}
