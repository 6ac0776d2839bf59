pub mod export;
pub mod text;
pub mod view;

use std::io::IsTerminal;
use std::path::PathBuf;

use colored::Colorize;

use crate::cli::{ReportContext, ReportOutputArgs, SelectionArgs};
use crate::error::{ReportError, Result};
use crate::pipeline::{build_report, MonthRange, Report};
use crate::session::require_principal;

use export::ExportFormat;

#[derive(Debug, PartialEq)]
enum Mode {
    View,
    Text,
    Export,
}

fn choose_mode(args: &ReportOutputArgs, is_tty: bool) -> Result<Mode> {
    if args.output.is_some() {
        return Ok(Mode::Export);
    }
    match args.mode.as_deref() {
        Some("export") => Ok(Mode::Export),
        Some("view") => Ok(Mode::View),
        Some("text") => Ok(Mode::Text),
        Some(other) => Err(ReportError::Other(format!(
            "Unknown mode '{other}' (expected view, text or export)"
        ))),
        None if is_tty => Ok(Mode::View),
        None => Ok(Mode::Text),
    }
}

pub fn run(
    selection: &SelectionArgs,
    from_month: Option<String>,
    to_month: Option<String>,
    output: &ReportOutputArgs,
) -> Result<()> {
    let mode = choose_mode(output, std::io::stdout().is_terminal())?;
    let principal = require_principal()?;
    let ctx = ReportContext::load(selection.brand.as_deref())?;
    let range = MonthRange {
        start: from_month,
        end: to_month,
    };
    let request = ctx.request(principal, selection, range);
    let report = build_report(&ctx.table, &ctx.settings.columns, &request)?;
    let currency = ctx.settings.currency_symbol.as_str();

    match mode {
        Mode::View => view::show(&ctx.brand, &report, currency),
        Mode::Text => {
            print_text(&ctx.brand, &report, currency);
            Ok(())
        }
        Mode::Export => {
            let format = ExportFormat::parse(output.format.as_deref())?;
            let contents = export::render(format, &ctx.brand, &report, currency)?;
            let path = output
                .output
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| export::default_path(&ctx.workbook, &ctx.brand, &report, format));
            export::write(&contents, &path)
        }
    }
}

fn print_text(brand: &str, report: &Report, currency: &str) {
    println!("{}", text::title(brand, report).bold());
    println!("{}", text::format_table(report, currency));
}
