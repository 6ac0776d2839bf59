use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::models::MonthlyTotal;
use crate::pipeline::Report;

use super::text::format_report;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some("text") | Some("txt") => Ok(Self::Text),
            Some(other) => Err(ReportError::Other(format!(
                "Unknown export format '{other}' (expected csv, json or text)"
            ))),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    brand: &'a str,
    manager: &'a str,
    from: &'a str,
    to: &'a str,
    months: &'a [MonthlyTotal],
}

pub fn render_csv(report: &Report) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for total in &report.totals {
        wtr.serialize(total)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ReportError::Other(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Other(e.to_string()))
}

pub fn render_json(brand: &str, report: &Report) -> Result<String> {
    let doc = JsonExport {
        brand,
        manager: report.principal.id(),
        from: &report.start.label,
        to: &report.end.label,
        months: &report.totals,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn render(format: ExportFormat, brand: &str, report: &Report, currency: &str) -> Result<String> {
    match format {
        ExportFormat::Csv => render_csv(report),
        ExportFormat::Json => render_json(brand, report),
        ExportFormat::Text => Ok(format!("{}\n", format_report(brand, report, currency))),
    }
}

/// `<workbook dir>/exports/<brand>-<manager>-<date>.<ext>`, spaces replaced.
pub fn default_path(workbook: &Path, brand: &str, report: &Report, format: ExportFormat) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let slug = |s: &str| s.trim().replace(['/', '\\', ' '], "_");
    let name = format!(
        "{}-{}-{date}.{}",
        slug(brand),
        slug(report.principal.id()),
        format.extension()
    );
    workbook
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("exports")
        .join(name)
}

pub fn write(contents: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "report exported");
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthKey, Principal};
    use chrono::NaiveDate;

    fn report() -> Report {
        let jan = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mar = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        Report {
            principal: Principal::new("ALICE"),
            supervisors: vec!["S1".into()],
            representatives: vec!["R1".into()],
            months: vec![jan.clone(), mar.clone()],
            totals: vec![
                MonthlyTotal {
                    month_label: jan.label.clone(),
                    month_ord: jan.ord,
                    weight_total: 100.0,
                    revenue_total: 1000.0,
                },
                MonthlyTotal {
                    month_label: mar.label.clone(),
                    month_ord: mar.ord,
                    weight_total: 35.0,
                    revenue_total: 350.5,
                },
            ],
            start: jan,
            end: mar,
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::parse(None).unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("JSON")).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse(Some("txt")).unwrap(), ExportFormat::Text);
        assert!(ExportFormat::parse(Some("pdf")).is_err());
    }

    #[test]
    fn test_render_csv() {
        let csv = render_csv(&report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "month,weight_total,revenue_total");
        assert_eq!(lines[1], "Jan/2024,100.0,1000.0");
        assert_eq!(lines[2], "Mar/2024,35.0,350.5");
    }

    #[test]
    fn test_render_json() {
        let json = render_json("Marca A", &report()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["brand"], "Marca A");
        assert_eq!(v["manager"], "ALICE");
        assert_eq!(v["from"], "Jan/2024");
        assert_eq!(v["to"], "Mar/2024");
        assert_eq!(v["months"][1]["month"], "Mar/2024");
        assert_eq!(v["months"][1]["weight_total"], 35.0);
        assert!(v["months"][0].get("month_ord").is_none());
    }

    #[test]
    fn test_default_path_next_to_workbook() {
        let path = default_path(Path::new("/data/vendas.xlsx"), "Marca A", &report(), ExportFormat::Json);
        assert!(path.starts_with("/data/exports"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Marca_A-ALICE-"), "got {name}");
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn test_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("r.csv");
        write("month\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "month\n");
    }
}
