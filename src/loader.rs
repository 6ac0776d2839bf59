use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{ReportError, Result};
use crate::models::{RawTable, RawValue};
use crate::normalize::excel_serial_to_date;

// ---------------------------------------------------------------------------
// Workbook kinds, dispatched on the file extension
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkbookKind {
    Spreadsheet,
    Csv,
}

impl WorkbookKind {
    pub fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "csv" => Ok(Self::Csv),
            other => Err(ReportError::Other(format!(
                "Unsupported workbook format '{other}' ({})",
                path.display()
            ))),
        }
    }
}

/// Sheet (brand) names in workbook order. A CSV file is a single sheet named
/// after its file stem.
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    match WorkbookKind::for_path(path)? {
        WorkbookKind::Spreadsheet => {
            let workbook = calamine::open_workbook_auto(path)?;
            Ok(workbook.sheet_names())
        }
        WorkbookKind::Csv => {
            if !path.exists() {
                return Err(ReportError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )));
            }
            Ok(vec![csv_sheet_name(path)])
        }
    }
}

fn csv_sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data")
        .to_string()
}

/// Pick the requested sheet, or the first one when none is given.
pub fn select_sheet(sheets: &[String], requested: Option<&str>) -> Result<String> {
    match requested {
        Some(name) => sheets
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| ReportError::UnknownBrand(format!("{name} (available: {})", sheets.join(", ")))),
        None => sheets
            .first()
            .cloned()
            .ok_or_else(|| ReportError::EmptyResult("workbook has no sheets".into())),
    }
}

/// Read one sheet fully into memory. The first row is the header.
pub fn load_sheet(path: &Path, sheet: &str) -> Result<RawTable> {
    let table = match WorkbookKind::for_path(path)? {
        WorkbookKind::Spreadsheet => load_spreadsheet(path, sheet)?,
        WorkbookKind::Csv => {
            let name = csv_sheet_name(path);
            if sheet != name {
                return Err(ReportError::UnknownBrand(format!("{sheet} (available: {name})")));
            }
            load_csv(path)?
        }
    };
    tracing::info!(
        sheet,
        columns = table.columns.len(),
        rows = table.row_count(),
        "loaded sheet"
    );
    Ok(table)
}

fn convert_cell(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Empty,
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::Bool(b) => RawValue::Text(b.to_string()),
        Data::String(s) => RawValue::Text(s.clone()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(RawValue::Date)
            .unwrap_or(RawValue::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
    }
}

fn load_spreadsheet(path: &Path, sheet: &str) -> Result<RawTable> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|s| s == sheet) {
        return Err(ReportError::UnknownBrand(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let header: Vec<String> = header_row
        .iter()
        .map(|c| convert_cell(c).to_text().trim().to_string())
        .collect();
    let data: Vec<Vec<RawValue>> = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .filter(|row: &Vec<RawValue>| row.iter().any(|v| *v != RawValue::Empty))
        .collect();
    Ok(RawTable::from_rows(header, data))
}

fn convert_field(field: &str) -> RawValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        RawValue::Empty
    } else {
        RawValue::Text(trimmed.to_string())
    }
}

fn load_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let header: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut data = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        data.push(record.iter().map(convert_field).collect());
    }
    Ok(RawTable::from_rows(header, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_xlsx(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("dados.xlsx");
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("Marca A").unwrap();
        for (c, h) in ["Gerente", "Data", "Peso", "Faturamento"].iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        ws.write_number(1, 0, 15843.0).unwrap();
        ws.write_number(1, 1, 45306.0).unwrap();
        ws.write_number(1, 2, 100.0).unwrap();
        ws.write_string(1, 3, "1.000,00").unwrap();
        let ws2 = wb.add_worksheet();
        ws2.set_name("Marca B").unwrap();
        ws2.write_string(0, 0, "Gerente").unwrap();
        wb.save(&path).unwrap();
        path
    }

    #[test]
    fn test_list_sheets_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(dir.path());
        assert_eq!(list_sheets(&path).unwrap(), vec!["Marca A", "Marca B"]);
    }

    #[test]
    fn test_load_sheet_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(dir.path());
        let table = load_sheet(&path, "Marca A").unwrap();
        assert_eq!(table.column_names(), vec!["Gerente", "Data", "Peso", "Faturamento"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 0).to_text(), "15843");
        assert_eq!(table.cell(2, 0), &RawValue::Number(100.0));
        assert_eq!(table.cell(3, 0), &RawValue::Text("1.000,00".into()));
    }

    #[test]
    fn test_unknown_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(dir.path());
        let err = load_sheet(&path, "Marca Z").unwrap_err();
        assert!(matches!(err, ReportError::UnknownBrand(_)));
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        std::fs::write(
            &path,
            "Gerente,Data,Peso,Faturamento\nALICE,2024-01-10,100,1000\n,,,\nALICE,2024-02-10,50\n",
        )
        .unwrap();
        assert_eq!(list_sheets(&path).unwrap(), vec!["vendas"]);
        let table = load_sheet(&path, "vendas").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(3, 1), &RawValue::Empty);
        assert_eq!(table.cell(1, 0), &RawValue::Text("2024-01-10".into()));
    }

    #[test]
    fn test_select_sheet() {
        let sheets = vec!["A".to_string(), "B".to_string()];
        assert_eq!(select_sheet(&sheets, None).unwrap(), "A");
        assert_eq!(select_sheet(&sheets, Some("B")).unwrap(), "B");
        assert!(matches!(
            select_sheet(&sheets, Some("C")),
            Err(ReportError::UnknownBrand(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(WorkbookKind::for_path(Path::new("dados.txt")).is_err());
        assert_eq!(
            WorkbookKind::for_path(Path::new("DADOS.XLSX")).unwrap(),
            WorkbookKind::Spreadsheet
        );
    }
}
