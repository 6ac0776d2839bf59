use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{CanonicalRecord, RawTable, RawValue};
use crate::resolver::ResolvedSchema;

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

/// Serial of 9999-12-31, the last day Excel can represent.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    if serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::try_days(serial.trunc() as i64)?)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

fn month_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{4})$|^(\d{4})-(\d{1,2})$").expect("valid regex"))
}

/// Parse a textual period. Unrecognized text yields `None`.
pub fn parse_period(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    let caps = month_year_re().captures(raw)?;
    let (month, year) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
        (Some(m), Some(y), _, _) => (m.as_str(), y.as_str()),
        (_, _, Some(y), Some(m)) => (m.as_str(), y.as_str()),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Parse a weight or money amount written as text, e.g. `R$ 1.234,56`,
/// `1,234.56 kg` or `(50,00)`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();
    let s: String = lowered
        .replace("r$", "")
        .replace("kg", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != '"')
        .collect();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return parse_number(inner).map(|v| -v);
    }

    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');
    let normalized = match (last_dot, last_comma) {
        // Both present: whichever comes last is the decimal separator.
        (Some(d), Some(c)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) if s.matches(',').count() == 1 => s.replace(',', "."),
        (None, Some(_)) => s.replace(',', ""),
        (Some(_), None) if s.matches('.').count() > 1 => s.replace('.', ""),
        _ => s,
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn cell_text(value: &RawValue) -> Option<String> {
    let text = value.to_text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn cell_period(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Date(d) => Some(*d),
        RawValue::Number(n) => excel_serial_to_date(*n),
        RawValue::Text(s) => parse_period(s),
        RawValue::Empty => None,
    }
}

fn cell_number(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Text(s) => parse_number(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Convert every row of the sheet into the canonical shape.
pub fn normalize(table: &RawTable, schema: &ResolvedSchema) -> Vec<CanonicalRecord> {
    let optional_text = |col: Option<usize>, row: usize| col.and_then(|c| cell_text(table.cell(c, row)));

    let records: Vec<CanonicalRecord> = (0..table.row_count())
        .map(|row| CanonicalRecord {
            manager: table.cell(schema.manager, row).to_text().trim().to_string(),
            representative: optional_text(schema.representative, row),
            period: cell_period(table.cell(schema.period, row)),
            weight: cell_number(table.cell(schema.weight, row)),
            revenue: cell_number(table.cell(schema.revenue, row)),
            supervisor: optional_text(schema.supervisor, row),
        })
        .collect();

    let unparsed = records.iter().filter(|r| r.period.is_none()).count();
    if unparsed > 0 {
        tracing::debug!(unparsed, total = records.len(), "rows without a usable period");
    }
    records
}
