use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single cell as read from a sheet, before any column semantics are known.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawValue {
    /// Render the cell as text. Integral numbers drop the fractional part so
    /// numeric ids read the same as their text form.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<RawValue>,
}

/// One sheet as an ordered list of (name, column) pairs.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, column: usize, row: usize) -> &RawValue {
        self.columns
            .get(column)
            .and_then(|c| c.values.get(row))
            .unwrap_or(&RawValue::Empty)
    }

    /// Build a table from a header row and data rows. Short rows are padded with `Empty`.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<RawValue>>) -> Self {
        let mut columns: Vec<RawColumn> = header
            .into_iter()
            .map(|name| RawColumn { name, values: Vec::with_capacity(rows.len()) })
            .collect();
        for row in rows {
            for (i, col) in columns.iter_mut().enumerate() {
                col.values.push(row.get(i).cloned().unwrap_or(RawValue::Empty));
            }
        }
        Self { columns }
    }
}

/// The logical fields every sheet variant is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Manager,
    Representative,
    Period,
    Weight,
    Revenue,
    Supervisor,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Manager,
        Field::Representative,
        Field::Period,
        Field::Weight,
        Field::Revenue,
        Field::Supervisor,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Representative => "representative",
            Self::Period => "period",
            Self::Weight => "weight",
            Self::Revenue => "revenue",
            Self::Supervisor => "supervisor",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Manager | Self::Period | Self::Weight | Self::Revenue)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub manager: String,
    pub representative: Option<String>,
    pub period: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub revenue: Option<f64>,
    pub supervisor: Option<String>,
}

impl CanonicalRecord {
    pub fn month_key(&self) -> Option<MonthKey> {
        self.period.map(MonthKey::from_date)
    }
}

/// Aggregation bucket: first day of the month plus its display label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub ord: NaiveDate,
    pub label: String,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        let ord = date.with_day(1).unwrap_or(date);
        Self {
            ord,
            label: ord.format("%b/%Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    #[serde(rename = "month")]
    pub month_label: String,
    #[serde(skip)]
    pub month_ord: NaiveDate,
    pub weight_total: f64,
    pub revenue_total: f64,
}

/// Authenticated manager identity. Always stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_string())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_truncates_to_first_of_month() {
        let a = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        let b = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(a, b);
        assert_eq!(a.label, "Mar/2024");
        assert_eq!(a.ord, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(RawValue::Number(15843.0).to_text(), "15843");
        assert_eq!(RawValue::Number(2.5).to_text(), "2.5");
        assert_eq!(RawValue::Empty.to_text(), "");
    }

    #[test]
    fn from_rows_pads_short_rows() {
        let table = RawTable::from_rows(
            vec!["A".into(), "B".into()],
            vec![vec![RawValue::Number(1.0)], vec![RawValue::Number(2.0), RawValue::Text("x".into())]],
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 0), &RawValue::Empty);
        assert_eq!(table.cell(1, 1), &RawValue::Text("x".into()));
        assert_eq!(table.cell(5, 5), &RawValue::Empty);
    }

    #[test]
    fn field_displays_as_its_key() {
        assert_eq!(Field::Revenue.to_string(), "revenue");
        assert_eq!(format!("{}", Field::Manager), Field::Manager.key());
    }

    #[test]
    fn principal_is_trimmed() {
        assert_eq!(Principal::new("  ALICE ").id(), "ALICE");
    }
}
