use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ReportError, Result};
use crate::models::{CanonicalRecord, MonthKey, MonthlyTotal, Principal, RawTable};
use crate::normalize::normalize;
use crate::resolver::ColumnStrategy;

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// Equality constraint on one attribute; `All` is the "no filter" choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    EqualTo(String),
}

impl Filter {
    pub fn from_option(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::All,
            Some(v) => Self::EqualTo(v.to_string()),
        }
    }
}

/// Attributes that can be filtered, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeField {
    Supervisor,
    Representative,
}

impl AttributeField {
    pub const ORDER: [AttributeField; 2] = [AttributeField::Supervisor, AttributeField::Representative];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Supervisor => "supervisor",
            Self::Representative => "representative",
        }
    }

    fn value<'r>(&self, record: &'r CanonicalRecord) -> Option<&'r str> {
        match self {
            Self::Supervisor => record.supervisor.as_deref(),
            Self::Representative => record.representative.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelections {
    pub supervisor: Filter,
    pub representative: Filter,
}

impl FilterSelections {
    fn get(&self, field: AttributeField) -> &Filter {
        match field {
            AttributeField::Supervisor => &self.supervisor,
            AttributeField::Representative => &self.representative,
        }
    }
}

/// Inclusive month range by display label. `None` means the first (or last)
/// available month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

// ---------------------------------------------------------------------------
// Identity filter
// ---------------------------------------------------------------------------

pub fn filter_principal(records: Vec<CanonicalRecord>, principal: &Principal) -> Result<Vec<CanonicalRecord>> {
    let id = principal.id();
    let rows: Vec<CanonicalRecord> = records.into_iter().filter(|r| r.manager == id).collect();
    tracing::debug!(principal = id, rows = rows.len(), "identity filter");
    if rows.is_empty() {
        return Err(ReportError::EmptyResult(format!(
            "no rows found for manager {id}"
        )));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Attribute filter chain
// ---------------------------------------------------------------------------

/// Sorted distinct values of `field` among `records`.
pub fn candidate_values(records: &[CanonicalRecord], field: AttributeField) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| field.value(r))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Apply one constraint. The value must be one of the current candidates.
pub fn apply_filter(
    records: Vec<CanonicalRecord>,
    field: AttributeField,
    filter: &Filter,
) -> Result<Vec<CanonicalRecord>> {
    let Filter::EqualTo(wanted) = filter else {
        return Ok(records);
    };
    let candidates = candidate_values(&records, field);
    if !candidates.iter().any(|c| c == wanted) {
        return Err(ReportError::InvalidSelection(format!(
            "{} '{wanted}' is not available (choices: {})",
            field.label(),
            if candidates.is_empty() { "none".to_string() } else { candidates.join(", ") }
        )));
    }
    Ok(records
        .into_iter()
        .filter(|r| field.value(r) == Some(wanted.as_str()))
        .collect())
}

/// Candidate domain seen at one step of the chain, before its filter applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStep {
    pub field: AttributeField,
    pub candidates: Vec<String>,
}

/// Apply every constraint in `AttributeField::ORDER`, narrowing the candidate
/// domain of each later step.
pub fn apply_filters(
    records: Vec<CanonicalRecord>,
    selections: &FilterSelections,
) -> Result<(Vec<CanonicalRecord>, Vec<FilterStep>)> {
    let mut rows = records;
    let mut steps = Vec::with_capacity(AttributeField::ORDER.len());
    for field in AttributeField::ORDER {
        steps.push(FilterStep {
            field,
            candidates: candidate_values(&rows, field),
        });
        rows = apply_filter(rows, field, selections.get(field))?;
        tracing::debug!(field = field.label(), rows = rows.len(), "attribute filter");
    }
    Ok((rows, steps))
}

// ---------------------------------------------------------------------------
// Month range
// ---------------------------------------------------------------------------

/// Distinct months present, ascending, one entry per label.
pub fn available_months(records: &[CanonicalRecord]) -> Vec<MonthKey> {
    let mut months: Vec<MonthKey> = records
        .iter()
        .filter_map(CanonicalRecord::month_key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut seen = BTreeSet::new();
    months.retain(|m| seen.insert(m.label.clone()));
    months
}

fn find_month(months: &[MonthKey], label: &str, which: &str) -> Result<MonthKey> {
    months.iter().find(|m| m.label == label).cloned().ok_or_else(|| {
        ReportError::InvalidSelection(format!(
            "{which} month '{label}' is not available (choices: {})",
            months.iter().map(|m| m.label.as_str()).collect::<Vec<_>>().join(", ")
        ))
    })
}

pub struct RangeSelection {
    pub rows: Vec<CanonicalRecord>,
    pub months: Vec<MonthKey>,
    pub start: MonthKey,
    pub end: MonthKey,
}

pub fn select_month_range(records: Vec<CanonicalRecord>, range: &MonthRange) -> Result<RangeSelection> {
    let months = available_months(&records);
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Err(ReportError::EmptyResult(
            "no months available for the selected filters".into(),
        ));
    };
    let start = match &range.start {
        Some(label) => find_month(&months, label, "start")?,
        None => first.clone(),
    };
    let end = match &range.end {
        Some(label) => find_month(&months, label, "end")?,
        None => last.clone(),
    };

    let rows: Vec<CanonicalRecord> = records
        .into_iter()
        .filter(|r| {
            r.month_key()
                .is_some_and(|k| k.ord >= start.ord && k.ord <= end.ord)
        })
        .collect();
    if rows.is_empty() {
        return Err(ReportError::EmptyResult(format!(
            "no rows between {} and {}",
            start.label, end.label
        )));
    }
    Ok(RangeSelection { rows, months, start, end })
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn summable(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Sum weight and revenue per month, ascending by month.
pub fn aggregate_monthly(records: &[CanonicalRecord]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<MonthKey, (f64, f64)> = BTreeMap::new();
    for record in records {
        let Some(key) = record.month_key() else { continue };
        let entry = buckets.entry(key).or_default();
        entry.0 += summable(record.weight);
        entry.1 += summable(record.revenue);
    }
    buckets
        .into_iter()
        .map(|(key, (weight, revenue))| MonthlyTotal {
            month_label: key.label,
            month_ord: key.ord,
            weight_total: weight,
            revenue_total: revenue,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// build_report
// ---------------------------------------------------------------------------

pub struct ReportRequest {
    pub principal: Principal,
    pub filters: FilterSelections,
    pub range: MonthRange,
    pub strict_columns: bool,
}

/// Aggregate plus the choices that were available at each step.
#[derive(Debug, Clone)]
pub struct Report {
    pub principal: Principal,
    pub supervisors: Vec<String>,
    pub representatives: Vec<String>,
    pub months: Vec<MonthKey>,
    pub start: MonthKey,
    pub end: MonthKey,
    pub totals: Vec<MonthlyTotal>,
}

impl Report {
    pub fn total_weight(&self) -> f64 {
        self.totals.iter().map(|t| t.weight_total).sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.totals.iter().map(|t| t.revenue_total).sum()
    }
}

/// Run the whole pipeline on one sheet. Pure: the same inputs always give the
/// same report.
pub fn build_report(table: &RawTable, strategy: &ColumnStrategy, request: &ReportRequest) -> Result<Report> {
    let schema = strategy.resolve(table, request.strict_columns)?;
    let records = normalize(table, &schema);
    let mine = filter_principal(records, &request.principal)?;
    let (filtered, steps) = apply_filters(mine, &request.filters)?;
    let selection = select_month_range(filtered, &request.range)?;
    let totals = aggregate_monthly(&selection.rows);
    tracing::info!(
        principal = %request.principal,
        months = totals.len(),
        from = %selection.start.label,
        to = %selection.end.label,
        "report built"
    );

    let domain = |field: AttributeField| {
        steps
            .iter()
            .find(|s| s.field == field)
            .map(|s| s.candidates.clone())
            .unwrap_or_default()
    };
    Ok(Report {
        principal: request.principal.clone(),
        supervisors: domain(AttributeField::Supervisor),
        representatives: domain(AttributeField::Representative),
        months: selection.months,
        start: selection.start,
        end: selection.end,
        totals,
    })
}
