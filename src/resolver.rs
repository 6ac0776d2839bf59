use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::models::{Field, RawTable};

/// Exact header that takes precedence over keyword search for the manager field.
const CANONICAL_MANAGER_COLUMN: &str = "Gerente";

// ---------------------------------------------------------------------------
// Column strategies
// ---------------------------------------------------------------------------

/// Keywords per logical field, in priority order. Matching is a
/// case-insensitive substring test against the raw header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordGroups {
    pub manager: Vec<String>,
    pub representative: Vec<String>,
    pub period: Vec<String>,
    pub weight: Vec<String>,
    pub revenue: Vec<String>,
    pub supervisor: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordGroups {
    fn default() -> Self {
        Self {
            manager: words(&["gerente", "ger/"]),
            representative: words(&["represent", "representa", "represen"]),
            period: words(&["periodo", "data", "mês"]),
            weight: words(&["peso"]),
            revenue: words(&["fatur", "faturamento", "receita"]),
            supervisor: words(&["supervisor", "sup"]),
        }
    }
}

impl KeywordGroups {
    pub fn for_field(&self, field: Field) -> &[String] {
        match field {
            Field::Manager => &self.manager,
            Field::Representative => &self.representative,
            Field::Period => &self.period,
            Field::Weight => &self.weight,
            Field::Revenue => &self.revenue,
            Field::Supervisor => &self.supervisor,
        }
    }
}

/// Fixed column indices, for sheet variants with a known layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionalLayout {
    pub manager: usize,
    #[serde(default)]
    pub representative: Option<usize>,
    pub period: usize,
    pub weight: usize,
    pub revenue: usize,
    #[serde(default)]
    pub supervisor: Option<usize>,
}

impl PositionalLayout {
    fn index(&self, field: Field) -> Option<usize> {
        match field {
            Field::Manager => Some(self.manager),
            Field::Representative => self.representative,
            Field::Period => Some(self.period),
            Field::Weight => Some(self.weight),
            Field::Revenue => Some(self.revenue),
            Field::Supervisor => self.supervisor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ColumnStrategy {
    Keywords(KeywordGroups),
    Positional(PositionalLayout),
}

impl Default for ColumnStrategy {
    fn default() -> Self {
        Self::Keywords(KeywordGroups::default())
    }
}

impl ColumnStrategy {
    /// Map the table's headers onto the canonical schema.
    pub fn resolve(&self, table: &RawTable, strict: bool) -> Result<ResolvedSchema> {
        let names = table.column_names();
        let mapping = match self {
            Self::Keywords(groups) => resolve_keywords(&names, groups, strict)?,
            Self::Positional(layout) => resolve_positional(&names, layout),
        };
        for field in Field::ALL {
            if let Some(column) = mapping.name(field) {
                tracing::debug!(field = %field, column, "resolved column");
            }
        }
        mapping.require()
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Field → raw column, with unresolved fields simply absent.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    columns: Vec<String>,
    resolved: BTreeMap<Field, usize>,
}

impl ColumnMapping {
    pub fn index(&self, field: Field) -> Option<usize> {
        self.resolved.get(&field).copied()
    }

    pub fn name(&self, field: Field) -> Option<&str> {
        self.index(field).map(|i| self.columns[i].as_str())
    }

    /// Fail with a schema error unless every required field resolved.
    pub fn require(&self) -> Result<ResolvedSchema> {
        let missing: Vec<String> = Field::ALL
            .iter()
            .filter(|f| f.is_required() && self.index(**f).is_none())
            .map(|f| f.key().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ReportError::Schema {
                missing,
                available: self.columns.clone(),
            });
        }
        let required = |f: Field| self.index(f).unwrap_or_default();
        Ok(ResolvedSchema {
            manager: required(Field::Manager),
            representative: self.index(Field::Representative),
            period: required(Field::Period),
            weight: required(Field::Weight),
            revenue: required(Field::Revenue),
            supervisor: self.index(Field::Supervisor),
        })
    }
}

/// Column indices for the canonical schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSchema {
    pub manager: usize,
    pub representative: Option<usize>,
    pub period: usize,
    pub weight: usize,
    pub revenue: usize,
    pub supervisor: Option<usize>,
}

fn header_matches(header: &str, keywords: &[String]) -> bool {
    let header = header.to_lowercase();
    keywords.iter().any(|k| header.contains(&k.to_lowercase()))
}

/// Resolve fields in declaration order; a column claimed by one field is not
/// offered to the next. First match wins unless `strict`, in which case a
/// second unclaimed match is an error.
pub fn resolve_keywords(names: &[String], groups: &KeywordGroups, strict: bool) -> Result<ColumnMapping> {
    let mut resolved = BTreeMap::new();
    let mut claimed = vec![false; names.len()];

    if let Some(i) = names.iter().position(|n| n == CANONICAL_MANAGER_COLUMN) {
        resolved.insert(Field::Manager, i);
        claimed[i] = true;
    }

    for field in Field::ALL {
        if resolved.contains_key(&field) {
            continue;
        }
        let keywords = groups.for_field(field);
        let candidates: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(i, n)| !claimed[*i] && header_matches(n, keywords))
            .map(|(i, _)| i)
            .collect();

        let Some(&first) = candidates.first() else {
            tracing::debug!(field = %field, "no column matched");
            continue;
        };
        if strict && candidates.len() > 1 {
            return Err(ReportError::AmbiguousColumn {
                field: field.key().to_string(),
                candidates: candidates.iter().map(|i| names[*i].clone()).collect(),
            });
        }
        if candidates.len() > 1 {
            tracing::warn!(
                field = field.key(),
                chosen = %names[first],
                ignored = candidates.len() - 1,
                "several columns matched; using the first"
            );
        }
        resolved.insert(field, first);
        claimed[first] = true;
    }

    Ok(ColumnMapping {
        columns: names.to_vec(),
        resolved,
    })
}

/// Indices past the last column count as unresolved.
pub fn resolve_positional(names: &[String], layout: &PositionalLayout) -> ColumnMapping {
    let resolved = Field::ALL
        .iter()
        .filter_map(|f| layout.index(*f).filter(|i| *i < names.len()).map(|i| (*f, i)))
        .collect();
    ColumnMapping {
        columns: names.to_vec(),
        resolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(list: &[&str]) -> ColumnMapping {
        resolve_keywords(&names(list), &KeywordGroups::default(), false).unwrap()
    }

    #[test]
    fn test_resolves_scenario_headers() {
        let m = resolve(&["Gerente X", "Repr", "Data", "Peso (kg)", "Faturamento R$", "Sup"]);
        assert_eq!(m.name(Field::Manager), Some("Gerente X"));
        assert_eq!(m.name(Field::Period), Some("Data"));
        assert_eq!(m.name(Field::Weight), Some("Peso (kg)"));
        assert_eq!(m.name(Field::Revenue), Some("Faturamento R$"));
        assert_eq!(m.name(Field::Supervisor), Some("Sup"));
        // "Repr" contains none of the representative keywords
        assert_eq!(m.name(Field::Representative), None);
        assert!(m.require().is_ok());
    }

    #[test]
    fn test_any_order_any_casing() {
        let orders: &[&[&str]] = &[
            &["FATURAMENTO", "peso", "GERENTE", "DATA"],
            &["data", "Receita Bruta", "Ger/Regional", "PESO LIQ"],
            &["Peso", "Período Data", "Faturamento", "gerente"],
        ];
        for order in orders {
            let m = resolve(order);
            let schema = m.require().unwrap();
            assert!(m.name(Field::Manager).unwrap().to_lowercase().contains("ger"));
            assert!(m.name(Field::Weight).unwrap().to_lowercase().contains("peso"));
            assert!(order[schema.revenue].to_lowercase().contains("fatur")
                || order[schema.revenue].to_lowercase().contains("receita"));
            assert!(order[schema.period].to_lowercase().contains("data"));
        }
    }

    #[test]
    fn test_missing_revenue_is_schema_error() {
        let m = resolve(&["Gerente", "Data", "Peso"]);
        let err = m.require().unwrap_err();
        match err {
            ReportError::Schema { missing, available } => {
                assert_eq!(missing, vec!["revenue".to_string()]);
                assert_eq!(available, names(&["Gerente", "Data", "Peso"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let m = resolve(&["Gerente", "Data Emissao", "Data Entrega", "Peso", "Faturamento"]);
        assert_eq!(m.name(Field::Period), Some("Data Emissao"));
    }

    #[test]
    fn test_strict_rejects_ambiguous_columns() {
        let cols = names(&["Gerente", "Data Emissao", "Data Entrega", "Peso", "Faturamento"]);
        let err = resolve_keywords(&cols, &KeywordGroups::default(), true).unwrap_err();
        match err {
            ReportError::AmbiguousColumn { field, candidates } => {
                assert_eq!(field, "period");
                assert_eq!(candidates, names(&["Data Emissao", "Data Entrega"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exact_gerente_preferred() {
        let m = resolve(&["Ger/Antigo", "Gerente", "Data", "Peso", "Faturamento"]);
        assert_eq!(m.name(Field::Manager), Some("Gerente"));
    }

    #[test]
    fn test_claimed_column_not_reused() {
        // "Supervisor" would also satisfy a custom manager keyword; it must
        // only be claimed once.
        let mut groups = KeywordGroups::default();
        groups.manager = vec!["super".into()];
        let m = resolve_keywords(
            &names(&["Supervisor", "Data", "Peso", "Faturamento"]),
            &groups,
            false,
        )
        .unwrap();
        assert_eq!(m.name(Field::Manager), Some("Supervisor"));
        assert_eq!(m.name(Field::Supervisor), None);
    }

    #[test]
    fn test_positional_layout() {
        let layout = PositionalLayout {
            manager: 0,
            representative: Some(1),
            period: 2,
            weight: 3,
            revenue: 4,
            supervisor: Some(9),
        };
        let m = resolve_positional(&names(&["a", "b", "c", "d", "e"]), &layout);
        let schema = m.require().unwrap();
        assert_eq!(schema.revenue, 4);
        assert_eq!(schema.representative, Some(1));
        assert_eq!(schema.supervisor, None);
    }

    #[test]
    fn test_positional_out_of_range_required_field() {
        let layout = PositionalLayout {
            manager: 0,
            representative: None,
            period: 1,
            weight: 2,
            revenue: 7,
            supervisor: None,
        };
        let err = resolve_positional(&names(&["a", "b", "c"]), &layout)
            .require()
            .unwrap_err();
        assert!(err.to_string().contains("revenue"), "got: {err}");
    }

    #[test]
    fn test_strategy_deserializes_from_settings_json() {
        let json = r#"{"strategy": "positional", "manager": 0, "period": 1, "weight": 2, "revenue": 3}"#;
        let s: ColumnStrategy = serde_json::from_str(json).unwrap();
        assert!(matches!(s, ColumnStrategy::Positional(ref l) if l.revenue == 3));

        let json = r#"{"strategy": "keywords", "weight": ["kilos"]}"#;
        let s: ColumnStrategy = serde_json::from_str(json).unwrap();
        match s {
            ColumnStrategy::Keywords(g) => {
                assert_eq!(g.weight, vec!["kilos".to_string()]);
                assert_eq!(g.manager, KeywordGroups::default().manager);
            }
            _ => panic!("expected keywords"),
        }
    }
}
