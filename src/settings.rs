use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::resolver::ColumnStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub workbook: String,
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub strict_columns: bool,
    #[serde(default)]
    pub columns: ColumnStrategy,
}

fn default_credentials_file() -> String {
    config_dir().join("credentials.json").to_string_lossy().to_string()
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workbook: String::new(),
            credentials_file: default_credentials_file(),
            currency_symbol: default_currency_symbol(),
            strict_columns: false,
            columns: ColumnStrategy::default(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("marca")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReportError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Configured workbook path, or a settings error telling the user to run `init`.
pub fn workbook_path(settings: &Settings) -> Result<PathBuf> {
    if settings.workbook.is_empty() {
        return Err(ReportError::Settings(
            "No workbook configured. Run `marca init --workbook <path>` first.".into(),
        ));
    }
    Ok(PathBuf::from(&settings.workbook))
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"workbook": "/tmp/dados.xlsx"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.workbook, "/tmp/dados.xlsx");
        assert_eq!(s.currency_symbol, "R$");
        assert!(!s.strict_columns);
        assert_eq!(s.columns, ColumnStrategy::default());
        assert!(s.credentials_file.ends_with("credentials.json"));
    }

    #[test]
    fn test_roundtrip_positional_columns() {
        let json = r#"{
            "workbook": "x.xlsx",
            "columns": {"strategy": "positional", "manager": 2, "period": 0, "weight": 5, "revenue": 6}
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        let back: Settings = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back.columns, s.columns);
        assert!(matches!(back.columns, ColumnStrategy::Positional(_)));
    }

    #[test]
    fn test_workbook_path_requires_init() {
        let s = Settings::default();
        let err = workbook_path(&s).unwrap_err();
        assert!(err.to_string().contains("marca init"));
    }

    #[test]
    fn test_shellexpand_keeps_plain_paths() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("missing.xlsx");
        let expanded = shellexpand_path(&p.to_string_lossy());
        assert!(expanded.ends_with("missing.xlsx"));
    }
}
