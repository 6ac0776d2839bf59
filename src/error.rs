use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Required column(s) not found: {} (columns detected: {})", .missing.join(", "), .available.join(", "))]
    Schema {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Column for '{field}' is ambiguous: {}", .candidates.join(", "))]
    AmbiguousColumn {
        field: String,
        candidates: Vec<String>,
    },

    #[error("Incorrect user or password.")]
    Auth,

    #[error("Not logged in. Run `marca login` first.")]
    NotLoggedIn,

    #[error("No data: {0}")]
    EmptyResult(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Unknown brand: {0}")]
    UnknownBrand(String),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
