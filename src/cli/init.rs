use std::path::PathBuf;

use crate::error::{ReportError, Result};
use crate::loader;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(workbook: &str, credentials: Option<&str>, currency: Option<&str>) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(workbook));
    if !resolved.exists() {
        return Err(ReportError::Settings(format!(
            "No workbook found at {}",
            resolved.display()
        )));
    }
    let brands = loader::list_sheets(&resolved)?;

    let mut settings = load_settings();
    settings.workbook = resolved.to_string_lossy().to_string();
    if let Some(path) = credentials {
        settings.credentials_file = shellexpand_path(path);
    }
    if let Some(symbol) = currency {
        settings.currency_symbol = symbol.to_string();
    }
    save_settings(&settings)?;

    println!("Workbook:    {}", resolved.display());
    println!("Brands:      {}", brands.join(", "));
    println!("Credentials: {}", settings.credentials_file);
    Ok(())
}
