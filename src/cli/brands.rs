use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::loader;
use crate::settings::{load_settings, workbook_path};

pub fn list() -> Result<()> {
    let workbook = workbook_path(&load_settings())?;
    let sheets = loader::list_sheets(&workbook)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Brand"]);
    for (i, name) in sheets.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(name)]);
    }
    println!("Brands\n{table}");
    Ok(())
}
