use std::path::PathBuf;

use crate::auth::CredentialStore;
use crate::error::Result;
use crate::loader;
use crate::session::current_session;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();

    match current_session() {
        Some(s) => println!(
            "User:        {} (since {})",
            s.principal,
            s.logged_in_at.format("%Y-%m-%d %H:%M")
        ),
        None => println!("User:        (not logged in)"),
    }

    match CredentialStore::load(&PathBuf::from(&settings.credentials_file)) {
        Ok(store) => println!("Credentials: {} ({} users)", settings.credentials_file, store.len()),
        Err(_) => println!("Credentials: {} (unreadable)", settings.credentials_file),
    }

    if settings.workbook.is_empty() {
        println!();
        println!("No workbook configured. Run `marca init --workbook <path>` to set up.");
        return Ok(());
    }
    println!("Workbook:    {}", settings.workbook);
    let brands = loader::list_sheets(&PathBuf::from(&settings.workbook))?;
    println!("Brands:      {}", brands.join(", "));
    Ok(())
}
