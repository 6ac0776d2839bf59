use std::io::{BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use zeroize::Zeroize;

use crate::auth::CredentialStore;
use crate::error::{ReportError, Result};
use crate::session;
use crate::settings::load_settings;

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn read_secret(from_stdin: bool) -> Result<String> {
    if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        let secret = line.trim_end_matches(['\r', '\n']).to_string();
        line.zeroize();
        Ok(secret)
    } else {
        Ok(rpassword::prompt_password("Password: ")?)
    }
}

pub fn login(user: Option<&str>, password_stdin: bool) -> Result<()> {
    let settings = load_settings();
    let store = CredentialStore::load(&PathBuf::from(&settings.credentials_file))?;

    let id = match user {
        Some(u) => u.to_string(),
        None if password_stdin => {
            return Err(ReportError::Other(
                "--password-stdin requires the user id as an argument".into(),
            ))
        }
        None => prompt("User: ")?,
    };
    let mut secret = read_secret(password_stdin)?;
    let result = store.authenticate(&id, &secret);
    secret.zeroize();

    let principal = result?;
    session::start_session(&principal)?;
    println!("{}", format!("Welcome, {principal}!").green());
    Ok(())
}

pub fn logout() -> Result<()> {
    if session::end_session()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
