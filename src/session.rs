use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::models::Principal;
use crate::settings::config_dir;

/// Logged-in identity kept between invocations. Only the principal is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub principal: Principal,
    pub logged_in_at: DateTime<Local>,
}

fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

pub fn read_session_at(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn write_session_at(path: &Path, principal: &Principal) -> Result<Session> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let session = Session {
        principal: principal.clone(),
        logged_in_at: Local::now(),
    };
    std::fs::write(path, format!("{}\n", serde_json::to_string_pretty(&session)?))?;
    Ok(session)
}

/// Returns whether a session existed.
pub fn clear_session_at(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn current_session() -> Option<Session> {
    read_session_at(&session_path())
}

pub fn start_session(principal: &Principal) -> Result<Session> {
    write_session_at(&session_path(), principal)
}

pub fn end_session() -> Result<bool> {
    clear_session_at(&session_path())
}

/// The logged-in principal, or `NotLoggedIn`.
pub fn require_principal() -> Result<Principal> {
    current_session()
        .map(|s| s.principal)
        .ok_or(ReportError::NotLoggedIn)
}
