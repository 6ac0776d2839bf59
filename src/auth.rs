use std::collections::BTreeMap;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{ReportError, Result};
use crate::models::Principal;

const SHA256_PREFIX: &str = "sha256:";

/// Static id → secret mapping. Secrets are stored either in plain text or as
/// `sha256:<hex digest>`.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: BTreeMap<String, String>,
}

pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{SHA256_PREFIX}{}", hex::encode(hasher.finalize()))
}

impl CredentialStore {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Settings(format!(
                "Cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        let users: BTreeMap<String, String> = serde_json::from_str(&content)?;
        tracing::debug!(users = users.len(), "loaded credential store");
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Exact match on both id and secret.
    pub fn authenticate(&self, id: &str, secret: &str) -> Result<Principal> {
        let Some(stored) = self.users.get(id) else {
            tracing::info!(user = id, "login rejected: unknown user");
            return Err(ReportError::Auth);
        };
        let ok = match stored.strip_prefix(SHA256_PREFIX) {
            Some(digest) => hash_secret(secret)[SHA256_PREFIX.len()..].eq_ignore_ascii_case(digest),
            None => stored == secret,
        };
        if !ok {
            tracing::info!(user = id, "login rejected: wrong secret");
            return Err(ReportError::Auth);
        }
        Ok(Principal::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        let mut users = BTreeMap::new();
        users.insert("15843".to_string(), "15843!segredo".to_string());
        users.insert("18182".to_string(), hash_secret("outro!segredo"));
        CredentialStore { users }
    }

    #[test]
    fn test_plain_secret() {
        let p = store().authenticate("15843", "15843!segredo").unwrap();
        assert_eq!(p.id(), "15843");
    }

    #[test]
    fn test_hashed_secret() {
        assert!(store().authenticate("18182", "outro!segredo").is_ok());
        assert!(matches!(
            store().authenticate("18182", "sha256:whatever"),
            Err(ReportError::Auth)
        ));
    }

    #[test]
    fn test_wrong_secret_or_user() {
        assert!(matches!(store().authenticate("15843", "nope"), Err(ReportError::Auth)));
        assert!(matches!(store().authenticate("99999", "15843!segredo"), Err(ReportError::Auth)));
        // ids are matched exactly
        assert!(matches!(store().authenticate(" 15843", "15843!segredo"), Err(ReportError::Auth)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"ALICE": "secret"}"#).unwrap();
        let store = CredentialStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.authenticate("ALICE", "secret").is_ok());
    }

    #[test]
    fn test_missing_file_is_settings_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CredentialStore::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ReportError::Settings(_)));
    }

    #[test]
    fn test_hash_format() {
        let h = hash_secret("abc");
        assert_eq!(
            h,
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
