use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("All fields are required for authentication")]
    MissingCredentials,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Local check only, nothing is verified against anything
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(())
    }
}

/// Process-wide "is authenticated" flag consulted by gated views.
pub trait AuthStore: std::fmt::Debug {
    fn is_authenticated(&self) -> bool;
    fn set_authenticated(&mut self, authenticated: bool) -> Result<()>;
    fn set_remember_me(&mut self, remember_me: bool) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub remember_me: bool,
}

/// Session flag persisted as a small JSON file next to the config
#[derive(Debug)]
pub struct FileAuthStore {
    path: PathBuf,
    record: SessionRecord,
}

impl FileAuthStore {
    /// Open the session file. A missing or unreadable file means signed out.
    pub fn open(path: &Path) -> Self {
        let record = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed session file {}: {}", path.display(), e);
                SessionRecord::default()
            }),
            Err(_) => SessionRecord::default(),
        };

        Self {
            path: path.to_path_buf(),
            record,
        }
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Write `record` to disk and only then adopt it, so a failed write
    /// leaves the in-memory flag matching the file.
    fn commit(&mut self, record: SessionRecord) -> Result<()> {
        Self::save(&self.path, &record)?;
        self.record = record;
        Ok(())
    }

    fn save(path: &Path, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(record).context("Failed to serialize session")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write session file: {}", path.display()))?;
        Ok(())
    }
}

impl AuthStore for FileAuthStore {
    fn is_authenticated(&self) -> bool {
        self.record.authenticated
    }

    fn set_authenticated(&mut self, authenticated: bool) -> Result<()> {
        let record = SessionRecord {
            authenticated,
            ..self.record.clone()
        };
        self.commit(record)
    }

    fn set_remember_me(&mut self, remember_me: bool) -> Result<()> {
        let record = SessionRecord {
            remember_me,
            ..self.record.clone()
        };
        self.commit(record)
    }
}

#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    pub record: SessionRecord,
}

impl AuthStore for MemoryAuthStore {
    fn is_authenticated(&self) -> bool {
        self.record.authenticated
    }

    fn set_authenticated(&mut self, authenticated: bool) -> Result<()> {
        self.record.authenticated = authenticated;
        Ok(())
    }

    fn set_remember_me(&mut self, remember_me: bool) -> Result<()> {
        self.record.remember_me = remember_me;
        Ok(())
    }
}

/// Session store whose writes always fail, holding whatever flag it started with
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ReadOnlyAuthStore {
    pub authenticated: bool,
}

#[cfg(test)]
impl AuthStore for ReadOnlyAuthStore {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn set_authenticated(&mut self, _authenticated: bool) -> Result<()> {
        anyhow::bail!("session store is read-only")
    }

    fn set_remember_me(&mut self, _remember_me: bool) -> Result<()> {
        anyhow::bail!("session store is read-only")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_requires_both_fields() {
        let empty = Credentials::default();
        assert_eq!(empty.validate(), Err(AuthError::MissingCredentials));

        let no_password = Credentials {
            username: "ghost".to_string(),
            password: String::new(),
        };
        assert_eq!(no_password.validate(), Err(AuthError::MissingCredentials));

        let ok = Credentials {
            username: "ghost".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_signed_out() {
        let temp_dir = tempdir().unwrap();
        let store = FileAuthStore::open(&temp_dir.path().join("session.json"));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_flag_persists_across_opens() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("nested").join("session.json");

        let mut store = FileAuthStore::open(&path);
        store.set_authenticated(true)?;
        store.set_remember_me(true)?;

        let reopened = FileAuthStore::open(&path);
        assert!(reopened.is_authenticated());
        assert!(reopened.record().remember_me);

        let mut reopened = reopened;
        reopened.set_authenticated(false)?;
        assert!(!FileAuthStore::open(&path).is_authenticated());

        Ok(())
    }

    #[test]
    fn test_failed_write_keeps_flag_unchanged() -> Result<()> {
        let temp_dir = tempdir()?;
        // a regular file where the session directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "")?;

        let mut store = FileAuthStore::open(&blocker.join("session.json"));
        assert!(store.set_authenticated(true).is_err());
        assert!(!store.is_authenticated());
        assert!(store.set_remember_me(true).is_err());
        assert!(!store.record().remember_me);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_signed_out() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "not json")?;

        assert!(!FileAuthStore::open(&path).is_authenticated());
        Ok(())
    }
}
