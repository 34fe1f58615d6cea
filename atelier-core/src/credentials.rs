//! Local credential store for the CLI
//!
//! A single JSON file (`credentials.json` in the atelier home) holds the
//! bearer token and a cached copy of the user it belongs to. Login writes the
//! file, logout removes it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::atelier_home;
use crate::error::{AtelierError, Result};
use crate::models::UserProfile;

pub const CREDENTIALS_FILE: &str = "credentials.json";

/// User details cached at login for offline display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedUser {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl CachedUser {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

impl From<&UserProfile> for CachedUser {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: Some(user.email.clone()),
            display_name: user.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub token: String,
    pub user: Option<CachedUser>,
    pub saved_at: DateTime<Utc>,
}

impl StoredCredentials {
    pub fn new(token: impl Into<String>, user: Option<CachedUser>) -> Self {
        Self {
            token: token.into(),
            user,
            saved_at: Utc::now(),
        }
    }
}

/// File-backed credential store
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$ATELIER_HOME/credentials.json` (default `~/.atelier`)
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(atelier_home()?.join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credentials. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<StoredCredentials>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let creds: StoredCredentials = serde_json::from_str(&content)
            .map_err(|e| AtelierError::invalid_credentials(&self.path, e.to_string()))?;

        Ok(Some(creds))
    }

    /// True when a readable credential file with a non-empty token exists.
    pub fn is_authenticated(&self) -> bool {
        match self.load() {
            Ok(Some(creds)) => !creds.token.trim().is_empty(),
            Ok(None) => false,
            Err(e) => {
                debug!("Treating unreadable credentials as logged out: {}", e);
                false
            }
        }
    }

    pub fn get_token(&self) -> Result<Option<String>> {
        Ok(self
            .load()?
            .map(|creds| creds.token)
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn get_user(&self) -> Result<Option<CachedUser>> {
        Ok(self.load()?.and_then(|creds| creds.user))
    }

    /// Write credentials, creating the parent directory if needed.
    pub fn save(&self, creds: &StoredCredentials) -> Result<()> {
        if creds.token.trim().is_empty() {
            return Err(AtelierError::invalid_credentials(&self.path, "empty token"));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(creds)
            .map_err(|e| AtelierError::json("credentials", e))?;

        let mut file = open_private(&self.path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;

        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    /// Remove the stored token. Succeeds when nothing is stored.
    pub fn clear_token(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on create; tighten files left by older versions
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("nested").join(CREDENTIALS_FILE))
    }

    fn ada() -> CachedUser {
        CachedUser {
            id: "user_1".into(),
            username: "ada".into(),
            email: Some("ada@example.com".into()),
            display_name: None,
        }
    }

    #[test]
    fn missing_file_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(!store.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.get_user().unwrap(), None);
    }

    #[test]
    fn save_then_clear() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&StoredCredentials::new("tok_123", Some(ada())))
            .unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.get_token().unwrap().as_deref(), Some("tok_123"));
        assert_eq!(store.get_user().unwrap().unwrap().username, "ada");

        store.clear_token().unwrap();
        assert!(!store.is_authenticated());
        assert!(!store.path().exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.clear_token().unwrap();
        store.clear_token().unwrap();
    }

    #[test]
    fn rejects_empty_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.save(&StoredCredentials::new("  ", None)).unwrap_err();
        assert!(matches!(err, AtelierError::InvalidCredentials { .. }));
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_is_not_authenticated() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert!(!store.is_authenticated());
        assert!(matches!(
            store.load(),
            Err(AtelierError::InvalidCredentials { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn credentials_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&StoredCredentials::new("tok", None)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
