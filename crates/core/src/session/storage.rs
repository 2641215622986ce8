//! Persistence port for the session token

use crate::error::CoreResult;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Key under which the access token is persisted
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Durable storage for a single bearer token
///
/// Absence of a stored token means the user is logged out.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, if any
    fn load(&self) -> CoreResult<Option<String>>;

    /// Persist `token`, replacing any previous value
    fn save(&self, token: &str) -> CoreResult<()>;

    /// Remove the persisted token. Removing an absent token is not an error.
    fn clear(&self) -> CoreResult<()>;
}

/// In-process storage, used by tests and short-lived clients
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that already holds `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> CoreResult<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> CoreResult<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        self.slot().take();
        Ok(())
    }
}

/// Stores the token as a plain file inside a state directory
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Store the token at `dir/access_token`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(ACCESS_TOKEN_KEY),
        }
    }

    /// Path of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> CoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        debug!("Token written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryTokenStorage::new();
        assert_eq!(storage.load().unwrap(), None);

        storage.save("abc").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc"));

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join("nested");

        let storage = FileTokenStorage::in_dir(&state_dir);
        assert_eq!(storage.load().unwrap(), None);

        storage.save("a.b.c").unwrap();
        assert!(storage.path().exists());

        let reopened = FileTokenStorage::in_dir(&state_dir);
        assert_eq!(reopened.load().unwrap().as_deref(), Some("a.b.c"));

        reopened.clear().unwrap();
        assert!(!storage.path().exists());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_file_storage_ignores_blank_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileTokenStorage::in_dir(temp_dir.path());
        fs::write(storage.path(), "  \n").unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_clear_missing_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileTokenStorage::in_dir(temp_dir.path());
        assert!(storage.clear().is_ok());
    }
}
