//! Platform-specific state directory management

use crate::session::FileTokenStorage;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::warn;

/// Environment variable overriding the state directory
pub const STATE_DIR_ENV: &str = "EVA_STATE_DIR";

/// Resolves where the client keeps its config, token and logs
#[derive(Debug, Clone)]
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    /// Resolve from `EVA_STATE_DIR`, falling back to the platform directories
    pub fn new() -> Self {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            return Self::with_override(dir);
        }

        let project_dirs = ProjectDirs::from("org", "Eva", "eva");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Use `path` for everything
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Directory holding the optional config file
    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        match &self.project_dirs {
            Some(project_dirs) => project_dirs.config_dir().to_path_buf(),
            None => PathBuf::from("./config"),
        }
    }

    /// Directory holding the persisted token and log files
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        match &self.project_dirs {
            Some(project_dirs) => project_dirs.data_dir().to_path_buf(),
            None => PathBuf::from("./data"),
        }
    }

    /// Default config file location
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("eva.toml")
    }

    /// Log file for a named component
    pub fn log_path(&self, component: &str) -> PathBuf {
        self.data_dir().join(format!("{component}.log"))
    }

    /// File-backed storage for the session token
    pub fn token_storage(&self) -> FileTokenStorage {
        FileTokenStorage::in_dir(self.data_dir())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}
