use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::catalog::{ApiVersion, Environment};
use super::platform;

pub const SESSION_FILE_NAME: &str = "session.toml";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode session: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// What the UI restores on the next start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub environment: Environment,
    pub api_version: ApiVersion,
    pub station_callsign: Option<String>,
}

impl SessionState {
    pub fn default_path() -> PathBuf {
        platform::data_dir().join(SESSION_FILE_NAME)
    }

    /// Missing or unreadable sessions fall back to the default.
    pub fn load(path: &Path) -> Self {
        Self::load_or(path, Self::default())
    }

    /// Like [`SessionState::load`] with a caller-chosen fallback.
    pub fn load_or(path: &Path, fallback: Self) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("no session at {}: {}", path.display(), e);
                return fallback;
            }
        };
        match toml::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!("ignoring corrupt session {}: {}", path.display(), e);
                fallback
            }
        }
    }

    pub async fn save(&self, path: &Path) -> Result<(), SessionError> {
        let io_err = |source: std::io::Error| SessionError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let body = toml::to_string_pretty(self)?;
        tokio::fs::write(path, body).await.map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SESSION_FILE_NAME);
        let state = SessionState {
            environment: Environment::Production,
            api_version: ApiVersion::V2,
            station_callsign: Some("KQED".to_string()),
        };
        state.save(&path).await.unwrap();
        assert_eq!(SessionState::load(&path), state);
    }

    #[test]
    fn test_missing_and_corrupt_give_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        assert_eq!(SessionState::load(&path), SessionState::default());

        std::fs::write(&path, "environment = [not toml").unwrap();
        assert_eq!(SessionState::load(&path), SessionState::default());

        let fallback = SessionState {
            environment: Environment::Development,
            ..Default::default()
        };
        assert_eq!(SessionState::load_or(&path, fallback.clone()), fallback);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        std::fs::write(&path, "api_version = \"v2\"\n").unwrap();
        let state = SessionState::load(&path);
        assert_eq!(state.api_version, ApiVersion::V2);
        assert_eq!(state.environment, Environment::default());
        assert!(state.station_callsign.is_none());
    }
}
