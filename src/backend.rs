//! Builds the store and auth provider selected by the configuration.

use crate::auth::{AuthProvider, LocalAuthProvider, RestAuthProvider, Session};
use crate::config::{Backend, Config, ConfigError};
use crate::store::{EntryStore, RestEntryStore, SqliteEntryStore, StoreError};

/// Errors that can occur while opening a backend.
#[derive(Debug)]
pub enum BackendError {
    Config(ConfigError),
    Store(StoreError),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Config(e) => write!(f, "{}", e),
            BackendError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<ConfigError> for BackendError {
    fn from(e: ConfigError) -> Self {
        BackendError::Config(e)
    }
}

impl From<StoreError> for BackendError {
    fn from(e: StoreError) -> Self {
        BackendError::Store(e)
    }
}

pub fn auth_provider(config: &Config) -> Result<Box<dyn AuthProvider>, BackendError> {
    match config.backend.value {
        Backend::Local => Ok(Box::new(LocalAuthProvider::new())),
        Backend::Remote => {
            let (url, api_key) = config.remote.require()?;
            Ok(Box::new(RestAuthProvider::new(url, api_key)))
        }
    }
}

/// Opens the entry store. A remote store acts with the session's token when
/// one is given.
pub async fn entry_store(
    config: &Config,
    session: Option<&Session>,
) -> Result<Box<dyn EntryStore>, BackendError> {
    match config.backend.value {
        Backend::Local => {
            let store = SqliteEntryStore::open(&config.database_path.value).await?;
            Ok(Box::new(store))
        }
        Backend::Remote => {
            let (url, api_key) = config.remote.require()?;
            let mut store = RestEntryStore::new(url, api_key);
            if let Some(token) = session.and_then(|s| s.access_token.as_deref()) {
                store = store.with_access_token(token);
            }
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use std::io::Write;
    use tempfile::tempdir;

    fn config_with(lines: &[&str]) -> (tempfile::TempDir, Config) {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        let config = Config::load(Some(config_path)).unwrap();
        (temp_dir, config)
    }

    #[tokio::test]
    async fn test_local_backend_opens_sqlite() {
        let (temp_dir, config) = config_with(&["backend: local", "database_path: data/gym.db"]);

        let store = entry_store(&config, None).await.unwrap();
        let entries = store
            .fetch_by_user(&UserId::new("anyone"), None)
            .await
            .unwrap();
        assert!(entries.is_empty());
        assert!(temp_dir.path().join("data/gym.db").exists());

        assert!(auth_provider(&config).is_ok());
    }

    #[tokio::test]
    async fn test_remote_backend_requires_settings() {
        let (_temp_dir, config) = config_with(&["backend: remote"]);

        assert!(matches!(
            entry_store(&config, None).await,
            Err(BackendError::Config(ConfigError::MissingSetting("remote.url")))
        ));
        assert!(auth_provider(&config).is_err());
    }

    #[tokio::test]
    async fn test_remote_backend_builds_clients() {
        let (_temp_dir, config) = config_with(&[
            "backend: remote",
            "remote:",
            "  url: https://project.example.co",
            "  api_key: anon",
        ]);

        assert!(entry_store(&config, None).await.is_ok());
        assert!(auth_provider(&config).is_ok());
    }
}
