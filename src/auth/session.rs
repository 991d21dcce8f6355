use std::path::{Path, PathBuf};

use super::{AuthError, AuthProvider, Session, SessionUser};

/// Process-wide view of who is signed in.
///
/// Restored once at startup; commands and views read the user from here
/// instead of asking the provider again. Signing out clears both the
/// in-memory session and the file.
#[derive(Debug)]
pub struct SessionContext {
    path: PathBuf,
    session: Option<Session>,
}

impl SessionContext {
    /// Reads the persisted session, if any, without contacting the provider.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let path = path.into();
        let session = read_session(&path)?;
        Ok(Self { path, session })
    }

    /// Loads the persisted session and checks it with the provider once.
    ///
    /// A session the provider no longer recognizes is discarded. If the
    /// provider can't be reached the stored session is kept as is.
    pub async fn restore(
        path: impl Into<PathBuf>,
        provider: &dyn AuthProvider,
    ) -> Result<Self, AuthError> {
        let mut context = Self::load(path)?;

        let verified = match context.session.as_ref() {
            Some(session) => match provider.current_user(session).await {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("could not verify stored session, keeping it: {}", e);
                    None
                }
            },
            None => None,
        };

        match verified {
            Some(Some(user)) => {
                if let Some(session) = context.session.as_mut() {
                    session.user = user;
                }
            }
            Some(None) => {
                tracing::info!("stored session expired, signing out locally");
                context.clear()?;
            }
            None => {}
        }

        Ok(context)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// The signed-in user, or [`AuthError::NotSignedIn`].
    pub fn require_user(&self) -> Result<&SessionUser, AuthError> {
        self.user().ok_or(AuthError::NotSignedIn)
    }

    pub async fn sign_in(
        &mut self,
        provider: &dyn AuthProvider,
        email: &str,
        password: &str,
    ) -> Result<&SessionUser, AuthError> {
        let session = provider.sign_in(email, password).await?;
        self.store(session)
    }

    pub async fn sign_up(
        &mut self,
        provider: &dyn AuthProvider,
        email: &str,
        password: &str,
    ) -> Result<&SessionUser, AuthError> {
        let session = provider.sign_up(email, password).await?;
        self.store(session)
    }

    /// Ends the session. The local session is cleared even if the provider
    /// call fails.
    pub async fn sign_out(&mut self, provider: &dyn AuthProvider) -> Result<(), AuthError> {
        if let Some(session) = self.session.clone() {
            if let Err(e) = provider.sign_out(&session).await {
                tracing::warn!("provider sign-out failed: {}", e);
            }
        }
        self.clear()
    }

    fn store(&mut self, session: Session) -> Result<&SessionUser, AuthError> {
        write_session(&self.path, &session)?;
        tracing::debug!(user = %session.user.id, "session saved");
        Ok(&self.session.insert(session).user)
    }

    fn clear(&mut self) -> Result<(), AuthError> {
        self.session = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::SessionFile(format!(
                "failed to remove '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}

fn read_session(path: &Path) -> Result<Option<Session>, AuthError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AuthError::SessionFile(format!("failed to read '{}': {}", path.display(), e))
    })?;
    let session = serde_yaml::from_str(&contents).map_err(|e| {
        AuthError::SessionFile(format!("failed to parse '{}': {}", path.display(), e))
    })?;
    Ok(Some(session))
}

fn write_session(path: &Path, session: &Session) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AuthError::SessionFile(e.to_string()))?;
    }

    let yaml = serde_yaml::to_string(session).map_err(|e| AuthError::SessionFile(e.to_string()))?;
    std::fs::write(path, yaml).map_err(|e| {
        AuthError::SessionFile(format!("failed to write '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LocalAuthProvider, RestAuthProvider};
    use crate::models::UserId;
    use async_trait::async_trait;
    use tempfile::tempdir;

    /// Provider that has forgotten every session.
    struct ExpiredProvider;

    #[async_trait]
    impl AuthProvider for ExpiredProvider {
        async fn sign_in(&self, _: &str, _: &str) -> Result<Session, AuthError> {
            Err(AuthError::NotSignedIn)
        }

        async fn sign_up(&self, _: &str, _: &str) -> Result<Session, AuthError> {
            Err(AuthError::NotSignedIn)
        }

        async fn current_user(&self, _: &Session) -> Result<Option<SessionUser>, AuthError> {
            Ok(None)
        }

        async fn sign_out(&self, _: &Session) -> Result<(), AuthError> {
            Err(AuthError::HttpError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_load_without_file_is_anonymous() {
        let temp_dir = tempdir().unwrap();
        let context = SessionContext::load(temp_dir.path().join("session.yaml")).unwrap();

        assert!(context.user().is_none());
        assert!(matches!(
            context.require_user(),
            Err(AuthError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_persists_session() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("session.yaml");
        let provider = LocalAuthProvider::new();

        let mut context = SessionContext::load(&path).unwrap();
        let user_id = context
            .sign_in(&provider, "lifter@example.com", "pw")
            .await
            .unwrap()
            .id
            .clone();
        assert!(path.exists());

        let reloaded = SessionContext::restore(&path, &provider).await.unwrap();
        assert_eq!(reloaded.require_user().unwrap().id, user_id);
        assert_eq!(reloaded.require_user().unwrap().email, "lifter@example.com");
    }

    #[tokio::test]
    async fn test_sign_out_clears_file_even_if_provider_fails() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("session.yaml");

        let mut context = SessionContext::load(&path).unwrap();
        context
            .sign_in(&LocalAuthProvider::new(), "lifter@example.com", "pw")
            .await
            .unwrap();

        context.sign_out(&ExpiredProvider).await.unwrap();
        assert!(context.user().is_none());
        assert!(!path.exists());

        // signing out twice is harmless
        context.sign_out(&ExpiredProvider).await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_drops_expired_session() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("session.yaml");
        let session = Session {
            user: SessionUser {
                id: UserId::new("u1"),
                email: "old@example.com".to_string(),
            },
            access_token: Some("stale".to_string()),
        };
        write_session(&path, &session).unwrap();

        let context = SessionContext::restore(&path, &ExpiredProvider).await.unwrap();
        assert!(context.user().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_restore_keeps_session_when_provider_unreachable() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("session.yaml");
        let session = Session {
            user: SessionUser {
                id: UserId::new("u1"),
                email: "lifter@example.com".to_string(),
            },
            access_token: Some("token".to_string()),
        };
        write_session(&path, &session).unwrap();

        // Nothing listens on port 1
        let provider = RestAuthProvider::new("http://127.0.0.1:1", "anon");

        let mut context = SessionContext::restore(&path, &provider).await.unwrap();
        assert_eq!(context.session(), Some(&session));
        assert!(path.exists());

        // Logging out still clears local state
        context.sign_out(&provider).await.unwrap();
        assert!(context.user().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_session_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("session.yaml");
        std::fs::write(&path, "user: [unclosed").unwrap();

        let err = SessionContext::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
