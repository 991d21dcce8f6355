use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{check_credentials, AuthError, AuthProvider, Session, SessionUser};
use crate::models::UserId;

/// Provider for the offline SQLite backend.
///
/// There is no account database: any non-empty email and password sign in,
/// and the user id is derived from the email so the same address always maps
/// to the same entries.
#[derive(Debug, Clone, Default)]
pub struct LocalAuthProvider;

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self
    }

    fn session_for(email: &str) -> Session {
        let email = email.trim().to_lowercase();
        Session {
            user: SessionUser {
                id: user_id_for(&email),
                email,
            },
            access_token: None,
        }
    }
}

/// sha256(email)[0:16] as a UUID
fn user_id_for(email: &str) -> UserId {
    let hash = Sha256::digest(email.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    UserId::new(Uuid::from_bytes(bytes).to_string())
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        check_credentials(email, password)?;
        Ok(Self::session_for(email))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        check_credentials(email, password)?;
        Ok(Self::session_for(email))
    }

    async fn current_user(&self, session: &Session) -> Result<Option<SessionUser>, AuthError> {
        Ok(Some(session.user.clone()))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_email_same_user() {
        let provider = LocalAuthProvider::new();

        let first = provider.sign_in("lifter@example.com", "pw").await.unwrap();
        let second = provider.sign_up(" Lifter@Example.com ", "other").await.unwrap();

        assert_eq!(first.user.id, second.user.id);
        assert_eq!(second.user.email, "lifter@example.com");
        assert!(first.access_token.is_none());
    }

    #[tokio::test]
    async fn test_different_emails_different_users() {
        let provider = LocalAuthProvider::new();

        let a = provider.sign_in("a@example.com", "pw").await.unwrap();
        let b = provider.sign_in("b@example.com", "pw").await.unwrap();

        assert_ne!(a.user.id, b.user.id);
        assert!(Uuid::parse_str(a.user.id.as_str()).is_ok());
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected() {
        let provider = LocalAuthProvider::new();
        let result = provider.sign_in("a@example.com", "").await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }
}
