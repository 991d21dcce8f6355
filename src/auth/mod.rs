//! Authentication against the identity provider.
//!
//! The provider is reached through [`AuthProvider`]. The signed-in user for
//! the running process lives in a single [`SessionContext`], restored from
//! disk once at startup and cleared on sign-out.

mod local;
mod rest;
mod session;

pub use local::LocalAuthProvider;
pub use rest::RestAuthProvider;
pub use session::SessionContext;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
}

/// A signed-in session as persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    /// Bearer token issued by the provider. Local sessions have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Identity provider operations.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// The user behind `session`, or `None` when it is no longer valid.
    async fn current_user(&self, session: &Session) -> Result<Option<SessionUser>, AuthError>;

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}

/// Errors that can occur while authenticating
#[derive(Debug)]
pub enum AuthError {
    /// Email or password left empty
    MissingCredentials,
    /// No signed-in user
    NotSignedIn,
    /// Sign-up succeeded but the address must be confirmed before signing in
    ConfirmationRequired { email: String },
    /// Provider refused the request
    Rejected { status: u16, message: String },
    /// HTTP request error
    HttpError(String),
    /// Reading or writing the session file failed
    SessionFile(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Email and password are required"),
            AuthError::NotSignedIn => {
                write!(f, "Not logged in. Run 'gymlog login' to sign in.")
            }
            AuthError::ConfirmationRequired { email } => write!(
                f,
                "Account created. Confirm the address sent to {} before logging in.",
                email
            ),
            AuthError::Rejected { status, message } => {
                write!(f, "Authentication failed ({}): {}", status, message)
            }
            AuthError::HttpError(e) => write!(f, "HTTP error: {}", e),
            AuthError::SessionFile(e) => write!(f, "Session file error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::HttpError(e.to_string())
    }
}

/// Rejects blank credentials before anything is sent.
pub fn check_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_credentials() {
        assert!(check_credentials("a@example.com", "secret").is_ok());
        assert!(matches!(
            check_credentials("", "secret"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            check_credentials("   ", "secret"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            check_credentials("a@example.com", ""),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_session_yaml_roundtrip_without_token() {
        let session = Session {
            user: SessionUser {
                id: UserId::new("u1"),
                email: "a@example.com".to_string(),
            },
            access_token: None,
        };

        let yaml = serde_yaml::to_string(&session).unwrap();
        assert!(!yaml.contains("access_token"));
        let parsed: Session = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, session);
    }
}
