//! Client for a hosted GoTrue-style auth endpoint (`/auth/v1/...`).

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use super::{check_credentials, AuthError, AuthProvider, Session, SessionUser};
use crate::models::UserId;

/// Provider for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestAuthProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Token responses carry a user; sign-up without auto-confirm returns only
/// the user fields at the top level.
#[derive(Deserialize)]
struct TokenBody {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserBody>,
}

impl RestAuthProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn password_request(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenBody, AuthError> {
        check_credentials(email, password)?;

        let response = self
            .client
            .post(self.url(path))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "email": email.trim(),
                "password": password,
            }))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

fn session_from(body: TokenBody, email: &str) -> Option<Session> {
    let access_token = body.access_token?;
    let user = body.user?;
    Some(Session {
        user: SessionUser {
            id: UserId::new(user.id),
            email: user.email.unwrap_or_else(|| email.trim().to_string()),
        },
        access_token: Some(access_token),
    })
}

async fn check(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message"]
                .iter()
                .find_map(|k| v[*k].as_str().map(str::to_string))
        })
        .unwrap_or(body);

    Err(AuthError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = self
            .password_request("token?grant_type=password", email, password)
            .await?;
        session_from(body, email).ok_or_else(|| AuthError::Rejected {
            status: 200,
            message: "response did not contain a session".to_string(),
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = self.password_request("signup", email, password).await?;
        session_from(body, email).ok_or_else(|| AuthError::ConfirmationRequired {
            email: email.trim().to_string(),
        })
    }

    async fn current_user(&self, session: &Session) -> Result<Option<SessionUser>, AuthError> {
        let Some(token) = session.access_token.as_deref() else {
            return Ok(None);
        };

        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: UserBody = check(response).await?.json().await?;
        Ok(Some(SessionUser {
            id: UserId::new(user.id),
            email: user.email.unwrap_or_else(|| session.user.email.clone()),
        }))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let Some(token) = session.access_token.as_deref() else {
            return Ok(());
        };

        let response = self
            .client
            .post(self.url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
