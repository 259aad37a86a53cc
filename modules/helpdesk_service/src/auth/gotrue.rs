//! HTTP auth provider for a GoTrue-compatible auth service

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::AuthProvider;
use super::session::{Session, SessionStore};
use crate::config::ClientConfig;
use crate::contract::HelpdeskError;

/// Error payload shapes returned by the auth service
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

pub struct GoTrueClient {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    sessions: SessionStore,
}

impl GoTrueClient {
    pub fn new(http: reqwest::Client, config: &ClientConfig, sessions: SessionStore) -> Self {
        Self {
            http,
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.auth_url, path)
    }

    async fn post(
        &self,
        url: String,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> Result<Response, HelpdeskError> {
        let mut request = self.http.post(url).header("apikey", &self.anon_key);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(transport)?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AuthErrorBody>(&text)
            .ok()
            .and_then(AuthErrorBody::into_message)
            .unwrap_or_else(|| fallback_message(status));
        tracing::warn!(%status, %message, "auth service rejected request");
        Err(HelpdeskError::Auth { message })
    }
}

fn transport(err: reqwest::Error) -> HelpdeskError {
    tracing::warn!(error = %err, "auth service unreachable");
    HelpdeskError::Transport {
        message: err.to_string(),
    }
}

fn fallback_message(status: StatusCode) -> String {
    format!("Authentication failed ({})", status.as_u16())
}

fn credentials(email: &str, password: &str) -> Result<Value, HelpdeskError> {
    if email.trim().is_empty() {
        return Err(HelpdeskError::validation("email is required"));
    }
    if password.is_empty() {
        return Err(HelpdeskError::validation("password is required"));
    }
    Ok(json!({ "email": email.trim(), "password": password }))
}

fn decode_session(value: Value) -> Result<Session, HelpdeskError> {
    serde_json::from_value(value).map_err(|e| HelpdeskError::Auth {
        message: format!("unexpected auth response: {}", e),
    })
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, HelpdeskError> {
        let body = credentials(email, password)?;
        let response = self.post(self.endpoint("signup"), Some(body), None).await?;
        let value: Value = response.json().await.map_err(transport)?;

        // Without auto-confirm the service returns the bare user object
        if value.get("access_token").is_none() {
            tracing::info!("sign-up pending confirmation");
            return Ok(None);
        }

        let session = decode_session(value)?;
        tracing::info!(user_id = %session.user.id, "signed up");
        self.sessions.set(session.clone());
        Ok(Some(session))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, HelpdeskError> {
        let body = credentials(email, password)?;
        let response = self
            .post(self.endpoint("token?grant_type=password"), Some(body), None)
            .await?;
        let value: Value = response.json().await.map_err(transport)?;
        let session = decode_session(value)?;

        tracing::info!(user_id = %session.user.id, "signed in");
        self.sessions.set(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), HelpdeskError> {
        let Some(session) = self.sessions.current() else {
            return Ok(());
        };

        let outcome = self
            .post(self.endpoint("logout"), None, Some(&session.access_token))
            .await;
        // The local session is dropped even if the service call fails
        self.sessions.clear();
        outcome.map(|_| {
            tracing::info!(user_id = %session.user.id, "signed out");
        })
    }

    fn current_session(&self) -> Option<Session> {
        self.sessions.current()
    }
}
