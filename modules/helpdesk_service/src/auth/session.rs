//! Current authentication session

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Identity the session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session issued by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthUser,
}

/// `Authorization` header value for a session: `Bearer <token>`, or the
/// empty string when there is no session
pub fn authorization_header(session: Option<&Session>) -> String {
    match session {
        Some(session) => format!("Bearer {}", session.access_token),
        None => String::new(),
    }
}

/// Shared holder of the current session
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.read().clone()
    }

    pub fn set(&self, session: Session) {
        *self.inner.write() = Some(session);
    }

    pub fn clear(&self) -> Option<Session> {
        self.inner.write().take()
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn authorization_header(&self) -> String {
        authorization_header(self.inner.read().as_ref())
    }
}
