//! Authentication provider seam

use super::session::Session;
use crate::contract::HelpdeskError;
use async_trait::async_trait;

/// Sign-up, sign-in and sign-out against the auth service
///
/// Implementations record the resulting session in the application's
/// session store; `current_session` reads it back.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new identity. Returns the session when the auth service
    /// signs the user in immediately, `None` when confirmation is pending.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, HelpdeskError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, HelpdeskError>;

    async fn sign_out(&self) -> Result<(), HelpdeskError>;

    fn current_session(&self) -> Option<Session>;
}
