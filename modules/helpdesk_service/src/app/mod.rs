//! Headless screen controllers
//!
//! A [`ClientApp`] owns the handles one application instance needs: the
//! façade, the auth provider, the session store both of them share and the
//! profile mirror. Nothing here is global; tests build an app from doubles.

pub mod forms;
pub mod mirror;
pub mod routes;

pub use forms::{CreateOrganizationForm, LoginForm, ProfileForm, RegisterForm, PASSWORD_MISMATCH};
pub use mirror::ProfileMirror;
pub use routes::{resolve, Route};

use crate::api::remote::RemoteClient;
use crate::auth::{AuthProvider, GoTrueClient, Session, SessionStore};
use crate::config::ClientConfig;
use crate::contract::schema::{OrganizationRow, ProfileInsert, ProfileRow};
use crate::contract::{HelpdeskApi, HelpdeskError};
use std::sync::Arc;

/// Profile as shown on the profile screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub profile: ProfileRow,
    /// Served from the mirror because the remote read failed
    pub offline: bool,
}

pub struct ClientApp {
    api: Arc<dyn HelpdeskApi>,
    auth: Arc<dyn AuthProvider>,
    sessions: SessionStore,
    mirror: ProfileMirror,
}

impl ClientApp {
    pub fn new(
        api: Arc<dyn HelpdeskApi>,
        auth: Arc<dyn AuthProvider>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            api,
            auth,
            sessions,
            mirror: ProfileMirror::new(),
        }
    }

    /// Wire the HTTP façade and auth client around one session store
    pub fn remote(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = config.http_client()?;
        let sessions = SessionStore::new();
        let api = Arc::new(RemoteClient::new(http.clone(), config, sessions.clone()));
        let auth = Arc::new(GoTrueClient::new(http, config, sessions.clone()));
        Ok(Self::new(api, auth, sessions))
    }

    pub fn api(&self) -> &Arc<dyn HelpdeskApi> {
        &self.api
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn mirror(&self) -> &ProfileMirror {
        &self.mirror
    }

    /// Route to render for `path` given the current session
    pub fn navigate(&self, path: &str) -> Route {
        resolve(path, self.sessions.is_signed_in())
    }

    /// Validate, sign up, and create the caller's profile when the auth
    /// service signs them in right away
    pub async fn register(&self, form: &RegisterForm) -> Result<Option<Session>, HelpdeskError> {
        form.validate()?;

        let Some(session) = self.auth.sign_up(form.email(), &form.password).await? else {
            return Ok(None);
        };

        let profile = ProfileInsert {
            id: session.user.id,
            full_name: form
                .full_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            avatar_url: None,
            created_at: None,
            updated_at: None,
        };
        let profile = self.api.create_profile(profile).await?;
        self.mirror.store(profile);
        Ok(Some(session))
    }

    pub async fn login(&self, form: &LoginForm) -> Result<Session, HelpdeskError> {
        form.validate()?;
        self.auth.sign_in(form.email.trim(), &form.password).await
    }

    pub async fn logout(&self) -> Result<(), HelpdeskError> {
        self.mirror.clear();
        self.auth.sign_out().await
    }

    pub async fn create_organization(
        &self,
        form: &CreateOrganizationForm,
    ) -> Result<OrganizationRow, HelpdeskError> {
        let name = form.validate()?;
        let organization = self.api.create_organization(name).await?;
        tracing::info!(organization_id = %organization.id, "organization created");
        Ok(organization)
    }

    /// Own profile; falls back to the mirror while the remote is unavailable
    pub async fn my_profile(&self) -> Result<ProfileView, HelpdeskError> {
        match self.api.get_my_profile().await {
            Ok(profile) => {
                self.mirror.store(profile.clone());
                Ok(ProfileView {
                    profile,
                    offline: false,
                })
            }
            Err(err) if err.is_unavailable() => {
                let cached = self
                    .auth
                    .current_session()
                    .and_then(|session| self.mirror.get(session.user.id));
                match cached {
                    Some(profile) => {
                        tracing::warn!(error = %err, "serving profile from mirror");
                        Ok(ProfileView {
                            profile,
                            offline: true,
                        })
                    }
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    pub async fn save_profile(&self, form: &ProfileForm) -> Result<ProfileRow, HelpdeskError> {
        let profile = self.api.update_profile(form.to_update()).await?;
        self.mirror.store(profile.clone());
        Ok(profile)
    }
}
