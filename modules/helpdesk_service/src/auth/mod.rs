//! Authentication Service collaborator
//!
//! The application instance owns one [`SessionStore`]; the auth provider
//! writes to it on sign-in/sign-out and the remote client reads the access
//! token from it for every call.

pub mod gotrue;
pub mod provider;
pub mod session;

pub use gotrue::GoTrueClient;
pub use provider::AuthProvider;
pub use session::{authorization_header, AuthUser, Session, SessionStore};
