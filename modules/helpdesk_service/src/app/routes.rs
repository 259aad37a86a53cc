//! Client-side route table

use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    /// Organization list
    Home,
    Profile,
    Tickets { organization_id: Uuid },
    Ticket { organization_id: Uuid, ticket_id: Uuid },
    OrganizationProfile { organization_id: Uuid },
}

impl Route {
    /// Match a path exactly; `None` for anything unknown
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["login"] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["profile"] => Some(Route::Profile),
            [org, "tickets"] => Some(Route::Tickets {
                organization_id: org.parse().ok()?,
            }),
            [org, "tickets", ticket] => Some(Route::Ticket {
                organization_id: org.parse().ok()?,
                ticket_id: ticket.parse().ok()?,
            }),
            [org, "profile"] => Some(Route::OrganizationProfile {
                organization_id: org.parse().ok()?,
            }),
            _ => None,
        }
    }

    /// Everything except the sign-in screens needs a session
    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Home => "/".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Tickets { organization_id } => format!("/{}/tickets", organization_id),
            Route::Ticket {
                organization_id,
                ticket_id,
            } => format!("/{}/tickets/{}", organization_id, ticket_id),
            Route::OrganizationProfile { organization_id } => {
                format!("/{}/profile", organization_id)
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The route actually rendered for `path`: unknown paths fall back to
/// `/`, protected routes without a session go to `/login`
pub fn resolve(path: &str, signed_in: bool) -> Route {
    let route = Route::parse(path).unwrap_or(Route::Home);
    if route.requires_session() && !signed_in {
        return Route::Login;
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_path_renders_home() {
        assert_eq!(resolve("/does-not-exist", true), resolve("/", true));
        assert_eq!(resolve("/does-not-exist", false), resolve("/", false));
    }

    #[test]
    fn protected_routes_redirect_to_login() {
        assert_eq!(resolve("/", false), Route::Login);
        assert_eq!(resolve("/profile", false), Route::Login);
        assert_eq!(resolve("/register", false), Route::Register);
    }

    #[test]
    fn organization_routes_carry_ids() {
        let org = Uuid::new_v4();
        let ticket = Uuid::new_v4();
        let route = resolve(&format!("/{}/tickets/{}", org, ticket), true);
        assert_eq!(
            route,
            Route::Ticket {
                organization_id: org,
                ticket_id: ticket
            }
        );
        assert_eq!(Route::parse(&route.path()), Some(route));
    }

    #[test]
    fn malformed_ids_are_unknown() {
        assert_eq!(Route::parse("/acme/tickets"), None);
        assert_eq!(resolve("/acme/tickets", true), Route::Home);
    }

    #[test]
    fn query_and_trailing_slash_are_ignored() {
        assert_eq!(Route::parse("/login/?next=/"), Some(Route::Login));
    }
}
