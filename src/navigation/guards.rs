use crate::{models::UserRole, session::CredentialStore};

use super::request::{NavigationRequest, UrlTarget};

pub const LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_PATH: &str = "/post/index";
pub const FORBIDDEN_PATH: &str = "/forbidden";

/// GuardDecision
///
/// A guard either lets the transition commit or names where to go instead.
/// Redirects are ordinary control flow, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(UrlTarget),
}

/// Guard
///
/// The guards a route can declare. Each one reads the session at most once
/// and builds at most one redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    RequireAuthenticated,
    RequireAnonymous,
    RequireRole,
}

impl Guard {
    pub fn check(&self, request: &NavigationRequest, store: &CredentialStore) -> GuardDecision {
        match self {
            Guard::RequireAuthenticated => require_authenticated(request, store),
            Guard::RequireAnonymous => require_anonymous(request, store),
            Guard::RequireRole => require_role(request, store),
        }
    }
}

/// Sends visitors without a token to the login page, remembering the exact
/// URL they asked for.
pub fn require_authenticated(request: &NavigationRequest, store: &CredentialStore) -> GuardDecision {
    if store.token().is_some() {
        return GuardDecision::Allow;
    }
    GuardDecision::Redirect(UrlTarget::new(LOGIN_PATH).with_query("returnUrl", &request.url))
}

/// Keeps signed-in users away from login-style pages.
pub fn require_anonymous(_request: &NavigationRequest, store: &CredentialStore) -> GuardDecision {
    if store.token().is_none() {
        return GuardDecision::Allow;
    }
    GuardDecision::Redirect(UrlTarget::new(DEFAULT_PATH))
}

/// require_role
///
/// Allows the transition when the route declares no roles (without touching
/// the store), or when the stored role is one of the declared roles. A stored
/// role that is not a known `UserRole` never matches.
pub fn require_role(request: &NavigationRequest, store: &CredentialStore) -> GuardDecision {
    if request.required_roles.is_empty() {
        return GuardDecision::Allow;
    }

    let granted = store
        .role()
        .and_then(|raw| raw.parse::<UserRole>().ok())
        .is_some_and(|role| request.required_roles.contains(&role));

    if granted {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect(UrlTarget::new(FORBIDDEN_PATH).with_query("from", &request.url))
    }
}
