use std::collections::{HashMap, HashSet};

use crate::models::UserRole;

use super::{
    guards::Guard,
    resolvers::{POST_ID_PARAM, Resolver},
};

/// Page
///
/// The destination pages the route table can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    PostIndex,
    PostCreate,
    PostEdit,
    PostView,
    AdminDashboard,
    Forbidden,
    NotFound,
}

/// RouteDef
///
/// One entry of the route table. A route either renders a page (guarded, with
/// optional resolvers and a required-role list) or redirects to another URL.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub pattern: String,
    pub page: Option<Page>,
    pub redirect_to: Option<String>,
    pub guards: Vec<Guard>,
    pub roles: Vec<UserRole>,
    pub resolvers: Vec<Resolver>,
}

impl RouteDef {
    pub fn page(pattern: impl Into<String>, page: Page) -> Self {
        Self {
            pattern: pattern.into(),
            page: Some(page),
            redirect_to: None,
            guards: Vec::new(),
            roles: Vec::new(),
            resolvers: Vec::new(),
        }
    }

    pub fn redirect(pattern: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            page: None,
            redirect_to: Some(to.into()),
            guards: Vec::new(),
            roles: Vec::new(),
            resolvers: Vec::new(),
        }
    }

    /// Appends a guard; guards run in the order they were added.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn roles(mut self, roles: impl IntoIterator<Item = UserRole>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn resolve(mut self, resolver: Resolver) -> Self {
        self.resolvers.push(resolver);
        self
    }

    fn segments(&self) -> Vec<&str> {
        split_segments(&self.pattern)
    }

    fn has_param(&self, name: &str) -> bool {
        self.segments()
            .iter()
            .any(|s| s.strip_prefix(':') == Some(name))
    }

    /// Matches `path` against the pattern, returning the captured parameters.
    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern = self.segments();
        let actual = split_segments(path);
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, got) in pattern.iter().zip(actual) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), got.to_string());
                }
                None if *expected == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// RouteConfigError
///
/// Route-table mistakes caught when the table is built, before any navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteConfigError {
    #[error("route pattern `{0}` must start with `/` and name every parameter")]
    InvalidPattern(String),
    #[error("route pattern `{0}` is declared more than once")]
    DuplicatePattern(String),
    #[error("route `{0}` declares required roles but no role guard")]
    RolesWithoutRoleGuard(String),
    #[error("route `{pattern}` resolves a post but has no `:{param}` segment")]
    MissingParam { pattern: String, param: String },
    #[error("redirect route `{0}` cannot carry guards, roles or resolvers")]
    RedirectWithBehaviour(String),
    #[error("route `{0}` neither renders a page nor redirects")]
    NoDestination(String),
}

/// A successful table lookup.
#[derive(Debug, Clone)]
pub enum RouteMatch<'a> {
    Route {
        route: &'a RouteDef,
        page: Page,
        params: HashMap<String, String>,
    },
    Redirect(&'a str),
    Fallback(Page),
}

/// RouteTable
///
/// A validated, ordered list of routes plus the page shown when nothing matches.
/// The first matching route wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    fallback: Page,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDef>) -> Result<Self, RouteConfigError> {
        let mut seen = HashSet::new();
        for route in &routes {
            validate(route)?;
            if !seen.insert(route.pattern.as_str()) {
                return Err(RouteConfigError::DuplicatePattern(route.pattern.clone()));
            }
        }
        Ok(Self {
            routes,
            fallback: Page::NotFound,
        })
    }

    pub fn with_fallback(mut self, page: Page) -> Self {
        self.fallback = page;
        self
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    pub fn lookup(&self, path: &str) -> RouteMatch<'_> {
        for route in &self.routes {
            if let Some(params) = route.matches(path) {
                return match (&route.redirect_to, route.page) {
                    (Some(to), _) => RouteMatch::Redirect(to),
                    (None, Some(page)) => RouteMatch::Route {
                        route,
                        page,
                        params,
                    },
                    // Unreachable for validated tables.
                    (None, None) => RouteMatch::Fallback(self.fallback),
                };
            }
        }
        RouteMatch::Fallback(self.fallback)
    }
}

fn validate(route: &RouteDef) -> Result<(), RouteConfigError> {
    let pattern = &route.pattern;
    if !pattern.starts_with('/') || route.segments().iter().any(|s| *s == ":") {
        return Err(RouteConfigError::InvalidPattern(pattern.clone()));
    }

    match (&route.page, &route.redirect_to) {
        (None, None) => return Err(RouteConfigError::NoDestination(pattern.clone())),
        (_, Some(_)) => {
            if route.page.is_some()
                || !route.guards.is_empty()
                || !route.roles.is_empty()
                || !route.resolvers.is_empty()
            {
                return Err(RouteConfigError::RedirectWithBehaviour(pattern.clone()));
            }
        }
        (Some(_), None) => {}
    }

    if !route.roles.is_empty() && !route.guards.contains(&Guard::RequireRole) {
        return Err(RouteConfigError::RolesWithoutRoleGuard(pattern.clone()));
    }

    if route.resolvers.contains(&Resolver::Post) && !route.has_param(POST_ID_PARAM) {
        return Err(RouteConfigError::MissingParam {
            pattern: pattern.clone(),
            param: POST_ID_PARAM.to_string(),
        });
    }

    Ok(())
}

/// default_routes
///
/// The application's route table: posts behind authentication, login only for
/// anonymous visitors, the admin dashboard behind the `admin` role.
pub fn default_routes() -> Result<RouteTable, RouteConfigError> {
    RouteTable::new(vec![
        RouteDef::redirect("/", "/post/index"),
        RouteDef::redirect("/auth", "/auth/login"),
        RouteDef::page("/auth/login", Page::Login).guard(Guard::RequireAnonymous),
        RouteDef::redirect("/post", "/post/index"),
        RouteDef::page("/post/index", Page::PostIndex)
            .guard(Guard::RequireAuthenticated)
            .resolve(Resolver::PostList),
        RouteDef::page("/post/create", Page::PostCreate).guard(Guard::RequireAuthenticated),
        RouteDef::page("/post/:postId/edit", Page::PostEdit)
            .guard(Guard::RequireAuthenticated)
            .resolve(Resolver::Post),
        RouteDef::page("/post/:postId/view", Page::PostView)
            .guard(Guard::RequireAuthenticated)
            .resolve(Resolver::Post),
        RouteDef::page("/admin", Page::AdminDashboard)
            .guard(Guard::RequireAuthenticated)
            .guard(Guard::RequireRole)
            .roles([UserRole::Admin]),
        RouteDef::page("/forbidden", Page::Forbidden),
    ])
}
