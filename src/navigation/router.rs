use futures::future::join_all;
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    sync::{Arc, atomic::AtomicU64},
};

use crate::{posts::PostService, session::CredentialStore};

use super::{
    guards::GuardDecision,
    request::{NavigationRequest, NavigationTicket, split_url},
    resolvers::RouteData,
    routes::{Page, RouteMatch, RouteTable},
};

/// Upper bound on route and guard redirects followed by one navigation.
pub const MAX_REDIRECTS: usize = 10;

/// ActivatedRoute
///
/// The committed result of a navigation, handed to the destination page.
#[derive(Debug, Clone)]
pub struct ActivatedRoute {
    pub url: String,
    pub page: Page,
    pub params: HashMap<String, String>,
    pub query: Vec<(String, String)>,
    pub data: RouteData,
}

impl ActivatedRoute {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// NavigationOutcome
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// The destination page can render.
    Activated(ActivatedRoute),
    /// A newer navigation started before this one finished; its data was discarded.
    Superseded,
    /// Redirects kept bouncing; the last URL tried is reported.
    TooManyRedirects { last_url: String },
}

impl NavigationOutcome {
    pub fn activated(self) -> Option<ActivatedRoute> {
        match self {
            NavigationOutcome::Activated(route) => Some(route),
            _ => None,
        }
    }
}

/// Navigator
///
/// Runs a navigation end to end: route lookup, guards in declared order
/// (stopping at the first redirect), then every resolver of the matched route
/// concurrently. Only the newest navigation may commit; older ones finish as
/// `Superseded` and their in-flight requests go quiet.
#[derive(Clone)]
pub struct Navigator {
    routes: Arc<RouteTable>,
    store: CredentialStore,
    posts: PostService,
    generation: Arc<AtomicU64>,
    current_url: Arc<RwLock<Option<String>>>,
}

impl Navigator {
    pub fn new(routes: RouteTable, store: CredentialStore, posts: PostService) -> Self {
        Self {
            routes: Arc::new(routes),
            store,
            posts,
            generation: Arc::new(AtomicU64::new(0)),
            current_url: Arc::new(RwLock::new(None)),
        }
    }

    /// The URL of the last committed navigation.
    pub fn current_url(&self) -> Option<String> {
        self.current_url.read().clone()
    }

    /// Navigates to the current URL again so its resolvers run afresh.
    pub async fn reload(&self) -> NavigationOutcome {
        let url = self.current_url().unwrap_or_else(|| "/".to_string());
        self.navigate(&url).await
    }

    pub async fn navigate(&self, url: &str) -> NavigationOutcome {
        let ticket = NavigationTicket::issue(&self.generation);
        let previous_url = self.current_url();
        let mut url = url.to_string();

        for _ in 0..MAX_REDIRECTS {
            let (path, query) = split_url(&url);

            let (route, page, params) = match self.routes.lookup(&path) {
                RouteMatch::Redirect(to) => {
                    tracing::debug!(from = %url, to, "following route redirect");
                    url = to.to_string();
                    continue;
                }
                RouteMatch::Fallback(page) => {
                    return self.commit(&ticket, ActivatedRoute {
                        url,
                        page,
                        params: HashMap::new(),
                        query,
                        data: RouteData::default(),
                    });
                }
                RouteMatch::Route {
                    route,
                    page,
                    params,
                } => (route, page, params),
            };

            let request = NavigationRequest {
                url: url.clone(),
                path,
                query,
                params,
                required_roles: route.roles.clone(),
                previous_url: previous_url.clone(),
                ticket: ticket.clone(),
            };

            let redirect = route
                .guards
                .iter()
                .map(|guard| guard.check(&request, &self.store))
                .find_map(|decision| match decision {
                    GuardDecision::Allow => None,
                    GuardDecision::Redirect(target) => Some(target),
                });
            if let Some(target) = redirect {
                let to = target.to_url();
                tracing::debug!(from = %request.url, to = %to, "guard redirected navigation");
                url = to;
                continue;
            }

            let posts = self.posts.scoped(ticket.clone());
            let (posts, pending) = (&posts, &request);
            let resolved = join_all(route.resolvers.iter().map(|resolver| async move {
                (resolver.key(), resolver.resolve(posts, pending).await)
            }))
            .await;

            let mut data = RouteData::default();
            for (key, value) in resolved {
                data.insert(key, value);
            }

            return self.commit(&ticket, ActivatedRoute {
                url: request.url,
                page,
                params: request.params,
                query: request.query,
                data,
            });
        }

        tracing::warn!(last_url = %url, "navigation exceeded redirect limit");
        NavigationOutcome::TooManyRedirects { last_url: url }
    }

    fn commit(&self, ticket: &NavigationTicket, route: ActivatedRoute) -> NavigationOutcome {
        if !ticket.is_current() {
            tracing::debug!(url = %route.url, "discarding superseded navigation");
            return NavigationOutcome::Superseded;
        }
        *self.current_url.write() = Some(route.url.clone());
        NavigationOutcome::Activated(route)
    }
}
