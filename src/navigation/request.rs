use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::models::UserRole;

/// NavigationTicket
///
/// Identifies one navigation. Issuing a new ticket from the same generation
/// counter supersedes every older one, which is how in-flight work learns that
/// its result is no longer wanted.
#[derive(Debug, Clone)]
pub struct NavigationTicket {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl NavigationTicket {
    /// Issues the newest ticket of `generation`, superseding all earlier ones.
    pub fn issue(generation: &Arc<AtomicU64>) -> Self {
        let id = generation.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            id,
            generation: Arc::clone(generation),
        }
    }

    /// A ticket with its own generation; it stays current forever.
    pub fn detached() -> Self {
        Self::issue(&Arc::new(AtomicU64::new(0)))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }
}

/// UrlTarget
///
/// A path plus query parameters, used for guard redirects. Query values are
/// form-encoded, so `/post/index` travels as `%2Fpost%2Findex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTarget {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl UrlTarget {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn to_url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// Splits a URL into its path and decoded query pairs; a `#fragment` is dropped.
pub fn split_url(url: &str) -> (String, Vec<(String, String)>) {
    let url = url.split('#').next().unwrap_or_default();
    match url.split_once('?') {
        Some((path, query)) => (
            normalize_path(path),
            form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        ),
        None => (normalize_path(url), Vec::new()),
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

/// NavigationRequest
///
/// An attempted route transition as seen by guards and resolvers. `url` is the
/// literal URL that was requested (query string included) and is what redirect
/// targets carry back as `returnUrl` / `from`.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub url: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub params: HashMap<String, String>,
    pub required_roles: Vec<UserRole>,
    pub previous_url: Option<String>,
    pub ticket: NavigationTicket,
}

impl NavigationRequest {
    /// A standalone request for `url` with no route metadata and a detached ticket.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let (path, query) = split_url(&url);
        Self {
            url,
            path,
            query,
            params: HashMap::new(),
            required_roles: Vec::new(),
            previous_url: None,
            ticket: NavigationTicket::detached(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = UserRole>) -> Self {
        self.required_roles = roles.into_iter().collect();
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
