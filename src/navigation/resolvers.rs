use std::collections::HashMap;

use crate::{models::Post, posts::PostService};

use super::request::NavigationRequest;

/// Path parameter carrying the post id on detail routes.
pub const POST_ID_PARAM: &str = "postId";

/// Parses a post id the way the detail routes accept it: a positive integer,
/// surrounding whitespace ignored. Anything else is `None`.
pub fn parse_post_id(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|id| *id > 0)
}

/// resolve_post
///
/// Fetches the post named by the `postId` parameter. A malformed or
/// non-positive id yields `None` without a request; any fetch failure also
/// yields `None` (the chain has already reported it).
pub async fn resolve_post(posts: &PostService, request: &NavigationRequest) -> Option<Post> {
    let Some(id) = parse_post_id(request.param(POST_ID_PARAM)) else {
        tracing::debug!(url = %request.url, "invalid post id, skipping fetch");
        return None;
    };

    match posts.find(id).await {
        Ok(post) => Some(post),
        Err(e) => {
            tracing::warn!(id, error = %e, "post could not be resolved");
            None
        }
    }
}

/// Fetches every post; any failure yields `None` so the page shows its error panel.
pub async fn resolve_post_list(posts: &PostService, request: &NavigationRequest) -> Option<Vec<Post>> {
    match posts.get_all().await {
        Ok(list) => Some(list),
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "post list could not be resolved");
            None
        }
    }
}

/// Resolver
///
/// The resolvers a route can attach. Each stores its outcome under a fixed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolver {
    Post,
    PostList,
}

impl Resolver {
    pub fn key(&self) -> &'static str {
        match self {
            Resolver::Post => "post",
            Resolver::PostList => "postList",
        }
    }

    pub async fn resolve(&self, posts: &PostService, request: &NavigationRequest) -> ResolvedData {
        match self {
            Resolver::Post => ResolvedData::Post(resolve_post(posts, request).await),
            Resolver::PostList => ResolvedData::PostList(resolve_post_list(posts, request).await),
        }
    }
}

/// ResolvedData
///
/// A resolver outcome; `None` inside is the "could not be obtained" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedData {
    Post(Option<Post>),
    PostList(Option<Vec<Post>>),
}

/// RouteData
///
/// Everything the resolvers of one navigation produced, keyed by resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteData {
    entries: HashMap<&'static str, ResolvedData>,
}

impl RouteData {
    pub fn insert(&mut self, key: &'static str, data: ResolvedData) {
        self.entries.insert(key, data);
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedData> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The resolved post, or `None` when it was not resolved or not obtained.
    pub fn post(&self) -> Option<&Post> {
        match self.get(Resolver::Post.key()) {
            Some(ResolvedData::Post(post)) => post.as_ref(),
            _ => None,
        }
    }

    pub fn post_list(&self) -> Option<&[Post]> {
        match self.get(Resolver::PostList.key()) {
            Some(ResolvedData::PostList(list)) => list.as_deref(),
            _ => None,
        }
    }
}
