use crate::models::{CreatePostRequest, Post, UpdatePostRequest};
use async_trait::async_trait;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

/// PostRepository
///
/// Persistence contract of the dev backend. Handlers only see this trait, so
/// tests can hand the router any implementation.
///
/// **Send + Sync + async_trait** make `Arc<dyn PostRepository>` shareable
/// across Axum's task boundaries.
#[async_trait]
pub trait PostRepository: Send + Sync {
    // Ordered by id.
    async fn list(&self) -> Vec<Post>;
    async fn get(&self, id: u64) -> Option<Post>;
    async fn create(&self, req: CreatePostRequest) -> Post;
    // Full replacement; None when the id is unknown.
    async fn update(&self, id: u64, req: UpdatePostRequest) -> Option<Post>;
    // Returns true if a post was removed.
    async fn delete(&self, id: u64) -> bool;
}

/// RepositoryState
///
/// The shared handle the router state carries.
pub type RepositoryState = Arc<dyn PostRepository>;

#[derive(Default)]
struct Table {
    rows: BTreeMap<u64, Post>,
    last_id: u64,
}

/// InMemoryPostRepository
///
/// `PostRepository` backed by an ordered map behind an async lock. Ids are
/// assigned sequentially starting at 1 and never reused.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository pre-filled with the given posts, in order.
    pub async fn seeded(posts: impl IntoIterator<Item = CreatePostRequest>) -> Self {
        let repo = Self::new();
        for post in posts {
            repo.create(post).await;
        }
        repo
    }
}

/// A handful of posts so a fresh dev backend has something to list.
pub fn sample_posts() -> Vec<CreatePostRequest> {
    [
        ("Welcome", "This backend keeps its posts in memory."),
        ("Routing", "Every page under /post requires a session."),
        ("Admin", "Log in with an email containing \"admin\" to reach /admin."),
    ]
    .into_iter()
    .map(|(title, body)| CreatePostRequest {
        title: title.to_string(),
        body: body.to_string(),
    })
    .collect()
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self) -> Vec<Post> {
        self.table.read().await.rows.values().cloned().collect()
    }

    async fn get(&self, id: u64) -> Option<Post> {
        self.table.read().await.rows.get(&id).cloned()
    }

    async fn create(&self, req: CreatePostRequest) -> Post {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let post = Post {
            id: table.last_id,
            title: req.title,
            body: req.body,
        };
        table.rows.insert(post.id, post.clone());
        post
    }

    async fn update(&self, id: u64, req: UpdatePostRequest) -> Option<Post> {
        let mut table = self.table.write().await;
        let post = table.rows.get_mut(&id)?;
        post.title = req.title;
        post.body = req.body;
        Some(post.clone())
    }

    async fn delete(&self, id: u64) -> bool {
        self.table.write().await.rows.remove(&id).is_some()
    }
}
