use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// The posts REST resource consumed by the client. The router is mounted under
/// `/api` behind the authentication layer, and each handler additionally takes
/// the `AuthUser` extractor so a missing or invalid token is always a 401.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /posts
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        // GET/PUT/DELETE /posts/{id}
        // Unknown ids answer 404 with a `{message}` body.
        .route(
            "/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
}
