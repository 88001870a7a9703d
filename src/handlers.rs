use crate::{
    AppState,
    auth::AuthUser,
    models::{CreatePostRequest, ErrorBody, Post, UpdatePostRequest},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Error half of every posts handler: a status plus a `{message}` body.
pub type HandlerError = (StatusCode, Json<ErrorBody>);

fn not_found(id: u64) -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(format!("Post {id} was not found"))),
    )
}

/// Both fields are required and must contain more than whitespace.
fn validate(title: &str, body: &str) -> Result<(), HandlerError> {
    let missing: Vec<&str> = [("title", title), ("body", body)]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody::new(format!("{} must not be empty", missing.join(" and ")))),
        ))
    }
}

// --- Handlers ---

/// list_posts
///
/// [Authenticated Route] Every post, ordered by id.
#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "All posts", body = [Post]),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn list_posts(_user: AuthUser, State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.repo.list().await)
}

/// get_post
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = u64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_post(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, HandlerError> {
    state.repo.get(id).await.map(Json).ok_or_else(|| not_found(id))
}

/// create_post
///
/// [Authenticated Route] Stores a new post. Empty title or body → 422.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 422, description = "Validation failed", body = ErrorBody)
    )
)]
pub async fn create_post(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), HandlerError> {
    validate(&payload.title, &payload.body)?;
    let post = state.repo.create(payload).await;
    tracing::info!(id = post.id, author = %email, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// [Authenticated Route] Full replacement of an existing post.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = u64, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    )
)]
pub async fn update_post(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, HandlerError> {
    validate(&payload.title, &payload.body)?;
    state
        .repo
        .update(id, payload)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// delete_post
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = u64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_post(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, HandlerError> {
    if state.repo.delete(id).await {
        tracing::info!(id, author = %email, "post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// health
///
/// [Public Route] Liveness probe; answers "ok" without touching state.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
