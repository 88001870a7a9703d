use crate::{ApiDoc, AppState, handlers};
use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

/// Public Router Module
///
/// Endpoints that need no session: the liveness probe used by monitors and
/// the generated OpenAPI document.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        .route("/health", get(handlers::health))
        // GET /api-docs/openapi.json
        // The OpenAPI document built from the `#[utoipa::path]` annotations.
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}
