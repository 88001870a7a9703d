use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Shared data shapes and configuration.
pub mod config;
pub mod models;

// Client side: session, pipeline, services, routing and pages.
pub mod app;
pub mod auth;
pub mod busy;
pub mod http;
pub mod interceptors;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod posts;
pub mod session;
pub mod storage;

// Dev backend: the posts REST API the client consumes.
pub mod handlers;
pub mod repository;
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use app::{ClientApp, ClientSetupError};
pub use config::AppConfig;
pub use repository::{InMemoryPostRepository, RepositoryState};
pub use session::CredentialStore;
pub use storage::{FileStorage, MemoryStorage, StorageState};

/// ApiDoc
///
/// The OpenAPI document of the dev backend, generated from the
/// `#[utoipa::path]` and `#[derive(ToSchema)]` annotations and served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::list_posts, handlers::get_post, handlers::create_post,
        handlers::update_post, handlers::delete_post
    ),
    components(
        schemas(
            models::Post, models::CreatePostRequest, models::UpdatePostRequest,
            models::ErrorBody, models::UserRole, models::LoginRequest,
            models::LoginResponse, models::AuthUserInfo,
        )
    ),
    tags(
        (name = "post-portal", description = "Post Portal development API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The shared state of the dev backend: the post repository and the
/// configuration (whose secret validates bearer tokens).
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated routes: the `AuthUser` extractor rejects a missing
/// or invalid bearer token with 401 before any handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the dev backend: public routes at the root, the posts resource
/// under `/api` behind `auth_middleware`, then the observability and CORS
/// layers around everything.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(public::public_routes())
        .nest(
            "/api",
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span with method, URI and the `x-request-id` set by
/// `SetRequestIdLayer`, so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
