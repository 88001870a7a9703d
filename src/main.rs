use post_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{InMemoryPostRepository, RepositoryState, sample_posts},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Boots the development backend: configuration, logging, a seeded in-memory
/// repository and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate and request logs from tower_http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "post_portal=debug,tower_http=info".into());

    // 3. Log format per environment: readable locally, JSON for aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    for (key, value) in &config.ignored_vars {
        tracing::warn!(key = %key, value = %value, "ignoring non-numeric configuration value");
    }

    // 4. Repository
    let repo = Arc::new(InMemoryPostRepository::seeded(sample_posts()).await) as RepositoryState;

    // 5. Router and Server Startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: could not bind {bind_addr}: {e}"));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("OpenAPI document available at: http://{bind_addr}/api-docs/openapi.json");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
