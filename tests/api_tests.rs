use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use post_portal::{
    AppConfig, AppState, create_router,
    auth::issue_token,
    models::{Post, UserRole},
    repository::{InMemoryPostRepository, RepositoryState, sample_posts},
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

async fn app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let repo = Arc::new(InMemoryPostRepository::seeded(sample_posts()).await) as RepositoryState;
    let router = create_router(AppState {
        repo,
        config: config.clone(),
    });
    (router, config)
}

fn bearer(config: &AppConfig) -> String {
    let token = issue_token(&config.jwt_secret, "t@t.com", UserRole::User, Duration::from_secs(60))
        .unwrap();
    format!("Bearer {token}")
}

fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check_is_public() {
    let (app, _) = app().await;
    let response = app
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_lists_post_paths() {
    let (app, _) = app().await;
    let response = app
        .oneshot(request(Method::GET, "/api-docs/openapi.json", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc = json_body(response).await;
    assert!(doc["paths"]["/api/posts"].is_object());
    assert!(doc["paths"]["/api/posts/{id}"].is_object());
}

#[tokio::test]
async fn test_posts_require_bearer_token() {
    let (app, config) = app().await;

    let missing = app
        .clone()
        .oneshot(request(Method::GET, "/api/posts", None, None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let forged = issue_token("another-secret", "t@t.com", UserRole::Admin, Duration::from_secs(60))
        .unwrap();
    let wrong_secret = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/posts",
            Some(&format!("Bearer {forged}")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(wrong_secret.status(), StatusCode::UNAUTHORIZED);

    let ok = app
        .oneshot(request(Method::GET, "/api/posts", Some(&bearer(&config)), None))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let posts: Vec<Post> = serde_json::from_value(json_body(ok).await).unwrap();
    assert_eq!(posts.len(), sample_posts().len());
    assert_eq!(posts[0].id, 1);
}

#[tokio::test]
async fn test_post_lifecycle() {
    let (app, config) = app().await;
    let auth = bearer(&config);

    let created = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/posts",
            Some(&auth),
            Some(json!({ "title": "Fresh", "body": "Out of the oven" })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let post: Post = serde_json::from_value(json_body(created).await).unwrap();
    assert_eq!(post.title, "Fresh");
    let uri = format!("/api/posts/{}", post.id);

    let updated = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(&auth),
            Some(json!({ "title": "Stale", "body": "Cooled down" })),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(json_body(updated).await["title"], "Stale");

    let deleted = app
        .clone()
        .oneshot(request(Method::DELETE, &uri, Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = app
        .oneshot(request(Method::GET, &uri, Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert!(json_body(gone).await["message"].is_string());
}

#[tokio::test]
async fn test_empty_fields_are_unprocessable() {
    let (app, config) = app().await;
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/posts",
            Some(&bearer(&config)),
            Some(json!({ "title": "  ", "body": "" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(response).await["message"],
        "title and body must not be empty"
    );
}

#[tokio::test]
async fn test_unknown_id_is_not_found_for_every_verb() {
    let (app, config) = app().await;
    let auth = bearer(&config);

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(json!({ "title": "t", "body": "b" }))),
        (Method::DELETE, None),
    ] {
        let response = app
            .clone()
            .oneshot(request(method.clone(), "/api/posts/999", Some(&auth), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method}");
    }
}
