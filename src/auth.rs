use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    models::{AuthUserInfo, LoginRequest, LoginResponse, UserRole},
    session::CredentialStore,
};

/// Claims
///
/// Payload of the mock session token. The role travels inside the signed token
/// so the backend never has to trust a role the client merely asserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): a per-login identifier; the mock has no user table.
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthError
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("failed to issue session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// The HTTP status a real login endpoint would answer with.
    pub fn status(&self) -> u16 {
        match self {
            AuthError::MissingCredentials => 400,
            AuthError::Token(_) => 500,
        }
    }
}

/// Mock rule: an email containing "admin" (any case) logs in as admin.
pub fn role_for_email(email: &str) -> UserRole {
    if email.to_lowercase().contains("admin") {
        UserRole::Admin
    } else {
        UserRole::User
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// issue_token
///
/// Mints an HS256 token for `email` with the given role, valid for `ttl`.
pub fn issue_token(
    secret: &str,
    email: &str,
    role: UserRole,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = unix_now();
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: email.to_string(),
        role,
        iat: now as usize,
        exp: (now + ttl.as_secs()) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates signature and expiry and returns the claims.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// AuthService
///
/// The mock login flow. Any non-empty email/password pair is accepted; the
/// role is derived from the email. On success the caller hands the response
/// to `handle_login_success`, which is the only place the session is written.
#[derive(Clone)]
pub struct AuthService {
    store: CredentialStore,
    authenticated: Arc<watch::Sender<bool>>,
    jwt_secret: String,
    latency: Duration,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(store: CredentialStore, config: &AppConfig) -> Self {
        let (authenticated, _) = watch::channel(store.token().is_some());
        Self {
            store,
            authenticated: Arc::new(authenticated),
            jwt_secret: config.jwt_secret.clone(),
            latency: config.login_latency(),
            token_ttl: Duration::from_secs(config.token_ttl_secs),
        }
    }

    pub async fn login(&self, payload: &LoginRequest) -> Result<LoginResponse, AuthError> {
        if payload.email.is_empty() || payload.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let role = role_for_email(&payload.email);
        let access_token = issue_token(&self.jwt_secret, &payload.email, role, self.token_ttl)?;

        // Mimic the network round trip of a real login.
        tokio::time::sleep(self.latency).await;

        Ok(LoginResponse {
            access_token,
            user: AuthUserInfo {
                email: payload.email.clone(),
                role,
            },
        })
    }

    pub fn handle_login_success(&self, response: &LoginResponse) {
        self.store.set_token(&response.access_token);
        self.store.set_role(response.user.role.as_str());
        self.authenticated.send_replace(true);
        tracing::info!(role = %response.user.role, "session started");
    }

    pub fn logout(&self) {
        self.store.clear();
        self.authenticated.send_replace(false);
        tracing::info!("session cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }
}

/// AuthUser Extractor Result
///
/// The identity resolved from a valid bearer token on the dev backend.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument. The process is:
/// 1. Dependency Resolution: pull `AppConfig` (for the secret) from state.
/// 2. Token Extraction: `Authorization: Bearer <token>`.
/// 3. Token Validation: signature and expiry.
///
/// Rejection: `StatusCode::UNAUTHORIZED` (401) on any failure, which the
/// client pipeline turns into the "session expired" notification.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = decode_token(&config.jwt_secret, token).map_err(|e| {
            tracing::debug!(error = %e, "rejecting bearer token");
            StatusCode::UNAUTHORIZED
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
