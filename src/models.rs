use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Resource Schemas ---

/// Post
///
/// The single resource managed by the application. The wire shape is exactly
/// `{id, title, body}` on both the REST API and the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for creating a post (POST /posts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
}

/// UpdatePostRequest
///
/// Full replacement payload for an existing post (PUT /posts/{id}).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    pub title: String,
    pub body: String,
}

/// ErrorBody
///
/// Error payload returned by the API. `message` is optional because a number of
/// failures (gateway errors, empty 401s) arrive without a body at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

// --- Authentication Schemas ---

/// UserRole
///
/// The closed set of roles known to the application. Roles are persisted as
/// their lowercase name (`"user"`, `"admin"`, `"moderator"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum UserRole {
    User,
    Admin,
    Moderator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::Moderator => "moderator",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored role string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            "moderator" => Ok(UserRole::Moderator),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// LoginRequest
///
/// Credentials submitted by the login form. Never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// AuthUserInfo
///
/// The identity half of a login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthUserInfo {
    pub email: String,
    pub role: UserRole,
}

/// LoginResponse
///
/// Output of a successful login: the bearer token to persist plus the user's
/// identity. Serialized in camelCase to match the frontend contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: AuthUserInfo,
}
