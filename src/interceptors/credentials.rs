use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};

use crate::{
    http::{ApiRequest, ApiResponse, HttpError, Interceptor, Next},
    session::CredentialStore,
};

/// CredentialInterceptor
///
/// Adds `Authorization: Bearer <token>` when a token is stored and otherwise
/// forwards the request untouched. The header is the only thing it changes.
pub struct CredentialInterceptor {
    store: CredentialStore,
}

impl CredentialInterceptor {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Interceptor for CredentialInterceptor {
    async fn intercept(
        &self,
        mut request: ApiRequest,
        next: Next<'_>,
    ) -> Result<ApiResponse, HttpError> {
        if let Some(token) = self.store.token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    request.headers.insert(header::AUTHORIZATION, value);
                }
                // Tokens are not validated on write; one that cannot be a header goes unsent.
                Err(_) => tracing::warn!("stored token is not a valid header value, sending request without it"),
            }
        }
        next.run(request).await
    }
}
