use std::time::Duration;

use async_trait::async_trait;

use super::{ApiRequest, ApiResponse, HttpError};

/// Transport
///
/// The network edge of the chain: turns one `ApiRequest` into one response.
/// Implementations must not retry or report; that is the chain's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError>;
}

/// ReqwestTransport
///
/// The production transport. Paths are appended to `base_url`
/// (e.g. `http://localhost:3000/api` + `/posts`). Every request is bounded by
/// `timeout`, so a server that never answers still ends in a network failure.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        // No response at all (DNS, refused connection, reset, timeout) maps to status 0.
        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::network(e.to_string()))?;

        if status.is_success() {
            Ok(ApiResponse::new(status, bytes.to_vec()))
        } else {
            Err(HttpError::Status {
                status,
                body: serde_json::from_slice(&bytes).ok(),
            })
        }
    }
}
