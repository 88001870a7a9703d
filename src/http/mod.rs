//! Request/response types shared by the interceptor chain and its transport.

mod chain;
mod transport;

pub use chain::{HttpClient, Interceptor, Next};
pub use transport::{ReqwestTransport, Transport};

use reqwest::{Method, StatusCode, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};

use crate::navigation::NavigationTicket;

/// ApiRequest
///
/// One logical HTTP call as it travels through the chain. `path` is relative
/// to the transport's base URL. Requests issued on behalf of a navigation carry
/// that navigation's ticket, so the chain can tell when nobody is waiting for
/// the result any more.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    pub ticket: Option<NavigationTicket>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            ticket: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_ticket(mut self, ticket: Option<NavigationTicket>) -> Self {
        self.ticket = ticket;
        self
    }

    /// False once the navigation that issued this request has been superseded.
    /// Requests not tied to a navigation are always current.
    pub fn is_current(&self) -> bool {
        self.ticket.as_ref().is_none_or(NavigationTicket::is_current)
    }
}

/// ApiResponse
///
/// A successful (2xx) response with its raw body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience for fakes: a 200 response carrying `value` as JSON.
    pub fn ok_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(StatusCode::OK, serde_json::to_vec(value)?))
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HttpError
///
/// A failed call. `Network` is the "no response" case that the retry policy
/// treats as status `0`; `Status` is any non-2xx response, with its body when
/// the body was JSON.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    #[error("network failure: {message}")]
    Network { message: String },
    #[error("request failed with status {status}")]
    Status {
        status: StatusCode,
        body: Option<serde_json::Value>,
    },
}

impl HttpError {
    pub fn network(message: impl Into<String>) -> Self {
        HttpError::Network {
            message: message.into(),
        }
    }

    pub fn status_code(status: StatusCode) -> Self {
        HttpError::Status { status, body: None }
    }

    /// Numeric status, `0` when no response arrived.
    pub fn status(&self) -> u16 {
        match self {
            HttpError::Network { .. } => 0,
            HttpError::Status { status, .. } => status.as_u16(),
        }
    }

    /// The `message` field of a JSON error body, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            HttpError::Status {
                body: Some(body), ..
            } => body.get("message").and_then(serde_json::Value::as_str),
            _ => None,
        }
    }

    /// Transient failures: no response, or a 5xx.
    pub fn is_retryable(&self) -> bool {
        let status = self.status();
        status == 0 || status >= 500
    }

    /// Field-level validation failures, left to the calling form.
    pub fn is_validation(&self) -> bool {
        matches!(self.status(), 400 | 422)
    }
}
