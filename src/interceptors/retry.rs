use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;

use crate::{
    http::{ApiRequest, ApiResponse, HttpError, Interceptor, Next},
    notify::NotifierState,
};

const CONNECTIVITY_MESSAGE: &str = "Cannot connect to the server. Please check your connection.";
const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this page";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
const SERVER_ERROR_MESSAGE: &str = "Cannot connect to the server";
const UNEXPECTED_MESSAGE: &str = "An unexpected error has occurred";

/// RetryPolicy
///
/// Linear backoff: retry `n` (1-based) waits `backoff_base * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn with_backoff(backoff_base: Duration) -> Self {
        Self {
            backoff_base,
            ..Self::default()
        }
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff_base * retry
    }
}

/// notification_message
///
/// Maps a terminal failure to the message shown globally, or `None` for the
/// validation statuses (400, 422) that belong to the calling form.
pub fn notification_message(error: &HttpError) -> Option<String> {
    let message = match error.status() {
        400 | 422 => return None,
        0 => CONNECTIVITY_MESSAGE.to_string(),
        401 => SESSION_EXPIRED_MESSAGE.to_string(),
        403 => FORBIDDEN_MESSAGE.to_string(),
        404 => error
            .server_message()
            .unwrap_or(NOT_FOUND_MESSAGE)
            .to_string(),
        500 => SERVER_ERROR_MESSAGE.to_string(),
        _ => UNEXPECTED_MESSAGE.to_string(),
    };
    Some(message)
}

/// RetryInterceptor
///
/// The innermost stage. Drives one request through
/// `Pending(n) -> Pending(n + 1)` while the failure is transient and retries
/// remain, then classifies the final outcome:
///
/// - only `GET` requests are retried, and only on status `0` or `>= 500`;
/// - every other failure is terminal immediately, with no delay;
/// - a terminal failure produces at most one notification (none for 400/422)
///   and is then returned unchanged.
///
/// A request whose navigation has been superseded stops retrying and is
/// returned without a notification.
pub struct RetryInterceptor {
    policy: RetryPolicy,
    notifier: NotifierState,
}

impl RetryInterceptor {
    pub fn new(policy: RetryPolicy, notifier: NotifierState) -> Self {
        Self { policy, notifier }
    }

    fn classify(&self, request: &ApiRequest, error: &HttpError) {
        if !request.is_current() {
            tracing::debug!(path = %request.path, "navigation superseded, dropping failure silently");
            return;
        }
        match notification_message(error) {
            Some(message) => {
                tracing::debug!(path = %request.path, status = error.status(), "reporting terminal failure");
                self.notifier.show_error(&message);
            }
            None => {
                tracing::debug!(path = %request.path, status = error.status(), "validation failure left to the caller");
            }
        }
    }
}

#[async_trait]
impl Interceptor for RetryInterceptor {
    async fn intercept(
        &self,
        request: ApiRequest,
        next: Next<'_>,
    ) -> Result<ApiResponse, HttpError> {
        let retryable_method = request.method == Method::GET;
        let mut retries: u32 = 0;

        loop {
            let error = match next.run(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            let can_retry = retryable_method
                && error.is_retryable()
                && retries < self.policy.max_retries
                && request.is_current();

            if !can_retry {
                self.classify(&request, &error);
                return Err(error);
            }

            retries += 1;
            let delay = self.policy.delay_for(retries);
            tracing::warn!(
                path = %request.path,
                status = error.status(),
                attempt = retries,
                delay_ms = delay.as_millis() as u64,
                "retrying transient failure"
            );
            tokio::time::sleep(delay).await;

            if !request.is_current() {
                tracing::debug!(path = %request.path, "navigation superseded during backoff, abandoning request");
                return Err(error);
            }
        }
    }
}
