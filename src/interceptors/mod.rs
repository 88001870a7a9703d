/// Interceptor Module Index
///
/// The three standard stages, listed in the order they wrap every request:
/// credential injection (outermost), busy tracking, then retry and error
/// classification (innermost, closest to the network).

/// Attaches the stored bearer token.
pub mod credentials;

/// Counts the request as in flight for its whole lifetime, retries included.
pub mod busy;

/// Retries transient GET failures, then reports terminal ones exactly once.
pub mod retry;

pub use busy::BusyInterceptor;
pub use credentials::CredentialInterceptor;
pub use retry::{RetryInterceptor, RetryPolicy, notification_message};
