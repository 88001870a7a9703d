/// Router Module Index
///
/// Splits the dev backend's routes by access level so authentication is
/// applied at the module boundary (via an Axum layer) rather than per handler.

/// Routes reachable without a session: health and API documentation.
pub mod public;

/// The `/posts` resource. Every route requires a valid bearer token.
pub mod authenticated;
