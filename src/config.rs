use std::{env, path::PathBuf, time::Duration};

/// AppConfig
///
/// Holds the application's entire configuration state. It is loaded once at
/// startup and then cloned into the client pipeline and the dev backend, so
/// every component sees the same immutable values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which secrets are mandatory.
    pub env: Env,
    // Address the dev backend binds to.
    pub bind_addr: String,
    // Base URL every client request is resolved against (e.g. http://localhost:3000/api).
    pub api_url: String,
    // HS256 secret used to mint mock session tokens and to validate them on the backend.
    pub jwt_secret: String,
    // File backing the credential store (the `access_token` / `user_role` entries).
    pub storage_path: PathBuf,
    // Linear backoff unit for GET retries: attempt N waits N * retry_backoff_ms.
    pub retry_backoff_ms: u64,
    // How long success/error toasts stay visible.
    pub toast_duration_ms: u64,
    // Simulated network latency of the mock login.
    pub login_latency_ms: u64,
    // Lifetime of a minted session token.
    pub token_ttl_secs: u64,
    // Connect and whole-request timeout of the reqwest transport. A request that
    // times out is a network failure (status 0).
    pub request_timeout_ms: u64,
    // Variables that were set but not numeric, as (key, raw value). Logging is
    // not up yet during `load`, so the caller reports these.
    pub ignored_vars: Vec<(String, String)>,
}

/// Env
///
/// Defines the runtime context: developer-friendly defaults locally, explicit
/// secrets and structured logs in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "post-portal-local-secret-value";
const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STORAGE_PATH: &str = ".post-portal/credentials.json";

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking values for tests and scaffolding. No environment
    /// variables are read.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            retry_backoff_ms: 1000,
            toast_duration_ms: 5000,
            login_latency_ms: 600,
            token_ttl_secs: 3600,
            request_timeout_ms: 10_000,
            ignored_vars: Vec::new(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables and applies the
    /// **fail-fast** principle for production.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `API_URL` or `JWT_SECRET` is missing,
    /// so a misconfigured deployment never starts talking to the wrong backend
    /// or signing tokens with the local fallback secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (api_url, jwt_secret) = match env {
            Env::Production => (
                env::var("API_URL").expect("FATAL: API_URL must be set in production."),
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        let defaults = Self::default();
        let mut ignored_vars = Vec::new();
        let mut number =
            |key: &str, default: u64| parse_var(key, &mut ignored_vars).unwrap_or(default);

        let retry_backoff_ms = number("RETRY_BACKOFF_MS", defaults.retry_backoff_ms);
        let toast_duration_ms = number("TOAST_DURATION_MS", defaults.toast_duration_ms);
        let login_latency_ms = number("LOGIN_LATENCY_MS", defaults.login_latency_ms);
        let token_ttl_secs = number("TOKEN_TTL_SECS", defaults.token_ttl_secs);
        let request_timeout_ms = number("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms);

        Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            api_url: api_url.trim_end_matches('/').to_string(),
            jwt_secret,
            storage_path: env::var("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            retry_backoff_ms,
            toast_duration_ms,
            login_latency_ms,
            token_ttl_secs,
            request_timeout_ms,
            ignored_vars,
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// Unparseable numeric values fall back to the default rather than aborting startup.
fn parse_var(key: &str, ignored: &mut Vec<(String, String)>) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            ignored.push((key.to_string(), raw));
            None
        }
    }
}
