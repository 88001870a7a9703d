use std::sync::Arc;

use crate::{
    auth::AuthService,
    busy::BusyTracker,
    config::AppConfig,
    http::{HttpClient, ReqwestTransport, Transport},
    interceptors::{BusyInterceptor, CredentialInterceptor, RetryInterceptor, RetryPolicy},
    navigation::{Navigator, RouteConfigError, default_routes},
    notify::{NotifierState, ToastCenter},
    posts::PostService,
    session::CredentialStore,
    storage::{FileStorage, StorageState},
};

/// Failures while wiring the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientSetupError {
    #[error(transparent)]
    Routes(#[from] RouteConfigError),
    #[error("could not build the HTTP client: {0}")]
    Transport(#[from] reqwest::Error),
}

/// ClientApp
///
/// The client side wired together: one credential store, one busy tracker and
/// one toast center shared by the interceptor chain, the services and the
/// navigator. Every handle is cheap to clone.
#[derive(Clone)]
pub struct ClientApp {
    pub config: AppConfig,
    pub store: CredentialStore,
    pub busy: BusyTracker,
    pub toasts: ToastCenter,
    pub notifier: NotifierState,
    pub http: HttpClient,
    pub posts: PostService,
    pub auth: AuthService,
    pub navigator: Navigator,
}

impl ClientApp {
    /// new
    ///
    /// Builds the chain in its fixed order: credentials, busy tracking, then
    /// retry and classification closest to the transport.
    pub fn new(
        config: AppConfig,
        storage: StorageState,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RouteConfigError> {
        let store = CredentialStore::new(storage);
        let busy = BusyTracker::new();
        let toasts = ToastCenter::new(config.toast_duration());
        let notifier: NotifierState = Arc::new(toasts.clone());

        let http = HttpClient::new(transport)
            .with_interceptor(CredentialInterceptor::new(store.clone()))
            .with_interceptor(BusyInterceptor::new(busy.clone()))
            .with_interceptor(RetryInterceptor::new(
                RetryPolicy::with_backoff(config.retry_backoff()),
                notifier.clone(),
            ));

        let posts = PostService::new(http.clone());
        let auth = AuthService::new(store.clone(), &config);
        let navigator = Navigator::new(default_routes()?, store.clone(), posts.clone());

        Ok(Self {
            config,
            store,
            busy,
            toasts,
            notifier,
            http,
            posts,
            auth,
            navigator,
        })
    }

    /// The production wiring: file-backed credentials and a reqwest transport
    /// pointed at `config.api_url` with `config.request_timeout()`.
    pub fn connect(config: AppConfig) -> Result<Self, ClientSetupError> {
        let storage: StorageState = Arc::new(FileStorage::open(config.storage_path.clone()));
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(
            config.api_url.clone(),
            config.request_timeout(),
        )?);
        Ok(Self::new(config, storage, transport)?)
    }
}
