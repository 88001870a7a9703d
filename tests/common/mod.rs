#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use post_portal::{
    busy::BusyTracker,
    http::{ApiRequest, ApiResponse, HttpClient, HttpError, Transport},
    interceptors::{BusyInterceptor, CredentialInterceptor, RetryInterceptor, RetryPolicy},
    models::Post,
    navigation::{Navigator, default_routes},
    notify::{NotificationSink, NotifierState, ToastLevel},
    posts::PostService,
    session::CredentialStore,
    storage::{KeyValueStore, MemoryStorage, StorageError, StorageState},
};
use reqwest::{Method, StatusCode};
use serde_json::json;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

// --- Scripted Transport ---

type Scripted = Result<ApiResponse, HttpError>;

/// Answers each (method, path) from a queue of canned outcomes. The last
/// outcome of a queue repeats forever; unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<ApiRequest>>,
    latency: Mutex<Option<Duration>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, path: &str, outcome: Scripted) -> &Self {
        self.scripts
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn respond_json<T: serde::Serialize>(&self, method: Method, path: &str, value: &T) -> &Self {
        self.respond(method, path, Ok(ApiResponse::ok_json(value).unwrap()))
    }

    /// Every response is delayed by `latency` (virtual time under `start_paused`).
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    pub fn attempts(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    pub fn total_attempts(&self) -> usize {
        self.calls.lock().len()
    }

    fn next_outcome(&self, method: &Method, path: &str) -> Scripted {
        let mut scripts = self.scripts.lock();
        match scripts.get_mut(&(method.clone(), path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue.front().cloned().unwrap(),
            _ => Err(status_error(404, None)),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        self.calls.lock().push(request.clone());
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.next_outcome(&request.method, &request.path)
    }
}

pub fn status_error(status: u16, message: Option<&str>) -> HttpError {
    HttpError::Status {
        status: StatusCode::from_u16(status).unwrap(),
        body: message.map(|m| json!({ "message": m })),
    }
}

pub fn post(id: u64, title: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        body: format!("{title} body"),
    }
}

// --- Recording Sink ---

#[derive(Default)]
pub struct RecordingSink {
    shown: Mutex<Vec<(ToastLevel, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<(ToastLevel, String)> {
        self.shown.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.of(ToastLevel::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.of(ToastLevel::Success)
    }

    fn of(&self, level: ToastLevel) -> Vec<String> {
        self.shown
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn show(&self, level: ToastLevel, message: &str) {
        self.shown.lock().push((level, message.to_string()));
    }
}

// --- Counting Storage ---

/// MemoryStorage that counts reads per key.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    reads: Mutex<HashMap<String, usize>>,
    total_reads: AtomicUsize,
}

impl CountingStorage {
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStorage::with_entries(entries),
            ..Self::default()
        })
    }

    pub fn reads_of(&self, key: &str) -> usize {
        self.reads.lock().get(key).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.total_reads.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStorage {
    fn get(&self, key: &str) -> Option<String> {
        *self.reads.lock().entry(key.to_string()).or_default() += 1;
        self.total_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

// --- Pipeline Harness ---

/// The standard chain (credentials, busy, retry) over a scripted transport and
/// a recording sink.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub sink: Arc<RecordingSink>,
    pub busy: BusyTracker,
    pub store: CredentialStore,
    pub http: HttpClient,
    pub posts: PostService,
}

impl Harness {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        let storage: StorageState = Arc::new(MemoryStorage::with_entries(entries.iter().copied()));
        Self::with_storage(storage)
    }

    pub fn signed_in(role: &str) -> Self {
        Self::new(&[("access_token", "token-abc"), ("user_role", role)])
    }

    pub fn with_storage(storage: StorageState) -> Self {
        let transport = ScriptedTransport::new();
        let sink = RecordingSink::new();
        let busy = BusyTracker::new();
        let store = CredentialStore::new(storage);
        let notifier: NotifierState = sink.clone();

        let http = HttpClient::new(transport.clone())
            .with_interceptor(CredentialInterceptor::new(store.clone()))
            .with_interceptor(BusyInterceptor::new(busy.clone()))
            .with_interceptor(RetryInterceptor::new(RetryPolicy::default(), notifier));
        let posts = PostService::new(http.clone());

        Self {
            transport,
            sink,
            busy,
            store,
            http,
            posts,
        }
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(
            default_routes().expect("default routes are valid"),
            self.store.clone(),
            self.posts.clone(),
        )
    }
}
