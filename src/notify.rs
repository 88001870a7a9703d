use serde::{Deserialize, Serialize};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::watch;
use ts_rs::TS;

/// ToastLevel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

/// Toast
///
/// One visible notification. `id` distinguishes two toasts carrying the same
/// text, so a stale dismissal timer never hides a newer toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
}

/// NotificationSink
///
/// Fire-and-forget sink for user-visible messages. The interceptor chain is the
/// only component allowed to report failures through it; pages use it for
/// success confirmations.
pub trait NotificationSink: Send + Sync {
    fn show(&self, level: ToastLevel, message: &str);

    fn show_success(&self, message: &str) {
        self.show(ToastLevel::Success, message);
    }

    fn show_error(&self, message: &str) {
        self.show(ToastLevel::Error, message);
    }

    fn show_info(&self, message: &str) {
        self.show(ToastLevel::Info, message);
    }
}

/// NotifierState
///
/// The concrete type used to share the sink across the pipeline and the pages.
pub type NotifierState = Arc<dyn NotificationSink>;

const INFO_DURATION: Duration = Duration::from_millis(3000);

/// ToastCenter
///
/// Holds at most one current toast, published through a watch channel for the
/// renderer. A newer toast replaces the current one. Each toast schedules its
/// own dismissal on the tokio runtime; outside a runtime the toast simply
/// stays until replaced or dismissed.
#[derive(Clone)]
pub struct ToastCenter {
    current: Arc<watch::Sender<Option<Toast>>>,
    next_id: Arc<AtomicU64>,
    duration: Duration,
}

impl ToastCenter {
    /// `duration` applies to success and error toasts; info toasts are shorter.
    pub fn new(duration: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            next_id: Arc::new(AtomicU64::new(1)),
            duration,
        }
    }

    pub fn current(&self) -> Option<Toast> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.current.subscribe()
    }

    /// Hides the toast with `id` if it is still the one on screen.
    pub fn dismiss(&self, id: u64) {
        self.current.send_if_modified(|current| match current {
            Some(toast) if toast.id == id => {
                *current = None;
                true
            }
            _ => false,
        });
    }

    fn lifetime(&self, level: ToastLevel) -> Duration {
        match level {
            ToastLevel::Success | ToastLevel::Error => self.duration,
            ToastLevel::Info => INFO_DURATION,
        }
    }
}

impl NotificationSink for ToastCenter {
    fn show(&self, level: ToastLevel, message: &str) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id, ?level, message, "showing toast");
        self.current.send_replace(Some(Toast {
            id,
            message: message.to_string(),
            level,
        }));

        let lifetime = self.lifetime(level);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let center = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(lifetime).await;
                    center.dismiss(id);
                });
            }
            Err(_) => tracing::debug!(id, "no runtime available, toast will not auto-dismiss"),
        }
    }
}
