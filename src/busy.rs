use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::watch;

/// BusyTracker
///
/// Counts in-flight requests and publishes `count > 0` as a "busy" signal for
/// the global loading indicator.
///
/// The counter is atomic so requests running on different runtime threads
/// never race. The published flag is recomputed from the counter inside the
/// watch channel's lock after every change, so the last writer always
/// publishes the value that matches the final count.
#[derive(Clone)]
pub struct BusyTracker {
    inner: Arc<Inner>,
}

struct Inner {
    in_flight: AtomicUsize,
    busy: watch::Sender<bool>,
}

impl Default for BusyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyTracker {
    pub fn new() -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                in_flight: AtomicUsize::new(0),
                busy,
            }),
        }
    }

    /// begin
    ///
    /// Registers one in-flight request. The returned guard decrements the
    /// counter when dropped, which covers success, failure, early return and a
    /// cancelled (dropped) future alike.
    #[must_use = "the request is counted only while the guard is alive"]
    pub fn begin(&self) -> BusyGuard {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        self.inner.publish();
        BusyGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        *self.inner.busy.borrow()
    }

    /// Subscribes to busy/idle transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.busy.subscribe()
    }
}

impl Inner {
    fn publish(&self) {
        self.busy.send_if_modified(|busy| {
            let now = self.in_flight.load(Ordering::SeqCst) > 0;
            let changed = *busy != now;
            *busy = now;
            changed
        });
    }
}

/// BusyGuard
///
/// Keeps one request counted for as long as it lives.
pub struct BusyGuard {
    inner: Arc<Inner>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.publish();
    }
}
