use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};

use crate::error::ApiError;

/// RequestCoalescer
///
/// Keyed in-flight de-duplication: while a request for a key is running,
/// every concurrent call with the same key waits on the same result instead
/// of issuing its own network call. The slot is removed once the request
/// resolves, so nothing is cached here; caching is a per-store decision.
pub struct RequestCoalescer<T: Clone> {
    in_flight: Mutex<HashMap<String, watch::Receiver<Option<Result<T, ApiError>>>>>,
}

impl<T: Clone> RequestCoalescer<T> {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `fetch` for `key`, or joins the in-flight run for the same key.
    /// Exactly one `fetch` executes per key at a time; all joiners receive a
    /// clone of its result, errors included.
    pub async fn run<F, Fut>(&self, key: &str, fetch: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut map = self.in_flight.lock().await;
        if let Some(rx) = map.get(key) {
            let mut rx = rx.clone();
            drop(map);
            tracing::debug!(key, "joining in-flight request");
            loop {
                if let Some(result) = rx.borrow().clone() {
                    return result;
                }
                if rx.changed().await.is_err() {
                    // The initiating caller was dropped before resolving.
                    return Err(ApiError::Network("coalesced request abandoned".to_string()));
                }
            }
        }

        let (tx, rx) = watch::channel(None);
        map.insert(key.to_string(), rx);
        drop(map);

        let result = fetch().await;
        let _ = tx.send(Some(result.clone()));
        self.in_flight.lock().await.remove(key);
        result
    }
}

impl<T: Clone> Default for RequestCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// CancelHandle
///
/// Cooperative cancellation for store loads. A consumer that goes away
/// cancels its handle; a load given a cancelled handle resolves without
/// touching store state, so stale responses never overwrite fresh ones.
/// The request itself is not aborted at the transport.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
