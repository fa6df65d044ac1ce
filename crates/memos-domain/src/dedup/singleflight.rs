//! Singleflight registry collapsing concurrent requests for the same key.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::debug;

/// Outcome broadcast to every caller joined to one request.
#[derive(Debug, Clone)]
enum Settlement<T, E> {
    Completed(Result<T, E>),
    /// The producer panicked; carries the panic message.
    Panicked(String),
}

type Registry<T, E> = DashMap<String, broadcast::Sender<Settlement<T, E>>>;

/// Result of trying to acquire a slot for a key.
enum FlightSlot<T, E> {
    /// No request was pending: the caller starts one.
    /// The receiver is subscribed before the request is spawned.
    Leader(
        broadcast::Sender<Settlement<T, E>>,
        broadcast::Receiver<Settlement<T, E>>,
    ),
    /// A request is already pending: wait for its outcome.
    Follower(broadcast::Receiver<Settlement<T, E>>),
}

/// Collapses concurrent requests for the same key into one execution.
///
/// The first caller for a key invokes its producer; callers arriving while
/// that request is pending join it instead of invoking their own. When the
/// request settles its entry is removed from the registry, then the outcome
/// is delivered to every joined caller. Failures are passed through
/// unchanged and never cached, so the next call retries.
///
/// The producer runs on its own Tokio task. A caller that stops waiting
/// does not cancel it, and the callers still joined receive its outcome.
/// Callers needing a deadline wrap `execute` in `tokio::time::timeout`.
///
/// # Example
///
/// ```rust,ignore
/// let dedup: RequestDeduplicator<Vec<String>, MyError> = RequestDeduplicator::new();
///
/// let (a, b) = tokio::join!(
///     dedup.execute("fetchUsers", || async { list_users().await }),
///     dedup.execute("fetchUsers", || async { list_users().await }),
/// );
/// // list_users() ran once; a and b hold the same result.
/// ```
pub struct RequestDeduplicator<T, E> {
    /// Pending requests keyed by request key.
    in_flight: Arc<Registry<T, E>>,
}

impl<T, E> RequestDeduplicator<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Executes `producer` for `key` unless a request for `key` is already
    /// pending, in which case the pending request's outcome is returned.
    ///
    /// Keys are compared by exact value. Build them with
    /// [`RequestKey`](super::RequestKey) so equal requests get equal keys.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime. If the producer panics, every
    /// caller joined to that request panics with the same message.
    pub async fn execute<K, F, Fut>(&self, key: K, producer: F) -> Result<T, E>
    where
        K: Into<String>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let key = key.into();
        let mut producer = Some(producer);

        loop {
            let mut receiver = match self.acquire(&key) {
                FlightSlot::Follower(receiver) => {
                    debug!(key = %key, "joining in-flight request");
                    receiver
                }
                FlightSlot::Leader(sender, receiver) => {
                    if let Some(producer) = producer.take() {
                        self.launch(key.clone(), sender, producer);
                    }
                    receiver
                }
            };

            match receiver.recv().await {
                Ok(Settlement::Completed(result)) => return result,
                Ok(Settlement::Panicked(message)) => {
                    panic!("request `{key}` panicked: {message}")
                }
                // The request task was dropped without settling (runtime
                // shutdown). A follower still owns its producer and retries.
                Err(_) if producer.is_some() => {
                    debug!(key = %key, "in-flight request vanished, retrying");
                }
                Err(_) => panic!("request `{key}` was dropped before it settled"),
            }
        }
    }

    /// Returns true if a request for `key` is pending.
    pub fn is_pending(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Number of pending requests.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Atomically either joins the pending request for `key` or registers
    /// a new one.
    ///
    /// Uses DashMap's entry API so check-and-insert happens under one shard
    /// lock. Followers subscribe under the same lock, so they cannot miss an
    /// outcome: settlement has to take that lock to remove the entry first.
    fn acquire(&self, key: &str) -> FlightSlot<T, E> {
        match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(entry) => FlightSlot::Follower(entry.get().subscribe()),
            Entry::Vacant(entry) => {
                let (sender, receiver) = broadcast::channel(1);
                entry.insert(sender.clone());
                FlightSlot::Leader(sender, receiver)
            }
        }
    }

    /// Spawns the request. The registry entry is removed before the outcome
    /// is broadcast.
    fn launch<F, Fut>(&self, key: String, sender: broadcast::Sender<Settlement<T, E>>, producer: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        debug!(key = %key, "starting request");
        let guard = FlightGuard::new(Arc::clone(&self.in_flight), key);

        tokio::spawn(async move {
            // The producer is called inside the caught future so a panic
            // before it yields a future is caught too.
            let settlement = match AssertUnwindSafe(async move { producer().await })
                .catch_unwind()
                .await
            {
                Ok(result) => Settlement::Completed(result),
                Err(payload) => Settlement::Panicked(panic_message(payload.as_ref())),
            };

            guard.complete();

            // No receivers left is fine: every caller may have stopped waiting.
            let _ = sender.send(settlement);
        });
    }
}

impl<T, E> Default for RequestDeduplicator<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that removes a registry entry exactly once.
///
/// Runs on the normal path via [`complete`](Self::complete), and on drop if
/// the request task is torn down before settling.
struct FlightGuard<T, E> {
    registry: Arc<Registry<T, E>>,
    key: String,
    completed: bool,
}

impl<T, E> FlightGuard<T, E> {
    fn new(registry: Arc<Registry<T, E>>, key: String) -> Self {
        Self {
            registry,
            key,
            completed: false,
        }
    }

    /// Mark as settled and clean up.
    fn complete(mut self) {
        self.registry.remove(&self.key);
        self.completed = true;
        debug!(key = %self.key, "request settled");
    }
}

impl<T, E> Drop for FlightGuard<T, E> {
    fn drop(&mut self) {
        if !self.completed {
            self.registry.remove(&self.key);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
