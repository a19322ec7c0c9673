//! Scheduler backed by tokio sleeps.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::trace;

use crate::{Expired, Scheduler, TimerToken};

struct Pending {
    token: TimerToken,
    task: JoinHandle<()>,
}

/// Spawns one sleeping task per armed key. On expiry the task sends
/// `E::from(Expired { .. })` into `notify` and exits; it never touches game
/// state itself.
///
/// Must be used from inside a tokio runtime.
pub struct TokioScheduler<K, E> {
    pending: HashMap<K, Pending>,
    notify: mpsc::UnboundedSender<E>,
}

impl<K, E> TokioScheduler<K, E>
where
    K: Eq + Hash + Clone + Send + 'static,
    E: From<Expired<K>> + Send + 'static,
{
    pub fn new(notify: mpsc::UnboundedSender<E>) -> Self {
        Self {
            pending: HashMap::new(),
            notify,
        }
    }

    /// Number of keys with a pending timeout.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Token of the pending timeout for `key`.
    pub fn pending_token(&self, key: &K) -> Option<TimerToken> {
        self.pending.get(key).map(|p| p.token)
    }
}

impl<K, E> Scheduler<K> for TokioScheduler<K, E>
where
    K: Eq + Hash + Clone + Send + 'static,
    E: From<Expired<K>> + Send + 'static,
{
    fn arm(&mut self, key: K, token: TimerToken, after: Duration) {
        self.cancel(&key);

        let deadline = Instant::now() + after;
        let notify = self.notify.clone();
        let expired_key = key.clone();
        let task = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            // The receiver is gone only when the event loop shut down.
            let _ = notify.send(E::from(Expired { key: expired_key, token }));
        });

        trace!(%token, after_ms = after.as_millis() as u64, "timeout armed");
        self.pending.insert(key, Pending { token, task });
    }

    fn cancel(&mut self, key: &K) {
        if let Some(pending) = self.pending.remove(key) {
            pending.task.abort();
            trace!(token = %pending.token, "timeout cancelled");
        }
    }

    fn is_armed(&self, key: &K) -> bool {
        self.pending.get(key).is_some_and(|p| !p.task.is_finished())
    }
}

impl<K, E> Drop for TokioScheduler<K, E> {
    fn drop(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.task.abort();
        }
    }
}
