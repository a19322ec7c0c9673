//! Scheduler that never fires on its own.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::{Scheduler, TimerToken};

/// A timeout recorded by [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Armed {
    pub token: TimerToken,
    pub after: Duration,
}

/// Records armed timeouts without a clock.
///
/// The caller reads what is pending with [`armed`](Self::armed) and
/// "fires" it by handing the token back to whoever owns the timeout.
/// Cancelled and replaced timeouts are counted so tests can assert the
/// cancel-before-rearm discipline.
#[derive(Debug, Clone)]
pub struct ManualScheduler<K> {
    armed: HashMap<K, Armed>,
    arm_count: usize,
    cancel_count: usize,
}

impl<K: Eq + Hash> ManualScheduler<K> {
    pub fn new() -> Self {
        Self {
            armed: HashMap::new(),
            arm_count: 0,
            cancel_count: 0,
        }
    }

    /// The pending timeout for `key`.
    pub fn armed(&self, key: &K) -> Option<Armed> {
        self.armed.get(key).copied()
    }

    /// Removes and returns the pending timeout for `key`, as if it had
    /// just expired.
    pub fn take(&mut self, key: &K) -> Option<Armed> {
        self.armed.remove(key)
    }

    /// Total number of `arm` calls.
    pub fn arm_count(&self) -> usize {
        self.arm_count
    }

    /// Number of pending timeouts that were cancelled or replaced.
    pub fn cancel_count(&self) -> usize {
        self.cancel_count
    }

    pub fn pending_count(&self) -> usize {
        self.armed.len()
    }
}

impl<K: Eq + Hash> Default for ManualScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Scheduler<K> for ManualScheduler<K> {
    fn arm(&mut self, key: K, token: TimerToken, after: Duration) {
        self.arm_count += 1;
        if self.armed.insert(key, Armed { token, after }).is_some() {
            self.cancel_count += 1;
        }
    }

    fn cancel(&mut self, key: &K) {
        if self.armed.remove(key).is_some() {
            self.cancel_count += 1;
        }
    }

    fn is_armed(&self, key: &K) -> bool {
        self.armed.contains_key(key)
    }
}
