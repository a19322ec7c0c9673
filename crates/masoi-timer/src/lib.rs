//! Phase timeout scheduler.
//!
//! Every room has at most one pending timeout. Arming a new one always
//! cancels the previous one first, and each armed timeout carries a
//! [`TimerToken`]. When a timeout expires the scheduler does **not** run
//! game code: it delivers an [`Expired`] notice into the owning event loop,
//! which compares the token against the room's current one and ignores
//! anything stale.
//!
//! ```text
//! arm(room, token, 30s) ──sleep──→ Expired { key: room, token } ──→ event loop
//!         │
//!   cancel / re-arm aborts the sleeping task
//! ```
//!
//! # Implementations
//!
//! - [`TokioScheduler`]: one sleeping tokio task per key, aborted on cancel.
//! - [`ManualScheduler`]: records what is armed and lets the caller decide
//!   when it fires; used by the game tests.

mod manual;
mod tokio_scheduler;

pub use manual::{Armed, ManualScheduler};
pub use tokio_scheduler::TokioScheduler;

use std::fmt;
use std::time::Duration;

/// Generation token attached to one armed timeout.
///
/// Tokens are compared for equality only; the owner hands out a fresh one
/// every time it arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Notice that the timeout armed for `key` with `token` ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired<K> {
    pub key: K,
    pub token: TimerToken,
}

/// Owns at most one pending timeout per key.
pub trait Scheduler<K> {
    /// Arms a timeout for `key`, replacing (and cancelling) any pending one.
    fn arm(&mut self, key: K, token: TimerToken, after: Duration);

    /// Cancels the pending timeout for `key`, if any.
    fn cancel(&mut self, key: &K);

    /// Whether a timeout is currently pending for `key`.
    fn is_armed(&self, key: &K) -> bool;
}
