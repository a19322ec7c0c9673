//! The Ma Sói game core.
//!
//! Everything that decides the game lives here and nothing here does I/O:
//!
//! - **Roles** ([`roles`]): the deck for each roster size, shuffled.
//! - **Validation** ([`validate`]): phase, step, role, alive and target
//!   checks for every inbound action.
//! - **Night / day machines**: the step sequence, prompts, resolution and
//!   the win check ([`outcome`]).
//! - **Registry** ([`RoomRegistry`]): the room table and the single entry
//!   point for actions, departures and timeouts.
//!
//! ```text
//! action ──→ validate ──→ mutate room ──→ next step ──→ arm timeout
//!                                              │
//!                                              └──→ Outbox (snapshots, prompts)
//! ```
//!
//! Timeouts are armed through a [`masoi_timer::Scheduler`] and come back
//! as a `(room code, token)` pair; a token that no longer matches the
//! room's pending timeout is ignored.

mod config;
mod day;
mod director;
mod error;
mod night;
mod outbox;
pub mod outcome;
mod registry;
pub mod roles;
mod room;
mod tally;
pub mod validate;

pub use config::{GameConfig, PhaseDurations};
pub use error::{RoomError, ValidationError};
pub use outbox::Outbox;
pub use registry::RoomRegistry;
pub use room::{ArmedTimer, NightActions, NightMeta, Player, Room, TimerSlot, WitchState};
pub use tally::{Tally, TieRule};
