//! Error types for the room layer.
//!
//! Two tiers. [`ValidationError`] covers every precondition an action can
//! fail; those are dropped without a reply. [`RoomError`] wraps them and
//! adds the handful of rejections a player is told about.

use masoi_protocol::{NightStep, Phase, PlayerId, Role, RoomCode};

/// A failed precondition. Never reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("room {0} does not exist")]
    UnknownRoom(RoomCode),

    #[error("player {0} is not in the room")]
    NotMember(PlayerId),

    #[error("action needs phase {expected}, room is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("action needs night step {expected}, room is at {actual:?}")]
    WrongStep {
        expected: NightStep,
        actual: Option<NightStep>,
    },

    #[error("player {0} is dead")]
    ActorDead(PlayerId),

    #[error("action needs role {required:?}, player holds {actual:?}")]
    WrongRole {
        required: Role,
        actual: Option<Role>,
    },

    #[error("target {0} is not an alive member of the room")]
    TargetNotAlive(PlayerId),

    #[error("player {0} is not the host")]
    NotHost(PlayerId),

    #[error("player {0} already sits in room {1}")]
    AlreadySeated(PlayerId, RoomCode),
}

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Join addressed a room code nobody is using.
    #[error("Phòng {0} không tồn tại")]
    NotFound(RoomCode),

    /// The roster is at its maximum.
    #[error("Phòng {0} đã đầy")]
    RoomFull(RoomCode),

    /// Join after the game left the waiting phase.
    #[error("Game ở phòng {0} đã bắt đầu")]
    AlreadyStarted(RoomCode),

    /// Start requested with a roster outside the playable range.
    #[error("Cần {min} đến {max} người để bắt đầu (hiện có {count})")]
    InvalidRosterSize { count: usize, min: usize, max: usize },

    /// Precondition failure, dropped silently.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl RoomError {
    /// Whether the actor gets an explicit `error` reply. Only the four
    /// rejections above do.
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}
