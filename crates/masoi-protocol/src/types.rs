//! Identity types and the game's closed vocabularies.
//!
//! Phases, night steps and roles are enums rather than strings so that an
//! impossible state ("nightStep = seer while phase = vote") cannot be
//! spelled, and every `match` over them is exhaustive.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's identity, derived from the connection that carries them.
///
/// Serialized as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short code players type to join a room, e.g. `"K3QZ7A"`.
///
/// Codes are case-insensitive: every constructor upper-cases and trims its
/// input, including deserialization, so `"k3qz7a "` and `"K3QZ7A"` name the
/// same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Phase / NightStep
// ---------------------------------------------------------------------------

/// The room's coarse phase.
///
/// ```text
/// waiting → night → discuss → vote → night → … → end
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Night,
    Discuss,
    Vote,
    End,
}

impl Phase {
    /// `true` between the start of the first night and the end of the game.
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::Night | Self::Discuss | Self::Vote)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::Night => "night",
            Self::Discuss => "discuss",
            Self::Vote => "vote",
            Self::End => "end",
        };
        f.write_str(name)
    }
}

/// Sub-phase of the night, deciding whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightStep {
    WolfIntro,
    WolfBite,
    Guard,
    Seer,
    Witch,
    Resolve,
}

impl fmt::Display for NightStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WolfIntro => "wolf_intro",
            Self::WolfBite => "wolf_bite",
            Self::Guard => "guard",
            Self::Seer => "seer",
            Self::Witch => "witch",
            Self::Resolve => "resolve",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Roles and factions
// ---------------------------------------------------------------------------

/// A secret role, dealt once when the game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Wolf,
    Seer,
    Guard,
    Witch,
    Villager,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Wolf, Role::Seer, Role::Guard, Role::Witch, Role::Villager];

    /// The in-game (Vietnamese) name used in narrative text.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Wolf => "Sói",
            Self::Seer => "Tiên tri",
            Self::Guard => "Bảo vệ",
            Self::Witch => "Phù thủy",
            Self::Villager => "Dân làng",
        }
    }

    pub fn faction(self) -> Faction {
        match self {
            Self::Wolf => Faction::Wolves,
            Self::Seer | Self::Guard | Self::Witch | Self::Villager => Faction::Villagers,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The two sides that can win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Villagers,
    Wolves,
}

impl Faction {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Villagers => "Dân làng",
            Self::Wolves => "Sói",
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Public view of one player. Never carries the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
}

/// Public view of a room, broadcast on every visible change.
///
/// `logs` holds only the most recent lines (the server's log window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub phase: Phase,
    pub night_step: Option<NightStep>,
    pub logs: Vec<String>,
    pub players: Vec<PlayerView>,
}
