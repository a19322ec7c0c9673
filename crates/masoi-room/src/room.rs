//! Room and player state.
//!
//! A [`Room`] is plain data. The machines in `night`, `day` and `registry`
//! mutate it; nothing here touches timers or the network.

use std::collections::HashMap;

use masoi_protocol::{
    NightStep, Phase, PlayerId, PlayerRef, PlayerView, Role, RoomCode, RoomListEntry,
    RoomSnapshot,
};
use masoi_timer::TimerToken;

/// Shown in narrative text for a player who has already left.
pub(crate) const UNKNOWN_NAME: &str = "(Ẩn)";

/// A seat in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    /// `None` until the game starts.
    pub role: Option<Role>,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            alive: true,
            role: None,
        }
    }

    pub fn to_ref(&self) -> PlayerRef {
        PlayerRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            alive: self.alive,
        }
    }
}

/// The witch's potions.
///
/// The two `*_remaining` flags live for the whole game and only ever go
/// from `true` to `false`. The other two fields describe tonight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitchState {
    pub save_used_tonight: bool,
    pub poison_target: Option<PlayerId>,
    pub save_remaining: bool,
    pub poison_remaining: bool,
}

impl Default for WitchState {
    fn default() -> Self {
        Self {
            save_used_tonight: false,
            poison_target: None,
            save_remaining: true,
            poison_remaining: true,
        }
    }
}

impl WitchState {
    /// Clears tonight's choices, keeping the charges.
    fn new_night(&mut self) {
        self.save_used_tonight = false;
        self.poison_target = None;
    }
}

/// What the night's actors chose so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightActions {
    /// Settled when wolf_bite ends.
    pub wolf_target: Option<PlayerId>,
    pub guard_target: Option<PlayerId>,
    pub seer_target: Option<PlayerId>,
    pub witch: WitchState,
}

impl NightActions {
    pub(crate) fn reset_for_night(&mut self) {
        self.wolf_target = None;
        self.guard_target = None;
        self.seer_target = None;
        self.witch.new_night();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightMeta {
    /// Set once the first night's wolf introduction has run.
    pub wolf_intro_shown: bool,
}

/// The timeout currently pending for a room, and where it was armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub token: TimerToken,
    pub phase: Phase,
    pub step: Option<NightStep>,
}

/// Timer bookkeeping for one room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSlot {
    /// Last generation handed out. Every arm takes the next one.
    pub generation: u64,
    pub armed: Option<ArmedTimer>,
}

impl TimerSlot {
    pub(crate) fn next_token(&mut self) -> TimerToken {
        self.generation += 1;
        TimerToken::new(self.generation)
    }
}

/// One game room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub code: RoomCode,
    pub host: PlayerId,
    /// Join order. Roles are dealt and votes tallied in this order.
    pub players: Vec<Player>,
    pub phase: Phase,
    /// Only `Some` while `phase` is night.
    pub night_step: Option<NightStep>,
    pub log: Vec<String>,
    /// Voter → target, `None` for an abstention.
    pub day_votes: HashMap<PlayerId, Option<PlayerId>>,
    /// Wolf → target.
    pub wolf_votes: HashMap<PlayerId, PlayerId>,
    pub night: NightActions,
    pub meta: NightMeta,
    pub timer: TimerSlot,
}

impl Room {
    pub fn new(code: RoomCode, host: Player) -> Self {
        Self {
            code,
            host: host.id,
            players: vec![host],
            phase: Phase::Waiting,
            night_step: None,
            log: Vec::new(),
            day_votes: HashMap::new(),
            wolf_votes: HashMap::new(),
            night: NightActions::default(),
            meta: NightMeta::default(),
            timer: TimerSlot::default(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn is_member(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(|p| p.alive)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    /// Alive holders of `role`, in join order.
    pub fn alive_with_role(&self, role: Role) -> impl Iterator<Item = &Player> {
        self.alive().filter(move |p| p.role == Some(role))
    }

    pub fn has_alive(&self, role: Role) -> bool {
        self.alive_with_role(role).next().is_some()
    }

    /// Roles of the alive players, for the win check.
    pub fn alive_roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.alive().filter_map(|p| p.role)
    }

    /// Alive players as prompt candidates.
    pub fn candidates(&self) -> Vec<PlayerRef> {
        self.alive().map(Player::to_ref).collect()
    }

    pub fn name_of(&self, id: PlayerId) -> &str {
        self.player(id).map_or(UNKNOWN_NAME, |p| p.name.as_str())
    }

    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Public snapshot with the last `log_window` log lines.
    pub fn snapshot(&self, log_window: usize) -> RoomSnapshot {
        let skip = self.log.len().saturating_sub(log_window);
        RoomSnapshot {
            code: self.code.clone(),
            host_id: self.host,
            phase: self.phase,
            night_step: self.night_step,
            logs: self.log[skip..].to_vec(),
            players: self.players.iter().map(Player::view).collect(),
        }
    }

    pub fn list_entry(&self) -> RoomListEntry {
        RoomListEntry {
            code: self.code.clone(),
            phase: self.phase,
            player_count: self.players.len(),
        }
    }
}
