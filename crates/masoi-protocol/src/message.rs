//! Messages that travel on the wire, and the envelope that carries them.

use serde::{Deserialize, Serialize};

use crate::{Faction, Phase, PlayerId, Role, RoomCode, RoomSnapshot};

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive a server message produced by the game core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    /// Every current member of the room.
    Room(RoomCode),
    /// Exactly one player. Secret information only ever travels this way.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Game actions a client can send.
///
/// Internally tagged: `{"type": "wolf_bite", "room_code": "K3QZ7A", "target_id": 4}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        #[serde(default)]
        player_name: String,
    },
    JoinRoom {
        room_code: RoomCode,
        #[serde(default)]
        player_name: String,
    },
    StartGame {
        room_code: RoomCode,
    },
    SendChat {
        room_code: RoomCode,
        message: String,
    },
    WolfBite {
        room_code: RoomCode,
        target_id: PlayerId,
    },
    GuardProtect {
        room_code: RoomCode,
        target_id: PlayerId,
    },
    SeerView {
        room_code: RoomCode,
        target_id: PlayerId,
    },
    /// Either half may be omitted: `save` defaults to `false`, a missing
    /// `poison_target_id` means the poison stays in the bottle.
    WitchAction {
        room_code: RoomCode,
        #[serde(default)]
        save: bool,
        #[serde(default)]
        poison_target_id: Option<PlayerId>,
    },
    SkipDiscuss {
        room_code: RoomCode,
    },
    /// A missing or null `target_id` is an abstention.
    DayVote {
        room_code: RoomCode,
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
}

impl ClientMessage {
    /// The room the action is addressed to. `None` only for `create_room`.
    pub fn room_code(&self) -> Option<&RoomCode> {
        match self {
            Self::CreateRoom { .. } => None,
            Self::JoinRoom { room_code, .. }
            | Self::StartGame { room_code }
            | Self::SendChat { room_code, .. }
            | Self::WolfBite { room_code, .. }
            | Self::GuardProtect { room_code, .. }
            | Self::SeerView { room_code, .. }
            | Self::WitchAction { room_code, .. }
            | Self::SkipDiscuss { room_code }
            | Self::DayVote { room_code, .. } => Some(room_code),
        }
    }

    /// Short wire name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::StartGame { .. } => "start_game",
            Self::SendChat { .. } => "send_chat",
            Self::WolfBite { .. } => "wolf_bite",
            Self::GuardProtect { .. } => "guard_protect",
            Self::SeerView { .. } => "seer_view",
            Self::WitchAction { .. } => "witch_action",
            Self::SkipDiscuss { .. } => "skip_discuss",
            Self::DayVote { .. } => "day_vote",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A player as shown inside prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
}

/// Step-specific request for input, unicast to the players whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Prompt {
    /// First night only: the wolves learn who their packmates are.
    WolfIntro { wolves: Vec<PlayerRef> },
    WolfBite { candidates: Vec<PlayerRef> },
    GuardProtect { candidates: Vec<PlayerRef> },
    SeerView { candidates: Vec<PlayerRef> },
    /// `victim` is the wolves' provisional target, if any.
    Witch {
        victim: Option<PlayerRef>,
        has_save: bool,
        has_poison: bool,
        candidates: Vec<PlayerRef>,
    },
}

/// What the seer learns about a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeerVerdict {
    #[serde(rename = "Sói")]
    Wolf,
    #[serde(rename = "Không phải Sói")]
    NotWolf,
}

impl SeerVerdict {
    pub fn of(role: Role) -> Self {
        if role == Role::Wolf { Self::Wolf } else { Self::NotWolf }
    }
}

/// Game messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated { room_code: RoomCode },
    RoomJoined { room_code: RoomCode },
    /// Membership changed while the room is waiting.
    RoomUpdate { room: RoomSnapshot },
    /// Anything visible changed once the game is running.
    PhaseChange { room: RoomSnapshot },
    GameStarted { room: RoomSnapshot },
    YourRole { role: Role, room: RoomSnapshot },
    PromptAction { prompt: Prompt },
    ActionConfirm { message: String },
    SeerResult { target_name: String, verdict: SeerVerdict },
    Chat { name: String, message: String },
    GameEnd { winner: Faction, detail: String },
    /// An explicit rejection (unknown room, full room, game already
    /// started, or a roster size outside the playable range).
    Error { message: String },
}

// ---------------------------------------------------------------------------
// System messages
// ---------------------------------------------------------------------------

/// One line of the public room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub code: RoomCode,
    pub phase: Phase,
    pub player_count: usize,
}

/// Connection-level plumbing, independent of any room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemMessage {
    /// Client → Server, first frame: protocol version check.
    Handshake { version: u32 },

    /// Server → Client: the identity the server will use for this connection.
    HandshakeAck { player_id: PlayerId, server_time: u64 },

    /// Either direction: "I'm leaving."
    Disconnect { reason: String },

    Heartbeat { client_time: u64 },

    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Client → Server: read-only listing of live rooms.
    ListRooms,

    RoomList { rooms: Vec<RoomListEntry> },

    /// Server → Client: a protocol-level failure, with an HTTP-style code.
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Either plumbing or a game message of type `T`.
///
/// Adjacently tagged: `{"type": "Game", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload<T> {
    System(SystemMessage),
    Game(T),
}

/// Every frame on the wire. Clients send `Envelope<ClientMessage>`, the
/// server answers with `Envelope<ServerMessage>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Per-direction sequence number.
    pub seq: u64,
    /// Milliseconds since the sender's connection started.
    pub timestamp: u64,
    pub payload: Payload<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NightStep, PlayerView};

    fn snapshot() -> RoomSnapshot {
        RoomSnapshot {
            code: RoomCode::new("ROOM01"),
            host_id: PlayerId(1),
            phase: Phase::Waiting,
            night_step: None,
            logs: vec![],
            players: vec![PlayerView { id: PlayerId(1), name: "An".into(), alive: true }],
        }
    }

    #[test]
    fn test_day_vote_without_target_is_abstention() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "day_vote", "room_code": "room01"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::DayVote { room_code: RoomCode::new("ROOM01"), target_id: None }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "day_vote", "room_code": "ROOM01", "target_id": null}"#)
                .unwrap();
        assert!(matches!(msg, ClientMessage::DayVote { target_id: None, .. }));
    }

    #[test]
    fn test_witch_action_halves_are_optional() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "witch_action", "room_code": "R", "poison_target_id": 9}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::WitchAction {
                room_code: RoomCode::new("R"),
                save: false,
                poison_target_id: Some(PlayerId(9)),
            }
        );
    }

    #[test]
    fn test_unknown_action_type_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type": "hunter_shot", "room_code": "R"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_room_code_accessor() {
        let create = ClientMessage::CreateRoom { player_name: "An".into() };
        assert_eq!(create.room_code(), None);
        let skip = ClientMessage::SkipDiscuss { room_code: RoomCode::new("abc") };
        assert_eq!(skip.room_code().map(RoomCode::as_str), Some("ABC"));
        assert_eq!(skip.kind(), "skip_discuss");
    }

    #[test]
    fn test_seer_result_verdict_strings() {
        let msg = ServerMessage::SeerResult {
            target_name: "Bình".into(),
            verdict: SeerVerdict::of(Role::Wolf),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "seer_result");
        assert_eq!(json["verdict"], "Sói");

        let not_wolf = serde_json::to_value(SeerVerdict::of(Role::Witch)).unwrap();
        assert_eq!(not_wolf, "Không phải Sói");
    }

    #[test]
    fn test_prompt_is_tagged_by_step() {
        let prompt = Prompt::Witch {
            victim: None,
            has_save: true,
            has_poison: false,
            candidates: vec![PlayerRef { id: PlayerId(2), name: "Cúc".into() }],
        };
        let json = serde_json::to_value(ServerMessage::PromptAction { prompt }).unwrap();
        assert_eq!(json["type"], "prompt_action");
        assert_eq!(json["prompt"]["step"], "witch");
        assert!(json["prompt"]["victim"].is_null());
        assert_eq!(json["prompt"]["has_save"], true);
    }

    #[test]
    fn test_your_role_carries_role_and_snapshot() {
        let msg = ServerMessage::YourRole { role: Role::Seer, room: snapshot() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "Seer");
        assert_eq!(json["room"]["code"], "ROOM01");
        assert_eq!(json["room"]["phase"], "waiting");
    }

    #[test]
    fn test_game_end_json_format() {
        let msg = ServerMessage::GameEnd {
            winner: Faction::Wolves,
            detail: "Sói áp đảo".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "game_end");
        assert_eq!(json["winner"], "wolves");
    }

    #[test]
    fn test_envelope_payload_is_adjacently_tagged() {
        let env: Envelope<ServerMessage> = Envelope {
            seq: 4,
            timestamp: 100,
            payload: Payload::Game(ServerMessage::PhaseChange {
                room: RoomSnapshot { night_step: Some(NightStep::Guard), ..snapshot() },
            }),
        };
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["payload"]["type"], "Game");
        assert_eq!(json["payload"]["data"]["type"], "phase_change");
        assert_eq!(json["payload"]["data"]["room"]["night_step"], "guard");
    }

    #[test]
    fn test_system_message_list_rooms_shape() {
        let msg = SystemMessage::RoomList {
            rooms: vec![RoomListEntry {
                code: RoomCode::new("ROOM01"),
                phase: Phase::Vote,
                player_count: 6,
            }],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "RoomList");
        assert_eq!(json["rooms"][0]["phase"], "vote");
        assert_eq!(json["rooms"][0]["player_count"], 6);
    }

    #[test]
    fn test_handshake_requires_version() {
        let result: Result<SystemMessage, _> = serde_json::from_str(r#"{"type": "Handshake"}"#);
        assert!(result.is_err());
    }
}
