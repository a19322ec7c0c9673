//! The lobby: one task that owns every room.
//!
//! Connection handlers never touch game state. They send [`LobbyCommand`]s
//! into a single channel; the lobby task applies them one at a time to the
//! [`RoomRegistry`] and routes the resulting [`Outbox`] to the players'
//! outbound channels. Timeouts arrive through the same channel, so a
//! timeout and an action can never interleave inside a handler.
//!
//! ```text
//! handler ──Action──┐
//! handler ──Leave───┼──→ lobby task ──→ RoomRegistry ──→ Outbox ──→ per-player channels
//! timer ───Timeout──┘
//! ```

use std::collections::HashMap;

use masoi_protocol::{ClientMessage, PlayerId, Recipient, RoomCode, RoomListEntry, ServerMessage};
use masoi_room::{GameConfig, Outbox, RoomRegistry};
use masoi_timer::{Expired, TokioScheduler};
use tokio::sync::{mpsc, oneshot};

use crate::MasoiError;

/// Channel sender for delivering server messages to one player.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands the lobby task processes, in arrival order.
pub(crate) enum LobbyCommand {
    /// A handshaken connection, with the channel its events go to.
    Connected {
        player_id: PlayerId,
        sender: PlayerSender,
    },

    /// The connection is gone; the player leaves their room.
    Disconnected { player_id: PlayerId },

    /// A game action from a player.
    Action {
        player_id: PlayerId,
        msg: ClientMessage,
    },

    /// Read-only listing for the status endpoint.
    ListRooms {
        reply: oneshot::Sender<Vec<RoomListEntry>>,
    },

    /// A phase timeout ran out.
    Timeout(Expired<RoomCode>),
}

impl From<Expired<RoomCode>> for LobbyCommand {
    fn from(expired: Expired<RoomCode>) -> Self {
        Self::Timeout(expired)
    }
}

/// Handle to the running lobby. Cheap to clone.
#[derive(Clone)]
pub struct LobbyHandle {
    sender: mpsc::UnboundedSender<LobbyCommand>,
}

impl LobbyHandle {
    /// Starts the lobby task. Must be called inside a tokio runtime.
    pub fn spawn(config: GameConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let timers = TokioScheduler::new(sender.clone());
        let lobby = Lobby {
            registry: RoomRegistry::new(config, timers),
            senders: HashMap::new(),
            receiver,
        };
        tokio::spawn(lobby.run());
        Self { sender }
    }

    pub fn connect(&self, player_id: PlayerId, sender: PlayerSender) -> Result<(), MasoiError> {
        self.send(LobbyCommand::Connected { player_id, sender })
    }

    pub fn disconnect(&self, player_id: PlayerId) -> Result<(), MasoiError> {
        self.send(LobbyCommand::Disconnected { player_id })
    }

    /// Submits a game action (fire-and-forget; replies arrive on the
    /// player's channel).
    pub fn action(&self, player_id: PlayerId, msg: ClientMessage) -> Result<(), MasoiError> {
        self.send(LobbyCommand::Action { player_id, msg })
    }

    /// `{code, phase, player_count}` for every live room.
    pub async fn list_rooms(&self) -> Result<Vec<RoomListEntry>, MasoiError> {
        let (reply, rx) = oneshot::channel();
        self.send(LobbyCommand::ListRooms { reply })?;
        rx.await.map_err(|_| MasoiError::LobbyClosed)
    }

    fn send(&self, cmd: LobbyCommand) -> Result<(), MasoiError> {
        self.sender.send(cmd).map_err(|_| MasoiError::LobbyClosed)
    }
}

struct Lobby {
    registry: RoomRegistry<TokioScheduler<RoomCode, LobbyCommand>>,
    /// Outbound channel of every handshaken player.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::UnboundedReceiver<LobbyCommand>,
}

impl Lobby {
    async fn run(mut self) {
        tracing::info!("lobby started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Connected { player_id, sender } => {
                    self.senders.insert(player_id, sender);
                }
                LobbyCommand::Disconnected { player_id } => {
                    self.senders.remove(&player_id);
                    let out = self.registry.leave(player_id);
                    self.deliver(out);
                }
                LobbyCommand::Action { player_id, msg } => self.handle_action(player_id, msg),
                LobbyCommand::ListRooms { reply } => {
                    let _ = reply.send(self.registry.list_rooms());
                }
                LobbyCommand::Timeout(Expired { key, token }) => {
                    let out = self.registry.fire_timer(&key, token);
                    self.deliver(out);
                }
            }
        }

        tracing::info!("lobby stopped");
    }

    fn handle_action(&mut self, player_id: PlayerId, msg: ClientMessage) {
        let kind = msg.kind();
        match self.registry.handle(player_id, msg) {
            Ok(out) => self.deliver(out),
            Err(e) if e.is_surfaced() => {
                tracing::debug!(%player_id, action = kind, error = %e, "action rejected");
                self.send_to(
                    player_id,
                    ServerMessage::Error {
                        message: e.to_string(),
                    },
                );
            }
            Err(e) => {
                tracing::debug!(%player_id, action = kind, error = %e, "action dropped");
            }
        }
    }

    /// Sends every message in order. Room broadcasts go to whoever is a
    /// member right now.
    fn deliver(&self, out: Outbox) {
        for (recipient, msg) in out {
            match recipient {
                Recipient::Player(player_id) => self.send_to(player_id, msg),
                Recipient::Room(code) => {
                    for player_id in self.registry.members(&code) {
                        self.send_to(player_id, msg.clone());
                    }
                }
            }
        }
    }

    fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        match self.senders.get(&player_id) {
            Some(sender) => {
                if sender.send(msg).is_err() {
                    tracing::warn!(%player_id, "message for a closed connection");
                }
            }
            None => tracing::warn!(%player_id, "message for an unknown connection"),
        }
    }
}
