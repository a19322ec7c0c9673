//! Per-connection handler: handshake, then a read/write loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive Handshake → validate version → send HandshakeAck
//!   2. Register with the lobby and get an outbound channel
//!   3. Loop: frames from the client go to the lobby, events from the
//!      lobby go to the client, until close, error, or idle timeout
//!
//! The player's identity is the connection id; there is no login.

use std::sync::Arc;
use std::time::Instant;

use masoi_protocol::{
    ClientMessage, Codec, Envelope, Payload, PlayerId, ProtocolError, ServerMessage,
    SystemMessage,
};
use masoi_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::MasoiError;
use crate::lobby::LobbyHandle;
use crate::server::{PROTOCOL_VERSION, ServerState};

/// Removes the player from the lobby when the handler exits, whichever way
/// it exits.
struct SeatGuard {
    player_id: PlayerId,
    lobby: LobbyHandle,
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        // Only fails when the lobby itself is gone.
        let _ = self.lobby.disconnect(self.player_id);
    }
}

/// Outgoing sequence numbers and timestamps for one connection.
struct Outgoing {
    seq: u64,
    start: Instant,
}

impl Outgoing {
    fn new() -> Self {
        Self {
            seq: 0,
            start: Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn envelope(&mut self, payload: Payload<ServerMessage>) -> Envelope<ServerMessage> {
        let seq = self.seq;
        self.seq += 1;
        Envelope {
            seq,
            timestamp: self.elapsed_ms(),
            payload,
        }
    }

    async fn send<C: Codec>(
        &mut self,
        conn: &WebSocketConnection,
        codec: &C,
        payload: Payload<ServerMessage>,
    ) -> Result<(), MasoiError> {
        let envelope = self.envelope(payload);
        let bytes = codec.encode(&envelope)?;
        conn.send(&bytes).await?;
        Ok(())
    }

    async fn send_error<C: Codec>(
        &mut self,
        conn: &WebSocketConnection,
        codec: &C,
        code: u16,
        message: impl Into<String>,
    ) -> Result<(), MasoiError> {
        let payload = Payload::System(SystemMessage::Error {
            code,
            message: message.into(),
        });
        self.send(conn, codec, payload).await
    }
}

/// What the read loop does after handling one frame.
enum Flow {
    Continue,
    Close,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), MasoiError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let mut outgoing = Outgoing::new();

    // --- Step 1: Handshake ---
    let player_id = perform_handshake(&conn, &state, &mut outgoing).await?;
    tracing::info!(%conn_id, %player_id, "player connected");

    // --- Step 2: Register ---
    let (sender, mut events) = mpsc::unbounded_channel();
    state.lobby.connect(player_id, sender)?;
    let _guard = SeatGuard {
        player_id,
        lobby: state.lobby.clone(),
    };

    // --- Step 3: Read/write loop ---
    let idle_timeout = state.config.idle_timeout;
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                idle.as_mut().reset(tokio::time::Instant::now() + idle_timeout);

                match handle_frame(&conn, &state, player_id, &data, &mut outgoing).await? {
                    Flow::Continue => {}
                    Flow::Close => break,
                }
            }

            Some(event) = events.recv() => {
                outgoing.send(&conn, &state.codec, Payload::Game(event)).await?;
            }

            () = &mut idle => {
                tracing::info!(%player_id, "connection idle, closing");
                let bye = Payload::System(SystemMessage::Disconnect {
                    reason: "idle timeout".into(),
                });
                // Best effort: the peer may already be unreachable.
                let _ = outgoing.send(&conn, &state.codec, bye).await;
                let _ = conn.close().await;
                break;
            }
        }
    }

    // _guard drops here → the player leaves their room.
    Ok(())
}

/// Receives the Handshake, checks the version and answers with the
/// player's id.
async fn perform_handshake<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    outgoing: &mut Outgoing,
) -> Result<PlayerId, MasoiError> {
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(invalid("connection closed before handshake"));
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(invalid("handshake timed out")),
    };

    let envelope: Envelope<ClientMessage> = match state.codec.decode(&data) {
        Ok(envelope) => envelope,
        Err(e) => {
            outgoing.send_error(conn, &state.codec, 400, "expected Handshake").await?;
            return Err(e.into());
        }
    };

    let version = match envelope.payload {
        Payload::System(SystemMessage::Handshake { version }) => version,
        _ => {
            outgoing.send_error(conn, &state.codec, 400, "expected Handshake").await?;
            return Err(invalid("first message must be Handshake"));
        }
    };

    if version != PROTOCOL_VERSION {
        let message = format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}");
        outgoing.send_error(conn, &state.codec, 400, message).await?;
        return Err(invalid("protocol version mismatch"));
    }

    let player_id = PlayerId(conn.id().into_inner());
    let ack = Payload::System(SystemMessage::HandshakeAck {
        player_id,
        server_time: outgoing.elapsed_ms(),
    });
    outgoing.send(conn, &state.codec, ack).await?;

    Ok(player_id)
}

/// Decodes one frame and acts on it.
async fn handle_frame<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    player_id: PlayerId,
    data: &[u8],
    outgoing: &mut Outgoing,
) -> Result<Flow, MasoiError> {
    let envelope: Envelope<ClientMessage> = match state.codec.decode(data) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "failed to decode envelope");
            outgoing
                .send_error(conn, &state.codec, 400, format!("invalid message: {e}"))
                .await?;
            return Ok(Flow::Continue);
        }
    };

    match envelope.payload {
        Payload::Game(msg) => {
            tracing::trace!(%player_id, action = msg.kind(), "game message");
            state.lobby.action(player_id, msg)?;
        }

        Payload::System(SystemMessage::Heartbeat { client_time }) => {
            let ack = Payload::System(SystemMessage::HeartbeatAck {
                client_time,
                server_time: outgoing.elapsed_ms(),
            });
            outgoing.send(conn, &state.codec, ack).await?;
        }

        Payload::System(SystemMessage::ListRooms) => {
            let rooms = state.lobby.list_rooms().await?;
            let list = Payload::System(SystemMessage::RoomList { rooms });
            outgoing.send(conn, &state.codec, list).await?;
        }

        Payload::System(SystemMessage::Disconnect { reason }) => {
            tracing::info!(%player_id, %reason, "client disconnected");
            return Ok(Flow::Close);
        }

        Payload::System(SystemMessage::Handshake { .. }) => {
            outgoing
                .send_error(conn, &state.codec, 400, "already handshaken")
                .await?;
        }

        Payload::System(_) => {
            tracing::debug!(%player_id, "ignoring unexpected system message");
        }
    }

    Ok(Flow::Continue)
}

fn invalid(reason: &str) -> MasoiError {
    ProtocolError::InvalidMessage(reason.to_string()).into()
}
