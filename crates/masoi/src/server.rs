//! `MasoiServer` builder and accept loop.
//!
//! This is the entry point for running a Ma Sói server. It ties the layers
//! together: transport → protocol → lobby → rooms.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use masoi_protocol::{Codec, JsonCodec};
use masoi_room::GameConfig;
use masoi_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::lobby::LobbyHandle;
use crate::{MasoiError, ServerConfig};

/// The current protocol version. Clients must send this in their
/// handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) lobby: LobbyHandle,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// use masoi::prelude::*;
///
/// # async fn run() -> Result<(), MasoiError> {
/// let server = MasoiServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct MasoiServerBuilder {
    config: ServerConfig,
}

impl MasoiServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces every setting at once, e.g. with [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Sets the game rules shared by every room.
    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    /// Binds the listener and starts the lobby.
    ///
    /// Uses `JsonCodec` over `WebSocketTransport`, which is what browser
    /// clients speak.
    pub async fn build(self) -> Result<MasoiServer<JsonCodec>, MasoiError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let lobby = LobbyHandle::spawn(self.config.game.clone());

        let state = Arc::new(ServerState {
            lobby,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(MasoiServer { transport, state })
    }
}

impl Default for MasoiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server. Call [`run()`](Self::run) to start accepting connections.
pub struct MasoiServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl MasoiServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> MasoiServerBuilder {
        MasoiServerBuilder::new()
    }
}

impl<C: Codec> MasoiServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, MasoiError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop, spawning a handler task per connection. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), MasoiError> {
        tracing::info!(addr = %self.local_addr()?, "Ma Sói server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
