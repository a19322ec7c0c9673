//! # Ma Sói
//!
//! Server-authoritative Ma Sói (werewolf) game server.
//!
//! Players connect over WebSocket, shake hands, and then create or join a
//! room by its six-character code. Once the host starts the game the
//! server runs the whole night/day cycle itself: it deals secret roles,
//! prompts only the players whose turn it is, resolves the night and the
//! vote, and announces the winner.
//!
//! ```text
//! WebSocket ─→ handler (per connection) ─→ lobby task ─→ RoomRegistry
//!     ↑                                        │
//!     └──────────── per-player channel ←───────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use masoi::prelude::*;
//!
//! # async fn run() -> Result<(), MasoiError> {
//! let server = MasoiServer::builder()
//!     .config(ServerConfig::from_env())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod lobby;
mod server;

pub use config::{DEFAULT_BIND, ServerConfig};
pub use error::MasoiError;
pub use lobby::{LobbyHandle, PlayerSender};
pub use server::{MasoiServer, MasoiServerBuilder, PROTOCOL_VERSION};

/// Everything needed to run a server and talk to it.
pub mod prelude {
    pub use crate::{MasoiError, MasoiServer, MasoiServerBuilder, PROTOCOL_VERSION, ServerConfig};
    pub use masoi_protocol::{
        ClientMessage, Envelope, Faction, NightStep, Payload, Phase, PlayerId, Prompt, Role,
        RoomCode, RoomSnapshot, SeerVerdict, ServerMessage, SystemMessage,
    };
    pub use masoi_room::{GameConfig, PhaseDurations, RoomError, TieRule};
}
