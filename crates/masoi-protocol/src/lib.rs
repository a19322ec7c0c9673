//! Wire protocol for the Ma Sói server.
//!
//! - **Types**: identities ([`PlayerId`], [`RoomCode`]), the game's closed
//!   vocabularies ([`Phase`], [`NightStep`], [`Role`]), and every message
//!   that crosses the wire ([`ClientMessage`], [`ServerMessage`],
//!   [`SystemMessage`], wrapped in an [`Envelope`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Lobby (rooms, game rules)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{
    ClientMessage, Envelope, Payload, PlayerRef, Prompt, Recipient, RoomListEntry, SeerVerdict,
    ServerMessage, SystemMessage,
};
pub use types::{Faction, NightStep, Phase, PlayerId, PlayerView, Role, RoomCode, RoomSnapshot};
