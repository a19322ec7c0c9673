//! Unified error type for the server.

use masoi_protocol::ProtocolError;
use masoi_room::RoomError;
use masoi_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` conversions let `?` lift transport, codec and room errors
/// out of the connection handler without manual mapping.
#[derive(Debug, thiserror::Error)]
pub enum MasoiError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad handshake).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level rejection.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The lobby task is gone; only happens during shutdown.
    #[error("lobby is not running")]
    LobbyClosed,
}

#[cfg(test)]
mod tests {
    use masoi_protocol::RoomCode;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: MasoiError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, MasoiError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: MasoiError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, MasoiError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error_keeps_the_player_facing_message() {
        let err: MasoiError = RoomError::RoomFull(RoomCode::new("ABCDEF")).into();
        assert!(matches!(err, MasoiError::Room(_)));
        assert_eq!(err.to_string(), "Phòng ABCDEF đã đầy");
    }
}
