//! Messages produced by one call into the game core.

use masoi_protocol::{PlayerId, Recipient, RoomCode, ServerMessage};

/// Ordered list of addressed server messages.
///
/// The core never sends anything itself. Every operation returns an
/// `Outbox` and the caller delivers it in order, expanding
/// [`Recipient::Room`] to the room's members at delivery time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox {
    messages: Vec<(Recipient, ServerMessage)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcast(&mut self, code: &RoomCode, msg: ServerMessage) {
        self.messages.push((Recipient::Room(code.clone()), msg));
    }

    pub fn unicast(&mut self, player: PlayerId, msg: ServerMessage) {
        self.messages.push((Recipient::Player(player), msg));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Recipient, ServerMessage)> {
        self.messages.iter()
    }

    /// Messages addressed to exactly this player (not via a room broadcast).
    pub fn to_player(&self, player: PlayerId) -> impl Iterator<Item = &ServerMessage> {
        self.messages.iter().filter_map(move |(to, msg)| match to {
            Recipient::Player(id) if *id == player => Some(msg),
            _ => None,
        })
    }

    /// Messages broadcast to the given room.
    pub fn to_room<'a>(&'a self, code: &'a RoomCode) -> impl Iterator<Item = &'a ServerMessage> {
        self.messages.iter().filter_map(move |(to, msg)| match to {
            Recipient::Room(c) if c == code => Some(msg),
            _ => None,
        })
    }
}

impl IntoIterator for Outbox {
    type Item = (Recipient, ServerMessage);
    type IntoIter = std::vec::IntoIter<(Recipient, ServerMessage)>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}
