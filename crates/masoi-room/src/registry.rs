//! The room table and the entry points into the game.
//!
//! [`RoomRegistry`] owns every live room, the player → room index, the
//! scheduler and the RNG. All operations are synchronous and return an
//! [`Outbox`] describing what to send; the caller owns the event loop and
//! feeds timeouts back through [`fire_timer`](RoomRegistry::fire_timer).

use std::collections::HashMap;

use masoi_protocol::{
    ClientMessage, NightStep, Phase, PlayerId, Role, RoomCode, RoomListEntry, ServerMessage,
};
use masoi_timer::{Scheduler, TimerToken};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::director::Director;
use crate::room::{Player, Room};
use crate::{GameConfig, Outbox, RoomError, ValidationError, roles, validate};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

/// Owns all rooms of one server.
pub struct RoomRegistry<S> {
    rooms: HashMap<RoomCode, Room>,
    /// Which room each seated player is in.
    seats: HashMap<PlayerId, RoomCode>,
    config: GameConfig,
    timers: S,
    rng: StdRng,
}

impl<S: Scheduler<RoomCode>> RoomRegistry<S> {
    pub fn new(config: GameConfig, timers: S) -> Self {
        Self::with_rng(config, timers, StdRng::from_os_rng())
    }

    /// A registry whose room codes and role deals are reproducible.
    pub fn with_seed(config: GameConfig, timers: S, seed: u64) -> Self {
        Self::with_rng(config, timers, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, timers: S, rng: StdRng) -> Self {
        Self {
            rooms: HashMap::new(),
            seats: HashMap::new(),
            config,
            timers,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn timers(&self) -> &S {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut S {
        &mut self.timers
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The room `player` is seated in.
    pub fn room_of(&self, player: PlayerId) -> Option<&RoomCode> {
        self.seats.get(&player)
    }

    /// Current members of `code`, empty if the room is gone.
    pub fn members(&self, code: &RoomCode) -> Vec<PlayerId> {
        self.rooms.get(code).map(Room::member_ids).unwrap_or_default()
    }

    /// `{code, phase, player_count}` for every live room, sorted by code.
    pub fn list_rooms(&self) -> Vec<RoomListEntry> {
        let mut entries: Vec<_> = self.rooms.values().map(Room::list_entry).collect();
        entries.sort_by(|a, b| a.code.cmp(&b.code));
        entries
    }

    /// Dispatches one client action.
    pub fn handle(&mut self, player: PlayerId, msg: ClientMessage) -> Result<Outbox, RoomError> {
        match msg {
            ClientMessage::CreateRoom { player_name } => self.create_room(player, &player_name),
            ClientMessage::JoinRoom {
                room_code,
                player_name,
            } => self.join_room(player, &room_code, &player_name),
            ClientMessage::StartGame { room_code } => self.start_game(player, &room_code),
            ClientMessage::SendChat { room_code, message } => {
                self.send_chat(player, &room_code, &message)
            }
            ClientMessage::WolfBite {
                room_code,
                target_id,
            } => self.wolf_bite(player, &room_code, target_id),
            ClientMessage::GuardProtect {
                room_code,
                target_id,
            } => self.guard_protect(player, &room_code, target_id),
            ClientMessage::SeerView {
                room_code,
                target_id,
            } => self.seer_view(player, &room_code, target_id),
            ClientMessage::WitchAction {
                room_code,
                save,
                poison_target_id,
            } => self.witch_action(player, &room_code, save, poison_target_id),
            ClientMessage::SkipDiscuss { room_code } => self.skip_discuss(player, &room_code),
            ClientMessage::DayVote {
                room_code,
                target_id,
            } => self.day_vote(player, &room_code, target_id),
        }
    }

    // -- lifecycle ------------------------------------------------------------

    pub fn create_room(&mut self, player: PlayerId, name: &str) -> Result<Outbox, RoomError> {
        self.ensure_unseated(player)?;

        let code = self.fresh_code();
        let host = Player::new(player, self.config.display_name(name));
        let room = Room::new(code.clone(), host);

        let mut out = Outbox::new();
        out.unicast(player, ServerMessage::RoomCreated { room_code: code.clone() });
        out.broadcast(
            &code,
            ServerMessage::RoomUpdate {
                room: room.snapshot(self.config.log_window),
            },
        );

        self.rooms.insert(code.clone(), room);
        self.seats.insert(player, code.clone());
        tracing::info!(room_code = %code, player_id = %player, "room created");
        Ok(out)
    }

    pub fn join_room(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        name: &str,
    ) -> Result<Outbox, RoomError> {
        self.ensure_unseated(player)?;

        let max = self.config.max_players;
        let window = self.config.log_window;
        let name = self.config.display_name(name);
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        if room.phase != Phase::Waiting {
            return Err(RoomError::AlreadyStarted(code.clone()));
        }
        if room.players.len() >= max {
            return Err(RoomError::RoomFull(code.clone()));
        }

        room.players.push(Player::new(player, name));
        self.seats.insert(player, code.clone());

        let mut out = Outbox::new();
        out.unicast(player, ServerMessage::RoomJoined { room_code: code.clone() });
        out.broadcast(code, ServerMessage::RoomUpdate { room: room.snapshot(window) });
        tracing::info!(room_code = %code, player_id = %player, players = room.players.len(), "player joined");
        Ok(out)
    }

    /// Deals roles and starts the first night. Host only, from the waiting
    /// room, with a playable roster.
    pub fn start_game(&mut self, player: PlayerId, code: &RoomCode) -> Result<Outbox, RoomError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| ValidationError::UnknownRoom(code.clone()))?;
        validate::start(room, player)?;

        let count = room.players.len();
        if !self.config.roster_size_ok(count) {
            return Err(RoomError::InvalidRosterSize {
                count,
                min: self.config.min_players,
                max: self.config.max_players,
            });
        }

        let deck = roles::deal(count, &mut self.rng);
        for (p, role) in room.players.iter_mut().zip(deck) {
            p.role = Some(role);
        }
        room.log.push("🎮 Game bắt đầu! Mỗi người đã nhận vai trò bí mật.".to_string());
        tracing::info!(room_code = %code, players = count, "game started");

        let mut out = Outbox::new();
        let snapshot = room.snapshot(self.config.log_window);
        for p in &room.players {
            if let Some(role) = p.role {
                out.unicast(
                    p.id,
                    ServerMessage::YourRole {
                        role,
                        room: snapshot.clone(),
                    },
                );
            }
        }
        out.broadcast(code, ServerMessage::GameStarted { room: snapshot });

        Director {
            room,
            timers: &mut self.timers,
            config: &self.config,
            out: &mut out,
        }
        .begin_night();
        Ok(out)
    }

    /// Relays a chat line to the room. Chat never touches game state.
    pub fn send_chat(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        message: &str,
    ) -> Result<Outbox, RoomError> {
        let room = self.existing(code)?;
        validate::chat(room, player)?;

        let mut out = Outbox::new();
        out.broadcast(
            code,
            ServerMessage::Chat {
                name: room.name_of(player).to_string(),
                message: self.config.chat_text(message),
            },
        );
        Ok(out)
    }

    /// Removes a departed player from their room. The host seat passes to
    /// the first remaining player; an emptied room is destroyed with its
    /// timer. Not being seated anywhere is fine and yields nothing.
    pub fn leave(&mut self, player: PlayerId) -> Outbox {
        let mut out = Outbox::new();
        let Some(code) = self.seats.remove(&player) else {
            return out;
        };
        let Some(room) = self.rooms.get_mut(&code) else {
            return out;
        };

        room.players.retain(|p| p.id != player);
        room.wolf_votes.remove(&player);
        room.day_votes.remove(&player);
        tracing::info!(room_code = %code, player_id = %player, remaining = room.players.len(), "player left");

        let Some(first) = room.players.first().map(|p| p.id) else {
            self.timers.cancel(&code);
            self.rooms.remove(&code);
            tracing::info!(room_code = %code, "room destroyed");
            return out;
        };

        if room.host == player {
            room.host = first;
            let line = format!("👑 Host đã rời phòng, host mới là {}.", room.name_of(first));
            room.log.push(line);
        }

        let snapshot = room.snapshot(self.config.log_window);
        let msg = if room.phase == Phase::Waiting {
            ServerMessage::RoomUpdate { room: snapshot }
        } else {
            ServerMessage::PhaseChange { room: snapshot }
        };
        out.broadcast(&code, msg);

        Director {
            room,
            timers: &mut self.timers,
            config: &self.config,
            out: &mut out,
        }
        .after_departure();
        out
    }

    /// Delivers an expired timeout. Anything that no longer matches the
    /// room's pending timeout is ignored: a destroyed room, a newer token,
    /// or a room that has moved past the position the timer was armed for.
    pub fn fire_timer(&mut self, code: &RoomCode, token: TimerToken) -> Outbox {
        let mut out = Outbox::new();
        let Some(room) = self.rooms.get_mut(code) else {
            tracing::debug!(room_code = %code, %token, "timeout for a destroyed room");
            return out;
        };
        let Some(armed) = room.timer.armed else {
            tracing::debug!(room_code = %code, %token, "timeout with nothing armed");
            return out;
        };
        if armed.token != token || armed.phase != room.phase || armed.step != room.night_step {
            tracing::debug!(room_code = %code, %token, current = %armed.token, "stale timeout");
            return out;
        }

        Director {
            room,
            timers: &mut self.timers,
            config: &self.config,
            out: &mut out,
        }
        .on_timeout(armed);
        out
    }

    // -- night actions --------------------------------------------------------

    pub fn wolf_bite(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        target: PlayerId,
    ) -> Result<Outbox, RoomError> {
        self.night_action(player, code, NightStep::WolfBite, Role::Wolf, Some(target), |d| {
            d.wolf_bite(player, target)
        })
    }

    pub fn guard_protect(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        target: PlayerId,
    ) -> Result<Outbox, RoomError> {
        self.night_action(player, code, NightStep::Guard, Role::Guard, Some(target), |d| {
            d.guard_protect(player, target)
        })
    }

    pub fn seer_view(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        target: PlayerId,
    ) -> Result<Outbox, RoomError> {
        self.night_action(player, code, NightStep::Seer, Role::Seer, Some(target), |d| {
            d.seer_view(player, target)
        })
    }

    pub fn witch_action(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        save: bool,
        poison: Option<PlayerId>,
    ) -> Result<Outbox, RoomError> {
        self.night_action(player, code, NightStep::Witch, Role::Witch, poison, |d| {
            d.witch_action(player, save, poison)
        })
    }

    // -- day actions ----------------------------------------------------------

    pub fn skip_discuss(&mut self, player: PlayerId, code: &RoomCode) -> Result<Outbox, RoomError> {
        let room = self.existing(code)?;
        validate::skip_discuss(room, player)?;
        Ok(self.direct(code, |d| d.skip_discuss()))
    }

    pub fn day_vote(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        target: Option<PlayerId>,
    ) -> Result<Outbox, RoomError> {
        let room = self.existing(code)?;
        validate::day_vote(room, player, target)?;
        Ok(self.direct(code, |d| d.day_vote(player, target)))
    }

    // -- helpers --------------------------------------------------------------

    fn existing(&self, code: &RoomCode) -> Result<&Room, ValidationError> {
        self.rooms
            .get(code)
            .ok_or_else(|| ValidationError::UnknownRoom(code.clone()))
    }

    fn ensure_unseated(&self, player: PlayerId) -> Result<(), RoomError> {
        match self.seats.get(&player) {
            Some(code) => Err(ValidationError::AlreadySeated(player, code.clone()).into()),
            None => Ok(()),
        }
    }

    fn night_action(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
        step: NightStep,
        role: Role,
        target: Option<PlayerId>,
        act: impl FnOnce(&mut Director<'_, S>),
    ) -> Result<Outbox, RoomError> {
        let room = self.existing(code)?;
        validate::night_action(room, player, step, role, target)?;
        Ok(self.direct(code, act))
    }

    /// Runs `act` against a room that is known to exist.
    fn direct(&mut self, code: &RoomCode, act: impl FnOnce(&mut Director<'_, S>)) -> Outbox {
        let mut out = Outbox::new();
        if let Some(room) = self.rooms.get_mut(code) {
            let mut director = Director {
                room,
                timers: &mut self.timers,
                config: &self.config,
                out: &mut out,
            };
            act(&mut director);
        }
        out
    }

    fn fresh_code(&mut self) -> RoomCode {
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[self.rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode::new(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}
