//! Shared plumbing for the night and day machines.
//!
//! A [`Director`] borrows one room together with the scheduler, the config
//! and the outbox for the current call. The step functions in `night` and
//! `day` are methods on it, so every transition goes through the same
//! arm/cancel/broadcast helpers.

use masoi_protocol::{NightStep, Phase, PlayerId, Prompt, Role, RoomCode, ServerMessage};
use masoi_timer::Scheduler;

use crate::outcome::{self, Verdict};
use crate::room::{ArmedTimer, Room};
use crate::{GameConfig, Outbox};

pub(crate) struct Director<'a, S> {
    pub room: &'a mut Room,
    pub timers: &'a mut S,
    pub config: &'a GameConfig,
    pub out: &'a mut Outbox,
}

impl<S: Scheduler<RoomCode>> Director<'_, S> {
    /// Arms the timeout for the room's current position. Positions without
    /// a duration leave nothing pending.
    pub fn arm(&mut self) {
        self.cancel();
        let Some(after) = self
            .config
            .durations
            .for_position(self.room.phase, self.room.night_step)
        else {
            return;
        };

        let token = self.room.timer.next_token();
        self.timers.arm(self.room.code.clone(), token, after);
        self.room.timer.armed = Some(ArmedTimer {
            token,
            phase: self.room.phase,
            step: self.room.night_step,
        });
        tracing::debug!(
            room_code = %self.room.code,
            phase = %self.room.phase,
            step = ?self.room.night_step,
            %token,
            ?after,
            "timer armed"
        );
    }

    /// Drops the pending timeout. Also clears a scheduler entry whose
    /// timeout already fired.
    pub fn cancel(&mut self) {
        self.room.timer.armed = None;
        self.timers.cancel(&self.room.code);
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.room.log.push(line.into());
    }

    pub fn broadcast_phase(&mut self) {
        let room = self.room.snapshot(self.config.log_window);
        self.out.broadcast(&self.room.code, ServerMessage::PhaseChange { room });
    }

    /// Sends `prompt` to every alive holder of `role`, and nobody else.
    pub fn prompt(&mut self, role: Role, prompt: Prompt) {
        let ids: Vec<_> = self.room.alive_with_role(role).map(|p| p.id).collect();
        for id in ids {
            self.out.unicast(
                id,
                ServerMessage::PromptAction {
                    prompt: prompt.clone(),
                },
            );
        }
    }

    pub fn confirm(&mut self, player: PlayerId, message: &str) {
        self.out.unicast(
            player,
            ServerMessage::ActionConfirm {
                message: message.to_string(),
            },
        );
    }

    /// Moves the room to a phase, or to a night step.
    pub fn enter(&mut self, phase: Phase, step: Option<NightStep>) {
        self.room.phase = phase;
        self.room.night_step = step;
    }

    /// Runs the win check. On a win the room becomes terminal: nothing stays
    /// armed, the final snapshot and `game_end` are broadcast, and `true`
    /// is returned so the caller stops advancing.
    pub fn finish_if_won(&mut self) -> bool {
        let Verdict::Won(winner) = outcome::evaluate(self.room.alive_roles()) else {
            return false;
        };

        self.cancel();
        self.enter(Phase::End, None);
        self.room.wolf_votes.clear();
        self.room.day_votes.clear();
        self.log(format!(
            "🏆 {} thắng! ({})",
            winner.display_name(),
            outcome::detail(winner)
        ));
        self.broadcast_phase();
        self.out.broadcast(
            &self.room.code,
            ServerMessage::GameEnd {
                winner,
                detail: outcome::detail(winner).to_string(),
            },
        );
        tracing::info!(room_code = %self.room.code, ?winner, "game over");
        true
    }

    /// Advances the room after the timeout armed for `armed` ran out.
    /// The caller has already checked that the room is still there.
    pub fn on_timeout(&mut self, armed: ArmedTimer) {
        self.room.timer.armed = None;
        match (armed.phase, armed.step) {
            (Phase::Night, Some(NightStep::WolfIntro)) => {
                self.room.meta.wolf_intro_shown = true;
                self.enter_wolf_bite();
            }
            (Phase::Night, Some(NightStep::WolfBite)) => {
                self.settle_bite();
                self.enter_guard();
            }
            (Phase::Night, Some(NightStep::Guard)) => self.enter_seer(),
            (Phase::Night, Some(NightStep::Seer)) => self.enter_witch(),
            (Phase::Night, Some(NightStep::Witch)) => self.resolve_night(),
            (Phase::Discuss, _) => self.begin_vote(),
            (Phase::Vote, _) => self.resolve_vote(),
            (phase, step) => {
                tracing::warn!(room_code = %self.room.code, %phase, ?step, "timeout at untimed position");
            }
        }
    }
}
