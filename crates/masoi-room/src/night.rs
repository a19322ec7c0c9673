//! The night: wolf_intro → wolf_bite → guard → seer → witch → resolve.
//!
//! Entering a step logs it, broadcasts the snapshot, prompts the alive
//! holders of the step's role and arms the step timeout. A step whose role
//! has nobody alive is logged as skipped and the machine moves straight on.

use std::collections::BTreeSet;

use masoi_protocol::{NightStep, Phase, PlayerId, Prompt, Role, RoomCode, SeerVerdict, ServerMessage};
use masoi_timer::Scheduler;

use crate::director::Director;
use crate::tally::Tally;

impl<S: Scheduler<RoomCode>> Director<'_, S> {
    pub fn begin_night(&mut self) {
        self.enter(Phase::Night, None);
        self.room.night.reset_for_night();
        self.room.wolf_votes.clear();
        self.room.day_votes.clear();
        self.log("🌙 Đêm bắt đầu. Tất cả đi ngủ.");
        tracing::info!(room_code = %self.room.code, "night begins");

        if !self.room.meta.wolf_intro_shown && self.room.has_alive(Role::Wolf) {
            self.enter_wolf_intro();
        } else {
            self.enter_wolf_bite();
        }
    }

    fn enter_wolf_intro(&mut self) {
        self.enter(Phase::Night, Some(NightStep::WolfIntro));
        self.log("🐺 Sói mở mắt để nhận mặt nhau (đêm đầu tiên).");
        self.broadcast_phase();
        let wolves = self.room.alive_with_role(Role::Wolf).map(|p| p.to_ref()).collect();
        self.prompt(Role::Wolf, Prompt::WolfIntro { wolves });
        self.arm();
    }

    pub(crate) fn enter_wolf_bite(&mut self) {
        if !self.room.has_alive(Role::Wolf) {
            self.log("🐺 Không còn Sói, bỏ qua.");
            self.room.night.wolf_target = None;
            return self.enter_guard();
        }

        self.enter(Phase::Night, Some(NightStep::WolfBite));
        self.log("🐺 Sói chọn người cắn.");
        self.broadcast_phase();
        let candidates = self.room.candidates();
        self.prompt(Role::Wolf, Prompt::WolfBite { candidates });
        self.arm();
    }

    /// Turns the wolves' ballots into tonight's target. Only alive wolves'
    /// votes for still-alive targets count, in join order.
    pub(crate) fn settle_bite(&mut self) {
        let room = &*self.room;
        let ballots = room
            .alive_with_role(Role::Wolf)
            .filter_map(|wolf| room.wolf_votes.get(&wolf.id).copied())
            .filter(|target| room.is_alive(*target));
        let target = Tally::count(ballots).winner(self.config.wolf_tie_rule);

        self.room.night.wolf_target = target;
        tracing::debug!(room_code = %self.room.code, ?target, "wolf target settled");
    }

    fn all_wolves_voted(&self) -> bool {
        self.room
            .alive_with_role(Role::Wolf)
            .all(|wolf| self.room.wolf_votes.contains_key(&wolf.id))
    }

    pub(crate) fn enter_guard(&mut self) {
        if !self.room.has_alive(Role::Guard) {
            self.log("🛡️ Không có Bảo vệ, bỏ qua.");
            return self.enter_seer();
        }

        self.enter(Phase::Night, Some(NightStep::Guard));
        self.log("🛡️ Bảo vệ chọn người bảo vệ.");
        self.broadcast_phase();
        let candidates = self.room.candidates();
        self.prompt(Role::Guard, Prompt::GuardProtect { candidates });
        self.arm();
    }

    pub(crate) fn enter_seer(&mut self) {
        if !self.room.has_alive(Role::Seer) {
            self.log("🔮 Không có Tiên tri, bỏ qua.");
            return self.enter_witch();
        }

        self.enter(Phase::Night, Some(NightStep::Seer));
        self.log("🔮 Tiên tri chọn người soi.");
        self.broadcast_phase();
        let candidates = self.room.candidates();
        self.prompt(Role::Seer, Prompt::SeerView { candidates });
        self.arm();
    }

    pub(crate) fn enter_witch(&mut self) {
        if !self.room.has_alive(Role::Witch) {
            self.log("🧪 Không có Phù thủy, bỏ qua.");
            return self.resolve_night();
        }

        self.enter(Phase::Night, Some(NightStep::Witch));
        self.log("🧪 Phù thủy thức dậy (có thể cứu hoặc đầu độc).");
        self.broadcast_phase();
        let witch = &self.room.night.witch;
        let prompt = Prompt::Witch {
            victim: self
                .room
                .night
                .wolf_target
                .and_then(|id| self.room.player(id))
                .map(|p| p.to_ref()),
            has_save: witch.save_remaining,
            has_poison: witch.poison_remaining,
            candidates: self.room.candidates(),
        };
        self.prompt(Role::Witch, prompt);
        self.arm();
    }

    /// Applies the night's actions in their fixed order: the bite, then the
    /// guard's shield, then the witch's save, then the poison, which nothing
    /// blocks.
    pub(crate) fn resolve_night(&mut self) {
        self.cancel();
        self.enter(Phase::Night, Some(NightStep::Resolve));

        let actions = &self.room.night;
        let mut bitten = actions.wolf_target;
        if bitten.is_some() && bitten == actions.guard_target {
            bitten = None;
        }
        if actions.witch.save_used_tonight {
            bitten = None;
        }

        let dead: BTreeSet<PlayerId> = bitten.into_iter().chain(actions.witch.poison_target).collect();
        // Names in join order, read before anyone is marked dead.
        let names: Vec<String> = self
            .room
            .players
            .iter()
            .filter(|p| dead.contains(&p.id))
            .map(|p| p.name.clone())
            .collect();
        for player in self.room.players.iter_mut().filter(|p| dead.contains(&p.id)) {
            player.alive = false;
        }

        if names.is_empty() {
            self.log("🌙 Kết thúc đêm: Không ai chết.");
        } else {
            self.log(format!("🌙 Kết thúc đêm: {} đã chết.", names.join(", ")));
        }
        tracing::info!(room_code = %self.room.code, dead = ?dead, "night resolved");
        self.broadcast_phase();

        if !self.finish_if_won() {
            self.begin_discuss();
        }
    }

    // -- actions (already validated) ----------------------------------------

    pub(crate) fn wolf_bite(&mut self, wolf: PlayerId, target: PlayerId) {
        self.room.wolf_votes.insert(wolf, target);
        self.confirm(wolf, "🐺 Đã chọn mục tiêu.");
        if self.all_wolves_voted() {
            self.cancel();
            self.settle_bite();
            self.enter_guard();
        }
    }

    pub(crate) fn guard_protect(&mut self, guard: PlayerId, target: PlayerId) {
        self.room.night.guard_target = Some(target);
        self.confirm(guard, "🛡️ Đã chọn bảo vệ.");
        self.cancel();
        self.enter_seer();
    }

    pub(crate) fn seer_view(&mut self, seer: PlayerId, target: PlayerId) {
        self.room.night.seer_target = Some(target);
        if let Some(player) = self.room.player(target) {
            let result = ServerMessage::SeerResult {
                target_name: player.name.clone(),
                verdict: player.role.map_or(SeerVerdict::NotWolf, SeerVerdict::of),
            };
            self.out.unicast(seer, result);
        }
        self.confirm(seer, "🔮 Đã soi.");
        self.cancel();
        self.enter_witch();
    }

    /// Spends whichever potions are asked for and still available. A save
    /// with nobody bitten keeps the charge.
    pub(crate) fn witch_action(&mut self, witch: PlayerId, save: bool, poison: Option<PlayerId>) {
        let has_victim = self.room.night.wolf_target.is_some();
        let state = &mut self.room.night.witch;
        if save && state.save_remaining && has_victim {
            state.save_used_tonight = true;
            state.save_remaining = false;
        }
        if state.poison_remaining {
            if let Some(target) = poison {
                state.poison_target = Some(target);
                state.poison_remaining = false;
            }
        }

        self.confirm(witch, "🧪 Đã chốt hành động phù thủy.");
        self.resolve_night();
    }

    /// Called after a player left mid-night. If the departure means every
    /// remaining wolf has voted (or no wolf is left), the bite closes now.
    pub(crate) fn after_departure(&mut self) {
        if self.room.phase == Phase::Night
            && self.room.night_step == Some(NightStep::WolfBite)
            && self.all_wolves_voted()
        {
            self.cancel();
            self.settle_bite();
            self.enter_guard();
        }
    }
}
