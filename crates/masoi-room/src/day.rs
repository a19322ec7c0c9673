//! The day: discuss → vote → resolve, then back to the night.

use masoi_protocol::{Phase, PlayerId, RoomCode};
use masoi_timer::Scheduler;

use crate::director::Director;
use crate::tally::Tally;

impl<S: Scheduler<RoomCode>> Director<'_, S> {
    pub(crate) fn begin_discuss(&mut self) {
        self.enter(Phase::Discuss, None);
        let secs = self.config.durations.discuss.as_secs();
        self.log(format!("☀️ Trời sáng. Bắt đầu {secs} giây bàn bạc."));
        tracing::info!(room_code = %self.room.code, "discussion begins");
        self.broadcast_phase();
        self.arm();
    }

    /// The vote always runs its full duration; only the timeout ends it.
    pub(crate) fn begin_vote(&mut self) {
        self.enter(Phase::Vote, None);
        self.room.day_votes.clear();
        self.log("🗳️ Bắt đầu bỏ phiếu!");
        tracing::info!(room_code = %self.room.code, "vote begins");
        self.broadcast_phase();
        self.arm();
    }

    /// Counts the alive voters' ballots in join order, skipping abstentions
    /// and votes for players who are gone.
    pub(crate) fn resolve_vote(&mut self) {
        self.cancel();
        let room = &*self.room;
        let ballots = room
            .alive()
            .filter_map(|voter| room.day_votes.get(&voter.id).copied().flatten())
            .filter(|target| room.is_alive(*target));
        let tally = Tally::count(ballots);
        let executed = tally.winner(self.config.day_tie_rule);

        match executed.and_then(|id| self.room.player_mut(id)) {
            Some(player) => {
                player.alive = false;
                let line = format!("🪢 Kết quả vote: {} bị treo cổ.", player.name);
                self.log(line);
            }
            None => self.log("🪢 Kết quả vote: Không ai bị treo cổ."),
        }
        tracing::info!(
            room_code = %self.room.code,
            ballots = tally.total(),
            ?executed,
            "vote resolved"
        );
        self.room.day_votes.clear();
        self.broadcast_phase();

        if !self.finish_if_won() {
            self.begin_night();
        }
    }

    // -- actions (already validated) ----------------------------------------

    pub(crate) fn skip_discuss(&mut self) {
        self.log("⏭️ Host đã skip bàn bạc, chuyển sang vote.");
        self.cancel();
        self.begin_vote();
    }

    /// Records or replaces a vote. `None` abstains.
    pub(crate) fn day_vote(&mut self, voter: PlayerId, target: Option<PlayerId>) {
        self.room.day_votes.insert(voter, target);
        self.confirm(voter, "🗳️ Đã vote.");
    }
}
