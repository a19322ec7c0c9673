//! Win condition evaluation.

use masoi_protocol::{Faction, Role};

/// Whether the game goes on after a change to the alive roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Won(Faction),
}

/// Decides the game from the roles of the players still alive.
///
/// Villagers win once no wolf is alive. Wolves win once they are at least
/// as many as everybody else, provided someone is alive at all.
pub fn evaluate<I: IntoIterator<Item = Role>>(alive_roles: I) -> Verdict {
    let (wolves, others) = alive_roles.into_iter().fold((0usize, 0usize), |(w, o), role| {
        match role.faction() {
            Faction::Wolves => (w + 1, o),
            Faction::Villagers => (w, o + 1),
        }
    });
    evaluate_counts(wolves, others)
}

pub fn evaluate_counts(wolves: usize, others: usize) -> Verdict {
    if wolves == 0 {
        Verdict::Won(Faction::Villagers)
    } else if wolves >= others && wolves + others > 0 {
        Verdict::Won(Faction::Wolves)
    } else {
        Verdict::Continue
    }
}

/// Human-readable reason shown in the `game_end` event.
pub fn detail(winner: Faction) -> &'static str {
    match winner {
        Faction::Villagers => "Tất cả Sói đã bị loại.",
        Faction::Wolves => "Sói đã chiếm ưu thế (số Sói ≥ số người còn lại).",
    }
}
