//! Game configuration: roster limits, text limits, step durations, and
//! tie handling.

use std::time::Duration;

use masoi_protocol::{NightStep, Phase};
use serde::{Deserialize, Serialize};

use crate::TieRule;

/// How long each timed step lasts before it auto-advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub wolf_intro: Duration,
    pub wolf_bite: Duration,
    pub guard: Duration,
    pub seer: Duration,
    pub witch: Duration,
    pub discuss: Duration,
    pub vote: Duration,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            wolf_intro: Duration::from_secs(10),
            wolf_bite: Duration::from_secs(30),
            guard: Duration::from_secs(20),
            seer: Duration::from_secs(20),
            witch: Duration::from_secs(25),
            discuss: Duration::from_secs(120),
            vote: Duration::from_secs(60),
        }
    }
}

impl PhaseDurations {
    /// Timeout for the given position in the game, or `None` for positions
    /// that are never timed (waiting, resolve, end).
    pub fn for_position(&self, phase: Phase, step: Option<NightStep>) -> Option<Duration> {
        match (phase, step) {
            (Phase::Night, Some(NightStep::WolfIntro)) => Some(self.wolf_intro),
            (Phase::Night, Some(NightStep::WolfBite)) => Some(self.wolf_bite),
            (Phase::Night, Some(NightStep::Guard)) => Some(self.guard),
            (Phase::Night, Some(NightStep::Seer)) => Some(self.seer),
            (Phase::Night, Some(NightStep::Witch)) => Some(self.witch),
            (Phase::Discuss, _) => Some(self.discuss),
            (Phase::Vote, _) => Some(self.vote),
            _ => None,
        }
    }

    /// Every duration set to `d`. Handy for demos and tests.
    pub fn uniform(d: Duration) -> Self {
        Self {
            wolf_intro: d,
            wolf_bite: d,
            guard: d,
            seer: d,
            witch: d,
            discuss: d,
            vote: d,
        }
    }
}

/// Settings shared by every room of a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Smallest roster that may start a game.
    pub min_players: usize,

    /// Largest roster; joins beyond it are rejected.
    pub max_players: usize,

    /// Number of most recent log lines included in snapshots.
    pub log_window: usize,

    /// Display names are cut to this many characters.
    pub max_name_len: usize,

    /// Chat messages are cut to this many characters.
    pub max_chat_len: usize,

    /// Name used when a player sends an empty one.
    pub default_name: String,

    pub durations: PhaseDurations,

    /// How the wolves' bite is settled when their votes tie.
    pub wolf_tie_rule: TieRule,

    /// How the day vote is settled when the top candidates tie.
    pub day_tie_rule: TieRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 10,
            log_window: 200,
            max_name_len: 20,
            max_chat_len: 500,
            default_name: "Player".to_string(),
            durations: PhaseDurations::default(),
            wolf_tie_rule: TieRule::FirstToLead,
            day_tie_rule: TieRule::NoElimination,
        }
    }
}

impl GameConfig {
    /// Trims and truncates a requested display name.
    pub fn display_name(&self, requested: &str) -> String {
        let trimmed = requested.trim();
        if trimmed.is_empty() {
            return self.default_name.clone();
        }
        trimmed.chars().take(self.max_name_len).collect()
    }

    pub fn chat_text(&self, message: &str) -> String {
        message.chars().take(self.max_chat_len).collect()
    }

    pub fn roster_size_ok(&self, count: usize) -> bool {
        (self.min_players..=self.max_players).contains(&count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_table_range() {
        let config = GameConfig::default();
        assert_eq!(config.min_players, 4);
        assert_eq!(config.max_players, 10);
        assert_eq!(config.log_window, 200);
        assert!(config.roster_size_ok(4));
        assert!(config.roster_size_ok(10));
        assert!(!config.roster_size_ok(3));
        assert!(!config.roster_size_ok(11));
    }

    #[test]
    fn test_display_name_is_trimmed_truncated_and_defaulted() {
        let config = GameConfig::default();
        assert_eq!(config.display_name("  Lan  "), "Lan");
        assert_eq!(config.display_name("   "), "Player");
        let long = "Nguyễn Thị Phương Thảo Linh";
        assert_eq!(config.display_name(long).chars().count(), 20);
    }

    #[test]
    fn test_chat_is_truncated_by_characters_not_bytes() {
        let config = GameConfig { max_chat_len: 3, ..GameConfig::default() };
        assert_eq!(config.chat_text("Sói ơi"), "Sói");
    }

    #[test]
    fn test_untimed_positions() {
        let d = PhaseDurations::default();
        assert_eq!(d.for_position(Phase::Waiting, None), None);
        assert_eq!(d.for_position(Phase::Night, Some(NightStep::Resolve)), None);
        assert_eq!(d.for_position(Phase::End, None), None);
        assert_eq!(d.for_position(Phase::Vote, None), Some(Duration::from_secs(60)));
        assert_eq!(
            d.for_position(Phase::Night, Some(NightStep::Witch)),
            Some(Duration::from_secs(25))
        );
    }
}
