//! Plurality counting for the wolves' bite and the day vote.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// What happens when two or more targets share the top count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieRule {
    /// The target that reached the top count first (in ballot order) wins.
    FirstToLead,
    /// A tie picks nobody.
    NoElimination,
}

/// Result of counting a sequence of ballots.
///
/// Ballots are processed in order. The leader only changes when a target's
/// count becomes strictly greater than the current best, so on a tie the
/// target that got there first stays in front.
#[derive(Debug, Clone)]
pub struct Tally<T> {
    counts: HashMap<T, usize>,
    leader: Option<(T, usize)>,
    total: usize,
}

impl<T: Copy + Eq + Hash> Tally<T> {
    pub fn count<I: IntoIterator<Item = T>>(ballots: I) -> Self {
        let mut counts: HashMap<T, usize> = HashMap::new();
        let mut leader: Option<(T, usize)> = None;
        let mut total = 0;

        for target in ballots {
            total += 1;
            let n = counts.entry(target).or_insert(0);
            *n += 1;
            if leader.is_none_or(|(_, best)| *n > best) {
                leader = Some((target, *n));
            }
        }

        Self { counts, leader, total }
    }

    /// Votes received by `target`.
    pub fn votes_for(&self, target: &T) -> usize {
        self.counts.get(target).copied().unwrap_or(0)
    }

    /// Number of ballots counted.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The first target to reach the top count.
    pub fn first_to_lead(&self) -> Option<T> {
        self.leader.map(|(target, _)| target)
    }

    /// The target with strictly more votes than every other one.
    pub fn strict_leader(&self) -> Option<T> {
        let (target, best) = self.leader?;
        let tied = self.counts.values().filter(|n| **n == best).count() > 1;
        (!tied).then_some(target)
    }

    pub fn winner(&self, rule: TieRule) -> Option<T> {
        match rule {
            TieRule::FirstToLead => self.first_to_lead(),
            TieRule::NoElimination => self.strict_leader(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ballots_picks_nobody() {
        let t = Tally::<u32>::count([]);
        assert_eq!(t.total(), 0);
        assert_eq!(t.winner(TieRule::FirstToLead), None);
        assert_eq!(t.winner(TieRule::NoElimination), None);
    }

    #[test]
    fn test_clear_plurality_wins_under_both_rules() {
        let t = Tally::count(['A', 'A', 'B']);
        assert_eq!(t.votes_for(&'A'), 2);
        assert_eq!(t.winner(TieRule::FirstToLead), Some('A'));
        assert_eq!(t.winner(TieRule::NoElimination), Some('A'));
    }

    #[test]
    fn test_plurality_does_not_need_majority() {
        let t = Tally::count(['A', 'B', 'C', 'C', 'D']);
        assert_eq!(t.strict_leader(), Some('C'));
    }

    #[test]
    fn test_tie_goes_to_first_target_to_reach_the_top_count() {
        // B leads 1-0, A ties 1-1, A goes ahead 2-1, B ties 2-2: A got to 2 first.
        let t = Tally::count(['B', 'A', 'A', 'B']);
        assert_eq!(t.first_to_lead(), Some('A'));
        assert_eq!(t.strict_leader(), None);
    }

    #[test]
    fn test_single_votes_each_tie() {
        let t = Tally::count(['A', 'B']);
        assert_eq!(t.winner(TieRule::FirstToLead), Some('A'));
        assert_eq!(t.winner(TieRule::NoElimination), None);
    }

    #[test]
    fn test_late_surge_overtakes() {
        let t = Tally::count(['A', 'A', 'B', 'B', 'B']);
        assert_eq!(t.first_to_lead(), Some('B'));
        assert_eq!(t.strict_leader(), Some('B'));
    }

    /// Every ballot sequence of length ≤ 5 over three targets, checked
    /// against a direct definition of both rules.
    #[test]
    fn test_rules_against_brute_force() {
        fn sequences(len: usize) -> Vec<Vec<u8>> {
            if len == 0 {
                return vec![vec![]];
            }
            let mut out = Vec::new();
            for prefix in sequences(len - 1) {
                for t in 0..3u8 {
                    let mut s = prefix.clone();
                    s.push(t);
                    out.push(s);
                }
            }
            out
        }

        for len in 0..=5 {
            for ballots in sequences(len) {
                let t = Tally::count(ballots.iter().copied());
                let count = |x: u8| ballots.iter().filter(|b| **b == x).count();
                let best = (0..3u8).map(count).max().unwrap_or(0);
                let top: Vec<u8> = (0..3u8).filter(|x| best > 0 && count(*x) == best).collect();

                let strict = (top.len() == 1).then(|| top[0]);
                assert_eq!(t.strict_leader(), strict, "{ballots:?}");

                // first index at which some top target reaches `best`
                let first = (1..=ballots.len()).find_map(|i| {
                    let prefix = &ballots[..i];
                    let x = ballots[i - 1];
                    (top.contains(&x) && prefix.iter().filter(|b| **b == x).count() == best)
                        .then_some(x)
                });
                assert_eq!(t.first_to_lead(), first, "{ballots:?}");
            }
        }
    }
}
