//! Role dealing.
//!
//! The deck for each roster size is fixed. Wolves grow from one to three
//! as the table fills up, the seer, guard and witch join at 4, 5 and 7
//! players, and the rest are plain villagers.

use masoi_protocol::Role;
use rand::Rng;
use rand::seq::SliceRandom;

/// Special-role counts for one roster size. Villagers fill the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Composition {
    wolves: usize,
    seer: bool,
    guard: bool,
    witch: bool,
}

const fn comp(wolves: usize, seer: bool, guard: bool, witch: bool) -> Composition {
    Composition { wolves, seer, guard, witch }
}

/// Composition table, indexed by `n - 4`.
const TABLE: [Composition; 7] = [
    comp(1, true, false, false), // 4
    comp(1, true, true, false),  // 5
    comp(2, true, true, false),  // 6
    comp(2, true, true, true),   // 7
    comp(2, true, true, true),   // 8
    comp(2, true, true, true),   // 9
    comp(3, true, true, true),   // 10
];

fn composition(n: usize) -> Option<Composition> {
    n.checked_sub(4).and_then(|i| TABLE.get(i)).copied()
}

/// The unshuffled deck for `n` players.
///
/// Outside 4..=10 everyone is a villager; the room refuses to start such a
/// roster anyway.
pub fn roles_for_count(n: usize) -> Vec<Role> {
    let Some(c) = composition(n) else {
        return vec![Role::Villager; n];
    };

    let mut deck = vec![Role::Wolf; c.wolves];
    if c.seer {
        deck.push(Role::Seer);
    }
    if c.guard {
        deck.push(Role::Guard);
    }
    if c.witch {
        deck.push(Role::Witch);
    }
    deck.resize(n, Role::Villager);
    deck
}

/// A uniformly shuffled deck for `n` players. Position `i` goes to the
/// `i`-th player in join order.
pub fn deal<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Role> {
    let mut deck = roles_for_count(n);
    deck.shuffle(rng);
    deck
}
