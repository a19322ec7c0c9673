//! Preconditions for every inbound action.
//!
//! Each check reads the room and returns the first failed precondition.
//! None of them mutate anything, so a rejected action leaves no trace.

use masoi_protocol::{NightStep, Phase, PlayerId, Role};

use crate::ValidationError;
use crate::room::{Player, Room};

fn member(room: &Room, actor: PlayerId) -> Result<&Player, ValidationError> {
    room.player(actor).ok_or(ValidationError::NotMember(actor))
}

fn phase(room: &Room, expected: Phase) -> Result<(), ValidationError> {
    if room.phase == expected {
        Ok(())
    } else {
        Err(ValidationError::WrongPhase {
            expected,
            actual: room.phase,
        })
    }
}

fn alive_actor(room: &Room, actor: PlayerId) -> Result<&Player, ValidationError> {
    let player = member(room, actor)?;
    if player.alive {
        Ok(player)
    } else {
        Err(ValidationError::ActorDead(actor))
    }
}

fn alive_target(room: &Room, target: PlayerId) -> Result<(), ValidationError> {
    if room.is_alive(target) {
        Ok(())
    } else {
        Err(ValidationError::TargetNotAlive(target))
    }
}

fn host(room: &Room, actor: PlayerId) -> Result<(), ValidationError> {
    if room.host == actor {
        Ok(())
    } else {
        Err(ValidationError::NotHost(actor))
    }
}

/// A night sub-action: the room must be at `step` of the night, the actor
/// an alive holder of `role`, and `target` (if any) alive.
pub fn night_action(
    room: &Room,
    actor: PlayerId,
    step: NightStep,
    role: Role,
    target: Option<PlayerId>,
) -> Result<(), ValidationError> {
    member(room, actor)?;
    phase(room, Phase::Night)?;
    if room.night_step != Some(step) {
        return Err(ValidationError::WrongStep {
            expected: step,
            actual: room.night_step,
        });
    }
    let player = alive_actor(room, actor)?;
    if player.role != Some(role) {
        return Err(ValidationError::WrongRole {
            required: role,
            actual: player.role,
        });
    }
    if let Some(target) = target {
        alive_target(room, target)?;
    }
    Ok(())
}

/// A day vote. `None` is an abstention and needs no target check.
pub fn day_vote(room: &Room, voter: PlayerId, target: Option<PlayerId>) -> Result<(), ValidationError> {
    member(room, voter)?;
    phase(room, Phase::Vote)?;
    alive_actor(room, voter)?;
    if let Some(target) = target {
        alive_target(room, target)?;
    }
    Ok(())
}

pub fn skip_discuss(room: &Room, actor: PlayerId) -> Result<(), ValidationError> {
    member(room, actor)?;
    phase(room, Phase::Discuss)?;
    alive_actor(room, actor)?;
    host(room, actor)
}

/// Start is host-only and only from the waiting room. The roster size is
/// checked separately because that failure is reported to the host.
pub fn start(room: &Room, actor: PlayerId) -> Result<(), ValidationError> {
    member(room, actor)?;
    host(room, actor)?;
    phase(room, Phase::Waiting)
}

/// Everyone may talk before and after the game; during it only the living.
pub fn chat(room: &Room, actor: PlayerId) -> Result<(), ValidationError> {
    let player = member(room, actor)?;
    if room.phase.is_in_progress() && !player.alive {
        return Err(ValidationError::ActorDead(actor));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use masoi_protocol::RoomCode;

    use super::*;

    /// Four players with roles [Wolf, Seer, Villager, Villager] at wolf_bite.
    fn night_room() -> Room {
        let roles = [Role::Wolf, Role::Seer, Role::Villager, Role::Villager];
        let mut room = Room::new(RoomCode::new("VALID1"), Player::new(PlayerId(1), "a".into()));
        for i in 2..=4 {
            room.players.push(Player::new(PlayerId(i), format!("p{i}")));
        }
        for (p, r) in room.players.iter_mut().zip(roles) {
            p.role = Some(r);
        }
        room.phase = Phase::Night;
        room.night_step = Some(NightStep::WolfBite);
        room
    }

    #[test]
    fn test_wolf_bite_accepts_alive_wolf_on_alive_target() {
        let room = night_room();
        let ok = night_action(&room, PlayerId(1), NightStep::WolfBite, Role::Wolf, Some(PlayerId(3)));
        assert_eq!(ok, Ok(()));
    }

    #[test]
    fn test_each_precondition_is_checked() {
        let mut room = night_room();

        let err = night_action(&room, PlayerId(9), NightStep::WolfBite, Role::Wolf, Some(PlayerId(3)));
        assert_eq!(err, Err(ValidationError::NotMember(PlayerId(9))));

        let err = night_action(&room, PlayerId(2), NightStep::WolfBite, Role::Wolf, Some(PlayerId(3)));
        assert_eq!(
            err,
            Err(ValidationError::WrongRole {
                required: Role::Wolf,
                actual: Some(Role::Seer)
            })
        );

        let err = night_action(&room, PlayerId(2), NightStep::Seer, Role::Seer, Some(PlayerId(1)));
        assert!(matches!(err, Err(ValidationError::WrongStep { .. })));

        room.players[3].alive = false;
        let err = night_action(&room, PlayerId(1), NightStep::WolfBite, Role::Wolf, Some(PlayerId(4)));
        assert_eq!(err, Err(ValidationError::TargetNotAlive(PlayerId(4))));

        room.players[0].alive = false;
        let err = night_action(&room, PlayerId(1), NightStep::WolfBite, Role::Wolf, Some(PlayerId(3)));
        assert_eq!(err, Err(ValidationError::ActorDead(PlayerId(1))));

        room.phase = Phase::Discuss;
        room.night_step = None;
        let err = night_action(&room, PlayerId(2), NightStep::Seer, Role::Seer, Some(PlayerId(1)));
        assert!(matches!(err, Err(ValidationError::WrongPhase { .. })));
    }

    #[test]
    fn test_day_vote_allows_abstain_and_rejects_dead_targets() {
        let mut room = night_room();
        room.phase = Phase::Vote;
        room.night_step = None;
        room.players[2].alive = false;

        assert_eq!(day_vote(&room, PlayerId(1), None), Ok(()));
        assert_eq!(day_vote(&room, PlayerId(1), Some(PlayerId(4))), Ok(()));
        assert_eq!(
            day_vote(&room, PlayerId(1), Some(PlayerId(3))),
            Err(ValidationError::TargetNotAlive(PlayerId(3)))
        );
        assert_eq!(
            day_vote(&room, PlayerId(3), None),
            Err(ValidationError::ActorDead(PlayerId(3)))
        );
    }

    #[test]
    fn test_skip_discuss_is_for_the_alive_host_during_discuss() {
        let mut room = night_room();
        room.phase = Phase::Discuss;
        room.night_step = None;

        assert_eq!(skip_discuss(&room, PlayerId(1)), Ok(()));
        assert_eq!(skip_discuss(&room, PlayerId(2)), Err(ValidationError::NotHost(PlayerId(2))));

        room.players[0].alive = false;
        assert_eq!(skip_discuss(&room, PlayerId(1)), Err(ValidationError::ActorDead(PlayerId(1))));

        room.phase = Phase::Vote;
        assert!(matches!(skip_discuss(&room, PlayerId(1)), Err(ValidationError::WrongPhase { .. })));
    }

    #[test]
    fn test_chat_rules_depend_on_phase() {
        let mut room = night_room();
        room.players[1].alive = false;
        assert_eq!(chat(&room, PlayerId(2)), Err(ValidationError::ActorDead(PlayerId(2))));
        assert_eq!(chat(&room, PlayerId(1)), Ok(()));

        room.phase = Phase::End;
        room.night_step = None;
        assert_eq!(chat(&room, PlayerId(2)), Ok(()));
        assert_eq!(chat(&room, PlayerId(7)), Err(ValidationError::NotMember(PlayerId(7))));
    }

    #[test]
    fn test_start_requires_host_in_waiting() {
        let mut room = night_room();
        assert!(matches!(start(&room, PlayerId(1)), Err(ValidationError::WrongPhase { .. })));
        room.phase = Phase::Waiting;
        room.night_step = None;
        assert_eq!(start(&room, PlayerId(1)), Ok(()));
        assert_eq!(start(&room, PlayerId(2)), Err(ValidationError::NotHost(PlayerId(2))));
    }
}
