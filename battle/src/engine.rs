//! Turn engine: human submissions plus automatic replies
//!
//! A submission from a human side is applied, then while the battle is
//! still running and the autopilot side is to move, the autopilot's
//! selector picks a move and that move is applied too. The caller always
//! gets back a battle that is finished or waiting on a human.

use pokeduel_protocol::Side;

use crate::errors::{BattleError, BattleResult};
use crate::policy::MoveSelector;
use crate::state::{Battle, TurnOutcome};

/// A computer-controlled side and the selector driving it
pub struct Autopilot<'a> {
    pub side: Side,
    pub selector: &'a mut dyn MoveSelector,
}

impl<'a> Autopilot<'a> {
    pub fn new(side: Side, selector: &'a mut dyn MoveSelector) -> Self {
        Self { side, selector }
    }
}

/// Apply `side`'s move, then any moves the autopilot owes in response.
///
/// Returns every outcome in order (the submitted move first). If the
/// submitted move is rejected nothing changes; autopilot moves are only
/// attempted after it succeeded.
pub fn submit_move(
    battle: &mut Battle,
    side: Side,
    move_name: &str,
    mut autopilot: Option<Autopilot<'_>>,
) -> BattleResult<Vec<TurnOutcome>> {
    battle.ensure_active()?;

    if let Some(pilot) = &autopilot
        && pilot.side == side
    {
        return Err(BattleError::NotYourTurn {
            attempted: side,
            current: battle.current_turn(),
        });
    }

    let mut outcomes = vec![battle.apply_move(side, move_name)?];

    if let Some(pilot) = autopilot.as_mut() {
        while battle.is_active() && battle.current_turn() == pilot.side {
            outcomes.push(autopilot_move(battle, pilot)?);
        }
    }

    Ok(outcomes)
}

fn autopilot_move(battle: &mut Battle, pilot: &mut Autopilot<'_>) -> BattleResult<TurnOutcome> {
    let own = battle.combatant(pilot.side);
    let foe = battle.combatant(pilot.side.other());
    let move_name = pilot.selector.choose_move(own, foe).ok_or_else(|| {
        BattleError::InvalidState(format!("{} has no move to choose", own.name))
    })?;

    battle.apply_move(pilot.side, &move_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{RandomPolicy, ScriptedPolicy};
    use crate::types::{Combatant, Move, Type};
    use pokeduel_protocol::{BattleStatus, Stats};

    fn combatant(name: &str, hp: u32) -> Combatant {
        Combatant::new(
            name,
            vec![Type::Normal],
            Stats {
                max_hp: 100,
                attack: 100,
                defense: 100,
                speed: 50,
            },
            vec![
                Move::new("Slash", Type::Normal, 50),
                Move::new("Scratch", Type::Normal, 40),
            ],
        )
        .unwrap()
        .with_hp(hp)
    }

    #[test]
    fn test_autopilot_replies_until_human_turn() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 100)).unwrap();
        let mut script = ScriptedPolicy::new(["Scratch"]);

        let outcomes = submit_move(
            &mut battle,
            Side::Player,
            "Slash",
            Some(Autopilot::new(Side::Opponent, &mut script)),
        )
        .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].entry.attacker, Side::Player);
        assert_eq!(outcomes[1].entry.attacker, Side::Opponent);
        assert_eq!(outcomes[1].entry.move_name, "Scratch");
        assert_eq!(battle.current_turn(), Side::Player);
        assert_eq!(battle.log().len(), 2);
    }

    #[test]
    fn test_no_reply_after_knockout() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 15)).unwrap();
        let mut script = ScriptedPolicy::new(["Scratch"]);

        let outcomes = submit_move(
            &mut battle,
            Side::Player,
            "Slash",
            Some(Autopilot::new(Side::Opponent, &mut script)),
        )
        .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(battle.status(), BattleStatus::Finished);
        assert_eq!(battle.winner(), Some(Side::Player));
    }

    #[test]
    fn test_autopilot_knockout_ends_battle() {
        let mut battle = Battle::new(combatant("Meowth", 10), combatant("Rattata", 100)).unwrap();
        let mut script = ScriptedPolicy::new(["Slash"]);

        submit_move(
            &mut battle,
            Side::Player,
            "Scratch",
            Some(Autopilot::new(Side::Opponent, &mut script)),
        )
        .unwrap();

        assert_eq!(battle.winner(), Some(Side::Opponent));
        assert_eq!(battle.current_turn(), Side::Opponent);
    }

    #[test]
    fn test_rejected_submission_skips_autopilot() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 100)).unwrap();
        let before = battle.clone();
        let mut random = RandomPolicy::with_seed(3);

        let err = submit_move(
            &mut battle,
            Side::Player,
            "Fly",
            Some(Autopilot::new(Side::Opponent, &mut random)),
        )
        .unwrap_err();

        assert!(matches!(err, BattleError::UnknownMove { .. }));
        assert_eq!(battle, before);
    }

    #[test]
    fn test_autopilot_side_can_not_submit() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 100)).unwrap();
        let mut script = ScriptedPolicy::new(["Slash"]);

        let err = submit_move(
            &mut battle,
            Side::Opponent,
            "Slash",
            Some(Autopilot::new(Side::Opponent, &mut script)),
        )
        .unwrap_err();

        assert!(matches!(err, BattleError::NotYourTurn { .. }));
        assert!(battle.log().is_empty());
    }

    #[test]
    fn test_bad_scripted_move_surfaces_error() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 100)).unwrap();
        let mut script = ScriptedPolicy::new(["Teleport"]);

        let err = submit_move(
            &mut battle,
            Side::Player,
            "Slash",
            Some(Autopilot::new(Side::Opponent, &mut script)),
        )
        .unwrap_err();

        // the human move stands; the autopilot move was refused
        assert!(matches!(err, BattleError::UnknownMove { .. }));
        assert_eq!(battle.log().len(), 1);
        assert_eq!(battle.current_turn(), Side::Opponent);
    }

    #[test]
    fn test_finished_battle_rejects_autopilot_side_as_invalid_state() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 100)).unwrap();
        battle.apply_surrender(Side::Player).unwrap();
        let mut script = ScriptedPolicy::new(["Slash"]);

        let err = submit_move(
            &mut battle,
            Side::Opponent,
            "Slash",
            Some(Autopilot::new(Side::Opponent, &mut script)),
        )
        .unwrap_err();

        assert!(matches!(err, BattleError::InvalidState(_)));
    }

    #[test]
    fn test_without_autopilot_turn_passes_to_other_human() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 100)).unwrap();

        let outcomes = submit_move(&mut battle, Side::Player, "Slash", None).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(battle.current_turn(), Side::Opponent);
        submit_move(&mut battle, Side::Opponent, "Scratch", None).unwrap();
        assert_eq!(battle.current_turn(), Side::Player);
    }

    #[test]
    fn test_full_battle_against_random_policy_terminates() {
        let mut battle = Battle::new(combatant("Meowth", 100), combatant("Rattata", 100)).unwrap();
        let mut random = RandomPolicy::with_seed(99);

        while battle.is_active() {
            submit_move(
                &mut battle,
                Side::Player,
                "Scratch",
                Some(Autopilot::new(Side::Opponent, &mut random)),
            )
            .unwrap();
            assert!(!battle.is_active() || battle.current_turn() == Side::Player);
        }
        assert!(battle.winner().is_some());
    }
}
