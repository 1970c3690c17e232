//! # Monster Behavior
//!
//! The move-and-attack routine every monster runs on its turn.

use crate::config;
use crate::game::{combat, ActorId, CombatOutcome, DungeonMap, MessageLog, Position};
use crate::utils::{find_path, RandomSource};
use crate::{DelverError, DelverResult};

/// What a monster did with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterTurn {
    /// The monster has not noticed the player
    Idle,
    /// Alerted, but no path to the player exists
    Waited,
    /// Stepped one cell closer to the player
    Moved(Position),
    /// Attacked the adjacent player
    Attacked(CombatOutcome),
}

/// Runs one turn for the monster `monster_id`.
///
/// The monster looks around with its own awareness radius. Once it sees the
/// player it chases them for a limited number of turns, attacking when
/// adjacent and otherwise closing in along a shortest cardinal path.
pub fn take_monster_turn(
    map: &mut DungeonMap,
    log: &mut MessageLog,
    rng: &mut dyn RandomSource,
    monster_id: ActorId,
) -> DelverResult<MonsterTurn> {
    let monster = map
        .actor(monster_id)
        .ok_or(DelverError::UnknownActor(monster_id))?;
    let mut state = *monster.monster_state().ok_or_else(|| {
        DelverError::InvalidAction(format!("{} is not a monster", monster.name))
    })?;
    let name = monster.name.clone();
    let origin = monster.position();
    let awareness = monster.stats.awareness;

    let Some(player) = map.player() else {
        return Ok(MonsterTurn::Idle);
    };
    if !player.is_alive() {
        return Ok(MonsterTurn::Idle);
    }
    let player_id = player.id();
    let target = player.position();
    let player_name = player.name.clone();

    if !state.is_alerted() {
        let view = map.field_of_view_from(origin, awareness);
        if view.is_in_fov(target) {
            log.add(format!("{} is eager to fight {}!", name, player_name));
            state.turns_alerted = Some(0);
        }
    }

    let Some(turns) = state.turns_alerted else {
        return Ok(MonsterTurn::Idle);
    };

    let turn = match find_path(origin, target, |pos| map.is_walkable(pos)) {
        Some(path) if path.first() == Some(&target) => {
            let outcome = combat::resolve_melee(map, log, rng, monster_id, player_id)?;
            MonsterTurn::Attacked(outcome)
        }
        Some(path) => {
            let step = path.first().copied();
            match step {
                Some(step) if map.set_actor_position(monster_id, step) => MonsterTurn::Moved(step),
                _ => MonsterTurn::Waited,
            }
        }
        None => {
            log.add(format!("{} waits for a turn.", name));
            MonsterTurn::Waited
        }
    };

    let turns = turns + 1;
    state.turns_alerted = if turns > config::MONSTER_ALERT_TURNS {
        log::debug!("{} #{} lost interest", name, monster_id);
        None
    } else {
        Some(turns)
    };
    if let Some(slot) = map
        .actor_mut(monster_id)
        .and_then(|actor| actor.monster_state_mut())
    {
        *slot = state;
    }

    Ok(turn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Actor, ActorStats};
    use crate::utils::random::SequenceRandom;

    fn corridor(length: i32) -> DungeonMap {
        let mut map = DungeonMap::new(length + 2, 3);
        for x in 1..=length {
            map.set_cell_properties(Position::new(x, 1), true, true, true);
        }
        map
    }

    fn kobold_stats() -> ActorStats {
        ActorStats {
            attack: 1,
            attack_chance: 100,
            defense: 0,
            defense_chance: 0,
            health: 5,
            max_health: 5,
            gold: 3,
            speed: 14,
            awareness: 10,
        }
    }

    #[test]
    fn test_unseen_player_leaves_monster_idle() {
        let mut map = corridor(10);
        map.place_player(Actor::new_player("Rogue").with_position(Position::new(1, 1)))
            .unwrap();
        let mut stats = kobold_stats();
        stats.awareness = 3;
        let kobold = map
            .add_monster(Actor::monster("Kobold", 'k', stats).with_position(Position::new(9, 1)))
            .unwrap();

        let mut log = MessageLog::new();
        let turn = take_monster_turn(&mut map, &mut log, &mut SequenceRandom::new(vec![1]), kobold).unwrap();
        assert_eq!(turn, MonsterTurn::Idle);
        assert!(log.is_empty());
        assert!(!map.actor(kobold).unwrap().monster_state().unwrap().is_alerted());
    }

    #[test]
    fn test_alerted_monster_steps_toward_player() {
        let mut map = corridor(10);
        map.place_player(Actor::new_player("Rogue").with_position(Position::new(1, 1)))
            .unwrap();
        let kobold = map
            .add_monster(Actor::monster("Kobold", 'k', kobold_stats()).with_position(Position::new(6, 1)))
            .unwrap();

        let mut log = MessageLog::new();
        let mut rng = SequenceRandom::new(vec![1]);
        let turn = take_monster_turn(&mut map, &mut log, &mut rng, kobold).unwrap();

        assert_eq!(turn, MonsterTurn::Moved(Position::new(5, 1)));
        assert_eq!(log.last(), Some("Kobold is eager to fight Rogue!"));
        let state = map.actor(kobold).unwrap().monster_state().copied().unwrap();
        assert_eq!(state.turns_alerted, Some(1));
        assert!(map.is_walkable(Position::new(6, 1)));
        assert!(!map.is_walkable(Position::new(5, 1)));
    }

    #[test]
    fn test_adjacent_monster_attacks() {
        let mut map = corridor(4);
        let player = map
            .place_player(Actor::new_player("Rogue").with_position(Position::new(1, 1)))
            .unwrap();
        let kobold = map
            .add_monster(Actor::monster("Kobold", 'k', kobold_stats()).with_position(Position::new(2, 1)))
            .unwrap();

        let mut log = MessageLog::new();
        // one certain hit; the player's two defense dice roll 1 and miss
        let mut rng = SequenceRandom::new(vec![1]);
        let turn = take_monster_turn(&mut map, &mut log, &mut rng, kobold).unwrap();

        match turn {
            MonsterTurn::Attacked(outcome) => assert_eq!(outcome.damage, 1),
            other => panic!("expected an attack, got {:?}", other),
        }
        assert_eq!(map.actor(player).unwrap().stats.health, 99);
        assert_eq!(map.actor(kobold).unwrap().position(), Position::new(2, 1));
    }

    #[test]
    fn test_no_path_waits() {
        let mut map = corridor(6);
        map.place_player(Actor::new_player("Rogue").with_position(Position::new(1, 1)))
            .unwrap();
        let kobold = map
            .add_monster(Actor::monster("Kobold", 'k', kobold_stats()).with_position(Position::new(5, 1)))
            .unwrap();
        // a second monster plugs the corridor without blocking sight
        map.add_monster(Actor::monster("Rat", 'r', kobold_stats()).with_position(Position::new(3, 1)))
            .unwrap();

        let mut log = MessageLog::new();
        let turn = take_monster_turn(&mut map, &mut log, &mut SequenceRandom::new(vec![1]), kobold).unwrap();
        assert_eq!(turn, MonsterTurn::Waited);
        assert_eq!(log.last(), Some("Kobold waits for a turn."));
    }

    #[test]
    fn test_alert_expires() {
        let mut map = corridor(6);
        map.place_player(Actor::new_player("Rogue").with_position(Position::new(1, 1)))
            .unwrap();
        let kobold = map
            .add_monster(Actor::monster("Kobold", 'k', kobold_stats()).with_position(Position::new(5, 1)))
            .unwrap();
        map.add_monster(Actor::monster("Rat", 'r', kobold_stats()).with_position(Position::new(3, 1)))
            .unwrap();

        let mut log = MessageLog::new();
        let mut rng = SequenceRandom::new(vec![1]);
        for _ in 0..config::MONSTER_ALERT_TURNS {
            take_monster_turn(&mut map, &mut log, &mut rng, kobold).unwrap();
        }
        let state = map.actor(kobold).unwrap().monster_state().copied().unwrap();
        assert_eq!(state.turns_alerted, Some(config::MONSTER_ALERT_TURNS));

        take_monster_turn(&mut map, &mut log, &mut rng, kobold).unwrap();
        let state = map.actor(kobold).unwrap().monster_state().copied().unwrap();
        assert!(!state.is_alerted());
    }

    #[test]
    fn test_player_is_not_a_monster() {
        let mut map = corridor(3);
        let player = map
            .place_player(Actor::new_player("Rogue").with_position(Position::new(1, 1)))
            .unwrap();
        let mut log = MessageLog::new();
        assert!(matches!(
            take_monster_turn(&mut map, &mut log, &mut SequenceRandom::new(vec![1]), player),
            Err(DelverError::InvalidAction(_))
        ));
    }
}
