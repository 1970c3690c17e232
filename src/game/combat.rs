//! # Combat
//!
//! Dice-pool melee resolution.
//!
//! An attack rolls one d100 per point of attack; every face at or above
//! `100 - attack_chance` is a hit. If anything hit, the defender rolls one d100
//! per point of defense and blocks on faces at or above `100 - defense_chance`.
//! Each unblocked hit costs one point of health.
//!
//! Every step narrates into the [`MessageLog`] in a fixed order: attack,
//! defense, damage, then death.

use crate::config;
use crate::game::{Actor, ActorId, DungeonMap, MessageLog};
use crate::utils::{dice, DiceRoll, RandomSource};
use crate::{DelverError, DelverResult};
use serde::{Deserialize, Serialize};

/// What a single melee exchange did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub hits: u32,
    pub blocks: u32,
    /// Health removed from the defender, never negative
    pub damage: i32,
    pub defender_died: bool,
    /// Gold left behind by a slain monster
    pub gold_dropped: i32,
}

/// Rolls a pool of combat dice and counts the successes.
///
/// A negative pool size is an error.
fn roll_pool(dice_count: i32, chance: i32, rng: &mut dyn RandomSource) -> DelverResult<(DiceRoll, u32)> {
    let count = u32::try_from(dice_count).map_err(|_| {
        DelverError::InvalidDice(format!("cannot roll {} combat dice", dice_count))
    })?;
    let pool = dice::roll(count, config::COMBAT_DIE_FACES, rng)?;
    let successes = pool.count_at_least(config::COMBAT_DIE_FACES as i32 - chance);
    Ok((pool, successes))
}

/// Rolls the attacker's pool and narrates it. Returns the number of hits.
pub fn resolve_attack(
    attacker: &Actor,
    defender: &Actor,
    log: &mut MessageLog,
    rng: &mut dyn RandomSource,
) -> DelverResult<u32> {
    let (pool, hits) = roll_pool(attacker.stats.attack, attacker.stats.attack_chance, rng)?;

    if pool.faces.is_empty() {
        log.add(format!(
            "{} attacks {} but has no dice to roll.",
            attacker.name, defender.name
        ));
    } else if hits > 0 {
        log.add(format!(
            "{} attacks {} and rolls: {}, scoring {} hits.",
            attacker.name,
            defender.name,
            pool.trace(),
            hits
        ));
    } else {
        log.add(format!(
            "{} attacks {} and rolls: {}, missing completely.",
            attacker.name,
            defender.name,
            pool.trace()
        ));
    }

    Ok(hits)
}

/// Rolls the defender's pool and narrates it. Returns the number of blocks.
pub fn resolve_defense(
    defender: &Actor,
    log: &mut MessageLog,
    rng: &mut dyn RandomSource,
) -> DelverResult<u32> {
    let (pool, blocks) = roll_pool(defender.stats.defense, defender.stats.defense_chance, rng)?;

    if pool.faces.is_empty() {
        log.add(format!("{} has nothing to defend with.", defender.name));
    } else {
        log.add(format!(
            "{} defends and rolls: {}, blocking {}.",
            defender.name,
            pool.trace(),
            blocks
        ));
    }

    Ok(blocks)
}

/// Applies unblocked hits to `defender`. Returns the damage dealt.
pub fn resolve_damage(defender: &mut Actor, hits: u32, blocks: u32, log: &mut MessageLog) -> i32 {
    let damage = hits.saturating_sub(blocks) as i32;

    if damage > 0 {
        defender.stats.health -= damage;
        log.add(format!("{} takes {} damage.", defender.name, damage));
    } else {
        log.add(format!("{} blocks all damage.", defender.name));
    }

    damage
}

/// Handles a defender at or below zero health.
///
/// A slain monster is taken off the map and its gold is returned; a slain
/// player stays where it fell. Returns `None` if the defender is still alive.
pub fn resolve_death(
    map: &mut DungeonMap,
    defender_id: ActorId,
    log: &mut MessageLog,
) -> DelverResult<Option<i32>> {
    let defender = map
        .actor(defender_id)
        .ok_or(DelverError::UnknownActor(defender_id))?;
    if defender.is_alive() {
        return Ok(None);
    }

    if defender.is_player() {
        log.add(format!("{} was slain. Game over.", defender.name));
        log::info!("{} died", defender.name);
        return Ok(Some(0));
    }

    let monster = map
        .remove_monster(defender_id)
        .ok_or(DelverError::UnknownActor(defender_id))?;
    log.add(format!(
        "{} dies and drops {} gold.",
        monster.name, monster.stats.gold
    ));
    log::debug!("{} #{} removed from the map", monster.name, defender_id);
    Ok(Some(monster.stats.gold))
}

/// Resolves one full melee exchange between two actors on `map`.
///
/// # Examples
///
/// ```
/// use delver::{resolve_melee, Actor, ActorStats, DungeonMap, MessageLog, Position, SeededRandom};
///
/// let mut map = DungeonMap::new(5, 3);
/// for x in 1..4 {
///     map.set_cell_properties(Position::new(x, 1), true, true, true);
/// }
/// let player = map.place_player(Actor::new_player("Rogue").with_position(Position::new(1, 1))).unwrap();
/// let stats = ActorStats { health: 1, max_health: 1, defense: 0, ..ActorStats::player_defaults() };
/// let rat = map.add_monster(Actor::monster("Rat", 'r', stats).with_position(Position::new(2, 1))).unwrap();
///
/// let mut log = MessageLog::new();
/// let outcome = resolve_melee(&mut map, &mut log, &mut SeededRandom::new(1), player, rat).unwrap();
/// assert!(outcome.damage >= 0);
/// assert_eq!(outcome.defender_died, map.actor(rat).is_none());
/// ```
pub fn resolve_melee(
    map: &mut DungeonMap,
    log: &mut MessageLog,
    rng: &mut dyn RandomSource,
    attacker_id: ActorId,
    defender_id: ActorId,
) -> DelverResult<CombatOutcome> {
    let attacker = map
        .actor(attacker_id)
        .ok_or(DelverError::UnknownActor(attacker_id))?
        .clone();
    if !attacker.is_alive() {
        return Err(DelverError::InvalidAction(format!(
            "{} cannot attack while dead",
            attacker.name
        )));
    }

    let mut outcome = CombatOutcome::default();
    {
        let defender = map
            .actor(defender_id)
            .ok_or(DelverError::UnknownActor(defender_id))?;

        outcome.hits = resolve_attack(&attacker, defender, log, rng)?;
        if outcome.hits > 0 {
            outcome.blocks = resolve_defense(defender, log, rng)?;
        }
    }

    let defender = map
        .actor_mut(defender_id)
        .ok_or(DelverError::UnknownActor(defender_id))?;
    outcome.damage = resolve_damage(defender, outcome.hits, outcome.blocks, log);

    if let Some(gold) = resolve_death(map, defender_id, log)? {
        outcome.defender_died = true;
        outcome.gold_dropped = gold;
    }

    Ok(outcome)
}
