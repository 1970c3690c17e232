//! # Encounter Generation
//!
//! Monster templates and the pass that fills generated rooms with them.

use crate::game::{Actor, ActorStats, DungeonMap};
use crate::generation::GenerationConfig;
use crate::utils::{DiceExpression, RandomSource};
use crate::DelverResult;
use serde::{Deserialize, Serialize};

/// A monster blueprint whose stats are rolled at spawn time.
///
/// Attack and defense grow by one for every `level_step` dungeon levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub symbol: char,
    pub health: DiceExpression,
    pub attack: DiceExpression,
    pub attack_chance: DiceExpression,
    pub defense: DiceExpression,
    pub defense_chance: DiceExpression,
    pub gold: DiceExpression,
    pub awareness: i32,
    pub speed: i32,
    pub level_step: i32,
}

impl MonsterTemplate {
    /// The kobold, the only monster the default dungeon spawns.
    pub fn kobold() -> Self {
        Self {
            name: "Kobold".to_string(),
            symbol: 'k',
            health: DiceExpression::new(2, 5, 0),
            attack: DiceExpression::new(1, 3, 0),
            attack_chance: DiceExpression::new(25, 3, 0),
            defense: DiceExpression::new(1, 3, 0),
            defense_chance: DiceExpression::new(10, 4, 0),
            gold: DiceExpression::new(5, 5, 0),
            awareness: 10,
            speed: 14,
            level_step: 3,
        }
    }

    /// Rolls a fresh monster for the given dungeon level.
    ///
    /// # Examples
    ///
    /// ```
    /// use delver::{MonsterTemplate, SeededRandom};
    ///
    /// let mut rng = SeededRandom::new(11);
    /// let kobold = MonsterTemplate::kobold().spawn(1, &mut rng).unwrap();
    /// assert_eq!(kobold.symbol, 'k');
    /// assert!(kobold.stats.health >= 2 && kobold.stats.health <= 10);
    /// assert_eq!(kobold.stats.health, kobold.stats.max_health);
    /// ```
    pub fn spawn(&self, level: i32, rng: &mut dyn RandomSource) -> DelverResult<Actor> {
        let bonus = if self.level_step > 0 {
            level / self.level_step
        } else {
            0
        };

        let health = self.health.roll(rng)?;
        let stats = ActorStats {
            attack: self.attack.roll(rng)? + bonus,
            attack_chance: self.attack_chance.roll(rng)?,
            defense: self.defense.roll(rng)? + bonus,
            defense_chance: self.defense_chance.roll(rng)?,
            gold: self.gold.roll(rng)?,
            health,
            max_health: health,
            speed: self.speed,
            awareness: self.awareness,
        };

        Ok(Actor::monster(self.name.clone(), self.symbol, stats))
    }
}

/// Spawns monsters into the rooms of a generated map.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    pub template: MonsterTemplate,
}

impl EncounterGenerator {
    /// An encounter generator that spawns kobolds.
    pub fn new() -> Self {
        Self::with_template(MonsterTemplate::kobold())
    }

    pub fn with_template(template: MonsterTemplate) -> Self {
        Self { template }
    }

    /// Rolls for monsters room by room and places them.
    ///
    /// A room is populated when a d10 comes up below the spawn chance; it then
    /// gets between one and `max_monsters_per_room` monsters. A monster with
    /// nowhere to stand is skipped. Returns how many monsters were placed.
    pub fn populate(
        &self,
        map: &mut DungeonMap,
        config: &GenerationConfig,
        rng: &mut dyn RandomSource,
    ) -> DelverResult<usize> {
        if config.max_monsters_per_room == 0 {
            return Ok(0);
        }

        let mut placed = 0;
        for room in map.rooms().to_vec() {
            if rng.next_range(1, 10) >= config.monster_spawn_chance {
                continue;
            }

            let count = rng.next_range(1, config.max_monsters_per_room as i32);
            for _ in 0..count {
                let Some(pos) = map.random_walkable_location_in_room(&room, rng) else {
                    log::warn!(
                        "no free cell for a {} in room at ({}, {}), skipping",
                        self.template.name,
                        room.x,
                        room.y
                    );
                    continue;
                };

                let monster = self
                    .template
                    .spawn(config.dungeon_level, rng)?
                    .with_position(pos);
                map.add_monster(monster)?;
                placed += 1;
            }
        }

        log::debug!("spawned {} monsters across {} rooms", placed, map.rooms().len());
        Ok(placed)
    }
}

impl Default for EncounterGenerator {
    fn default() -> Self {
        Self::new()
    }
}
