//! # Game State Module
//!
//! Central game state management and coordination between all game systems.
//!
//! [`GameState`] is the explicit simulation context: it owns the map, the turn
//! scheduler, the message log and the random source, and it is the only place
//! where a player action turns into map changes, combat and monster turns.

use crate::game::{
    behavior, combat, Actor, ActorId, CombatOutcome, Direction, DungeonMap, MessageLog,
    MonsterTurn, Position, Scheduler,
};
use crate::generation::{GenerationConfig, Generator, MapGenerator};
use crate::utils::{RandomSource, SeededRandom};
use crate::{DelverError, DelverResult};
use serde::{Deserialize, Serialize};

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Player turns that consumed time
    pub turns_taken: u64,
    /// Successful player moves
    pub steps_taken: u64,
    /// Melee attacks the player started
    pub attacks_made: u64,
    /// Monsters killed by the player
    pub enemies_defeated: u32,
    /// Total damage dealt by the player
    pub damage_dealt: u64,
    /// Total damage taken by the player
    pub damage_taken: u64,
    /// Gold picked up from slain monsters
    pub gold_collected: u64,
}

impl GameStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Game completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCompletionState {
    /// Game is still in progress
    Playing,
    /// Player died
    PlayerDied,
}

/// Something the player can do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Step one cell, attacking a monster standing there
    Move(Direction),
    /// Let the monsters act
    Wait,
}

/// What a player action resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The player moved to the given cell
    Moved(Position),
    /// The player attacked a monster
    Attacked(CombatOutcome),
    /// The player passed the turn
    Waited,
    /// The destination is a wall or off the map; no time passed
    Blocked,
}

impl TurnOutcome {
    /// Whether the action used up the player's turn.
    pub fn consumed_turn(&self) -> bool {
        !matches!(self, TurnOutcome::Blocked)
    }
}

/// Central game state containing all simulation data.
#[derive(Debug)]
pub struct GameState {
    map: DungeonMap,
    scheduler: Scheduler<ActorId>,
    log: MessageLog,
    rng: Box<dyn RandomSource>,
    config: GenerationConfig,
    player_id: ActorId,
    is_player_turn: bool,
    /// Player progress counters
    pub statistics: GameStatistics,
    /// Whether the game is still running
    pub completion_state: GameCompletionState,
}

impl GameState {
    /// Generates a dungeon from `config` and starts a game on it.
    ///
    /// # Examples
    ///
    /// ```
    /// use delver::{GameState, GenerationConfig};
    ///
    /// let game = GameState::new(GenerationConfig::for_testing(12345)).unwrap();
    /// assert!(game.is_player_turn());
    /// assert!(game.player().is_some());
    /// assert!(!game.message_log().is_empty());
    /// ```
    pub fn new(config: GenerationConfig) -> DelverResult<Self> {
        let rng = Box::new(SeededRandom::new(config.seed));
        Self::with_random(config, rng)
    }

    /// Like [`GameState::new`], drawing from the given random source.
    pub fn with_random(config: GenerationConfig, mut rng: Box<dyn RandomSource>) -> DelverResult<Self> {
        let map = MapGenerator::new().generate(&config, rng.as_mut())?;
        Self::from_map(map, config, rng)
    }

    /// Starts a game on an already built map.
    ///
    /// The map must hold a player. The player is scheduled first, then every
    /// monster in placement order, and monsters act until the player is up.
    pub fn from_map(
        map: DungeonMap,
        config: GenerationConfig,
        rng: Box<dyn RandomSource>,
    ) -> DelverResult<Self> {
        let player_id = map
            .player_id()
            .ok_or_else(|| DelverError::InvalidState("map has no player".to_string()))?;
        map.validate_occupancy()?;

        let mut scheduler = Scheduler::new();
        scheduler.add(player_id)?;
        for monster in map.monsters() {
            scheduler.add(monster.id())?;
        }

        let mut state = Self {
            map,
            scheduler,
            log: MessageLog::new(),
            rng,
            config,
            player_id,
            is_player_turn: false,
            statistics: GameStatistics::new(),
            completion_state: GameCompletionState::Playing,
        };

        let name = state.player_name();
        state.log.add(format!(
            "{} arrives on level {}.",
            name, state.config.dungeon_level
        ));
        log::info!(
            "game started: seed {}, {} monsters",
            state.config.seed,
            state.map.monsters().count()
        );

        state.run_monsters()?;
        Ok(state)
    }

    /// The dungeon map.
    pub fn map(&self) -> &DungeonMap {
        &self.map
    }

    /// The turn scheduler.
    pub fn scheduler(&self) -> &Scheduler<ActorId> {
        &self.scheduler
    }

    /// The narration log.
    pub fn message_log(&self) -> &MessageLog {
        &self.log
    }

    /// The configuration the game was started with.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn player_id(&self) -> ActorId {
        self.player_id
    }

    pub fn player(&self) -> Option<&Actor> {
        self.map.player()
    }

    /// Whether the simulation is waiting for a player action.
    pub fn is_player_turn(&self) -> bool {
        self.is_player_turn
    }

    pub fn is_game_over(&self) -> bool {
        self.completion_state != GameCompletionState::Playing
    }

    /// Applies one player action and lets the monsters respond.
    ///
    /// A move into a wall is rejected as [`TurnOutcome::Blocked`] and costs no
    /// time. Every other action ends the player's turn.
    pub fn apply_player_action(&mut self, action: PlayerAction) -> DelverResult<TurnOutcome> {
        if self.is_game_over() {
            return Err(DelverError::InvalidAction(
                "the player is dead".to_string(),
            ));
        }
        if !self.is_player_turn {
            return Err(DelverError::InvalidState(
                "it is not the player's turn".to_string(),
            ));
        }

        let outcome = match action {
            PlayerAction::Move(direction) => self.move_player(direction)?,
            PlayerAction::Wait => TurnOutcome::Waited,
        };

        if outcome.consumed_turn() {
            self.statistics.turns_taken += 1;
            self.is_player_turn = false;
            self.run_monsters()?;
        }

        Ok(outcome)
    }

    fn move_player(&mut self, direction: Direction) -> DelverResult<TurnOutcome> {
        let from = self
            .player()
            .map(Actor::position)
            .ok_or(DelverError::UnknownActor(self.player_id))?;
        let target = from.step(direction);

        if let Some(monster_id) = self.map.monster_at(target).map(Actor::id) {
            let outcome = self.player_attack(monster_id)?;
            return Ok(TurnOutcome::Attacked(outcome));
        }

        if self.map.set_actor_position(self.player_id, target) {
            self.statistics.steps_taken += 1;
            Ok(TurnOutcome::Moved(target))
        } else {
            log::debug!("move from {} to {} blocked", from, target);
            Ok(TurnOutcome::Blocked)
        }
    }

    fn player_attack(&mut self, monster_id: ActorId) -> DelverResult<CombatOutcome> {
        let outcome = combat::resolve_melee(
            &mut self.map,
            &mut self.log,
            self.rng.as_mut(),
            self.player_id,
            monster_id,
        )?;
        self.statistics.attacks_made += 1;
        self.statistics.damage_dealt += outcome.damage as u64;

        if outcome.defender_died {
            self.scheduler.remove(&monster_id);
            self.statistics.enemies_defeated += 1;
            self.statistics.gold_collected += outcome.gold_dropped.max(0) as u64;
            if let Some(player) = self.map.actor_mut(self.player_id) {
                player.stats.gold += outcome.gold_dropped;
            }
        }

        Ok(outcome)
    }

    /// Serves the schedule until it is the player's turn or the player dies.
    fn run_monsters(&mut self) -> DelverResult<()> {
        while !self.is_game_over() {
            let id = self.scheduler.next()?;

            if id == self.player_id {
                self.scheduler.add(id)?;
                self.is_player_turn = true;
                return Ok(());
            }

            if self.map.actor(id).is_none() {
                return Err(DelverError::UnknownActor(id));
            }

            let turn = behavior::take_monster_turn(&mut self.map, &mut self.log, self.rng.as_mut(), id)?;
            self.scheduler.add(id)?;

            if let MonsterTurn::Attacked(outcome) = turn {
                self.statistics.damage_taken += outcome.damage as u64;
                if outcome.defender_died {
                    self.completion_state = GameCompletionState::PlayerDied;
                    log::info!("player died after {} turns", self.statistics.turns_taken);
                }
            }
        }

        Ok(())
    }

    /// Adds a monster to a running game. It acts after everyone already waiting.
    pub fn spawn_monster(&mut self, monster: Actor) -> DelverResult<ActorId> {
        let id = self.map.add_monster(monster)?;
        self.scheduler.add(id)?;
        Ok(id)
    }

    /// Checks the cross-component invariants: actor occupancy on the map, and
    /// that every scheduled id belongs to a live actor.
    pub fn validate(&self) -> DelverResult<()> {
        self.map.validate_occupancy()?;

        for &id in self.scheduler.iter() {
            if self.map.actor(id).is_none() {
                return Err(DelverError::UnknownActor(id));
            }
        }
        for monster in self.map.monsters() {
            if !self.scheduler.contains(&monster.id()) {
                return Err(DelverError::InvalidState(format!(
                    "{} #{} is not scheduled",
                    monster.name,
                    monster.id()
                )));
            }
        }
        Ok(())
    }

    fn player_name(&self) -> String {
        self.player()
            .map(|player| player.name.clone())
            .unwrap_or_default()
    }
}
