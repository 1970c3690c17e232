//! # Actors
//!
//! The player and the monsters: identity, combat stats and position.
//!
//! Both variants share the same stat block; what differs is captured by
//! [`ActorKind`], which the map, the combat resolver and the turn loop match
//! on exhaustively.

use crate::game::{ActorId, Position};
use serde::{Deserialize, Serialize};

/// Combat and movement statistics shared by every actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorStats {
    /// Number of d100 rolled when attacking
    pub attack: i32,
    /// Percent chance for each attack die to hit
    pub attack_chance: i32,
    /// Number of d100 rolled when defending
    pub defense: i32,
    /// Percent chance for each defense die to block
    pub defense_chance: i32,
    /// Current health; the actor dies at zero or below
    pub health: i32,
    /// Health ceiling
    pub max_health: i32,
    /// Gold carried (dropped on death)
    pub gold: i32,
    /// Movement speed. Carried for completeness; turn order does not use it.
    pub speed: i32,
    /// Sight radius in cells
    pub awareness: i32,
}

impl ActorStats {
    /// The stat block every new player starts with.
    pub fn player_defaults() -> Self {
        Self {
            attack: 2,
            attack_chance: 50,
            defense: 2,
            defense_chance: 40,
            health: 100,
            max_health: 100,
            gold: 0,
            speed: 10,
            awareness: 15,
        }
    }
}

/// Per-monster AI memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonsterState {
    /// Turns spent chasing the player since the monster noticed them
    pub turns_alerted: Option<u32>,
}

impl MonsterState {
    /// Whether the monster is currently chasing the player.
    pub fn is_alerted(&self) -> bool {
        self.turns_alerted.is_some()
    }
}

/// The two kinds of actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    /// The single player-controlled actor
    Player,
    /// A computer-controlled monster
    Monster(MonsterState),
}

/// Anything that stands on the map and takes turns.
///
/// The position is owned by the map: it can only change through
/// [`DungeonMap::set_actor_position`](crate::DungeonMap::set_actor_position),
/// which keeps cell walkability in sync.
///
/// # Examples
///
/// ```
/// use delver::{Actor, Position};
///
/// let player = Actor::new_player("Rogue").with_position(Position::new(3, 4));
/// assert!(player.is_player());
/// assert!(player.is_alive());
/// assert_eq!(player.position(), Position::new(3, 4));
/// assert_eq!(player.health_ratio(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub(crate) id: ActorId,
    /// Display name used in narration
    pub name: String,
    /// Map glyph
    pub symbol: char,
    /// Combat statistics
    pub stats: ActorStats,
    pub(crate) position: Position,
    kind: ActorKind,
}

impl Actor {
    /// Creates a player with the given stats.
    pub fn player(name: impl Into<String>, stats: ActorStats) -> Self {
        Self {
            id: 0,
            name: name.into(),
            symbol: '@',
            stats,
            position: Position::new(0, 0),
            kind: ActorKind::Player,
        }
    }

    /// Creates a player with the default stat block.
    pub fn new_player(name: impl Into<String>) -> Self {
        Self::player(name, ActorStats::player_defaults())
    }

    /// Creates a monster that has not noticed anyone yet.
    pub fn monster(name: impl Into<String>, symbol: char, stats: ActorStats) -> Self {
        Self {
            id: 0,
            name: name.into(),
            symbol,
            stats,
            position: Position::new(0, 0),
            kind: ActorKind::Monster(MonsterState::default()),
        }
    }

    /// Sets where the actor will be placed when added to a map.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// The id assigned by the map. Zero until the actor is placed.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Player or monster.
    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    /// Whether this is the player.
    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player)
    }

    /// Whether this is a monster.
    pub fn is_monster(&self) -> bool {
        matches!(self.kind, ActorKind::Monster(_))
    }

    /// Alive while health stays above zero.
    pub fn is_alive(&self) -> bool {
        self.stats.health > 0
    }

    /// Current over maximum health, clamped to `[0, 1]`, for health bars.
    pub fn health_ratio(&self) -> f32 {
        if self.stats.max_health <= 0 {
            return 0.0;
        }
        (self.stats.health as f32 / self.stats.max_health as f32).clamp(0.0, 1.0)
    }

    /// AI memory, for monsters only.
    pub fn monster_state(&self) -> Option<&MonsterState> {
        match &self.kind {
            ActorKind::Monster(state) => Some(state),
            ActorKind::Player => None,
        }
    }

    /// Mutable AI memory, for monsters only.
    pub fn monster_state_mut(&mut self) -> Option<&mut MonsterState> {
        match &mut self.kind {
            ActorKind::Monster(state) => Some(state),
            ActorKind::Player => None,
        }
    }
}
