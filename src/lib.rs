//! # Delver
//!
//! The turn-based simulation core of a grid-world roguelike.
//!
//! ## Architecture Overview
//!
//! Everything that decides *what happens* in a session lives here; drawing and
//! input belong to whatever front end embeds the crate. The core is built from
//! a handful of pieces:
//!
//! - **Random Source**: one seeded source of uniform integers, injected everywhere
//! - **Dice Engine**: `NdM[+K]` expressions with per-die results
//! - **Generation System**: room-and-corridor dungeons plus monster spawning
//! - **Map**: cell walkability, actor placement and field-of-view triggers
//! - **Scheduler**: the time-ordered queue that decides who acts next
//! - **Combat**: dice-pool hit/block resolution with death and loot
//! - **Game State**: the simulation context that owns all of the above
//!
//! ## Determinism
//!
//! A session is fully reproducible from its [`GenerationConfig`] seed. All
//! randomness flows through a single [`RandomSource`], so replaying a session
//! only requires replaying the player's actions.

pub mod game;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use utils::*;

pub use game::{
    // From actors
    Actor,
    ActorKind,
    ActorStats,
    MonsterState,
    // From combat
    CombatOutcome,
    // From map
    Cell,
    DungeonMap,
    // From message log
    MessageLog,
    // From scheduler
    Scheduler,
    // From state
    GameCompletionState,
    GameState,
    GameStatistics,
    PlayerAction,
    TurnOutcome,
};

pub use generation::{GenerationConfig, Generator, MapGenerator, MonsterTemplate, Room};

pub use utils::{DiceExpression, DiceRoll, FieldOfView, RandomSource, SeededRandom};

/// Core error type for the Delver simulation engine.
#[derive(thiserror::Error, Debug)]
pub enum DelverError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Configuration values cannot produce a map
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Room placement accepted no rooms at all
    #[error("Generation produced no rooms after {attempts} placement attempts")]
    GenerationDegenerate { attempts: u32 },

    /// The scheduler was asked for the next entity while empty
    #[error("Schedule is empty")]
    EmptySchedule,

    /// An entity was added to the scheduler twice
    #[error("Entity is already scheduled: {0}")]
    AlreadyScheduled(String),

    /// Dice expression or dice parameters are malformed
    #[error("Invalid dice: {0}")]
    InvalidDice(String),

    /// No live actor has the given id
    #[error("Unknown actor: {0}")]
    UnknownActor(game::ActorId),
}

/// Result type used throughout the Delver codebase.
pub type DelverResult<T> = Result<T, DelverError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation configuration constants.
pub mod config {
    /// Default map width in cells
    pub const DEFAULT_MAP_WIDTH: i32 = 80;

    /// Default map height in cells
    pub const DEFAULT_MAP_HEIGHT: i32 = 48;

    /// Largest map area accepted by generation
    pub const MAX_MAP_CELLS: i64 = 1_000_000;

    /// Default number of room placement attempts per map
    pub const DEFAULT_MAX_ROOMS: u32 = 20;

    /// Default smallest room side
    pub const DEFAULT_ROOM_MIN_SIZE: i32 = 7;

    /// Default largest room side
    pub const DEFAULT_ROOM_MAX_SIZE: i32 = 13;

    /// Default upper bound of the per-room monster count die
    pub const DEFAULT_MAX_MONSTERS_PER_ROOM: u32 = 4;

    /// A room gets monsters when a d10 rolls below this value
    pub const DEFAULT_MONSTER_SPAWN_CHANCE: i32 = 7;

    /// Lines kept by the message log
    pub const MESSAGE_LOG_CAPACITY: usize = 9;

    /// Random samples taken when looking for a spawn cell in a room
    pub const SPAWN_SAMPLE_ATTEMPTS: u32 = 100;

    /// Faces on every combat die
    pub const COMBAT_DIE_FACES: u32 = 100;

    /// Turns a monster keeps chasing after it was alerted
    pub const MONSTER_ALERT_TURNS: u32 = 15;
}
