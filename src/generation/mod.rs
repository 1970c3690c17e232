//! # Generation Module
//!
//! Procedural content generation: dungeon layouts and the monsters that
//! populate them.
//!
//! This module provides the configuration shared by every generator, the
//! [`Room`] rectangle the layout is built from, and the [`Generator`] trait
//! the concrete generators implement. Generation is deterministic: the same
//! configuration and random source always produce the same map.

pub mod dungeon;
pub mod encounters;

pub use dungeon::*;
pub use encounters::*;

use crate::config;
use crate::game::{DungeonMap, Position};
use crate::utils::RandomSource;
use crate::{DelverError, DelverResult};
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Missing fields fall back to the defaults when deserialized, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in cells
    pub width: i32,
    /// Map height in cells
    pub height: i32,
    /// Number of room placement attempts (an upper bound on the room count)
    pub max_rooms: u32,
    /// Smallest room side
    pub room_min_size: i32,
    /// Largest room side
    pub room_max_size: i32,
    /// Upper bound of the per-room monster count die
    pub max_monsters_per_room: u32,
    /// A room gets monsters when a d10 rolls below this value
    pub monster_spawn_chance: i32,
    /// Dungeon depth, used to scale monster stats
    pub dungeon_level: i32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delver::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.seed, 12345);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DEFAULT_MAP_WIDTH,
            height: config::DEFAULT_MAP_HEIGHT,
            max_rooms: config::DEFAULT_MAX_ROOMS,
            room_min_size: config::DEFAULT_ROOM_MIN_SIZE,
            room_max_size: config::DEFAULT_ROOM_MAX_SIZE,
            max_monsters_per_room: config::DEFAULT_MAX_MONSTERS_PER_ROOM,
            monster_spawn_chance: config::DEFAULT_MONSTER_SPAWN_CHANCE,
            dungeon_level: 1,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 40,
            height: 30,
            max_rooms: 10,
            room_min_size: 4,
            room_max_size: 8,
            max_monsters_per_room: 2,
            monster_spawn_chance: config::DEFAULT_MONSTER_SPAWN_CHANCE,
            dungeon_level: 1,
        }
    }

    /// Checks that rooms of every allowed size fit on the map.
    pub fn validate(&self) -> DelverResult<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(DelverError::InvalidConfig(format!(
                "map size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.width as i64 * self.height as i64 > config::MAX_MAP_CELLS {
            return Err(DelverError::InvalidConfig(format!(
                "map size {}x{} exceeds {} cells",
                self.width,
                self.height,
                config::MAX_MAP_CELLS
            )));
        }
        if self.room_min_size < 2 {
            return Err(DelverError::InvalidConfig(format!(
                "room_min_size {} leaves no interior",
                self.room_min_size
            )));
        }
        if self.room_max_size < self.room_min_size {
            return Err(DelverError::InvalidConfig(format!(
                "room_max_size {} is below room_min_size {}",
                self.room_max_size, self.room_min_size
            )));
        }
        if self.room_max_size >= self.width || self.room_max_size >= self.height {
            return Err(DelverError::InvalidConfig(format!(
                "rooms up to {} cells do not fit a {}x{} map",
                self.room_max_size, self.width, self.height
            )));
        }
        if self.dungeon_level < 1 {
            return Err(DelverError::InvalidConfig(format!(
                "dungeon_level {} must be at least 1",
                self.dungeon_level
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// An axis-aligned rectangle that becomes a room once carved.
///
/// The edges follow the usual half-open convention: `right` and `bottom` are
/// one past the last column and row covered by `x + width` and `y + height`.
/// Only the cells strictly inside the edges are carved, so the edge cells
/// themselves remain walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Horizontal extent
    pub width: i32,
    /// Vertical extent
    pub height: i32,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use delver::{Position, Room};
    ///
    /// let room = Room::new(5, 5, 10, 8);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert_eq!(room.right(), 15);
    /// assert_eq!(room.bottom(), 13);
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge column.
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Right edge column, `x + width`.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Top edge row.
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Bottom edge row, `y + height`.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Checks if this room overlaps with another room.
    ///
    /// Rooms that only share an edge do not intersect.
    pub fn intersects(&self, other: &Room) -> bool {
        other.left() < self.right()
            && self.left() < other.right()
            && other.top() < self.bottom()
            && self.top() < other.bottom()
    }

    /// Whether `pos` is strictly inside the edges, i.e. a carved cell.
    pub fn contains_interior(&self, pos: Position) -> bool {
        pos.x > self.left() && pos.x < self.right() && pos.y > self.top() && pos.y < self.bottom()
    }

    /// Every interior cell, row by row.
    pub fn interior_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in (self.top() + 1)..self.bottom() {
            for x in (self.left() + 1)..self.right() {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this trait, so callers can run and check
/// any of them the same way.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random source.
    fn generate(&self, config: &GenerationConfig, rng: &mut dyn RandomSource) -> DelverResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelverResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::utils::SeededRandom;

    /// Creates a seeded random source from the config.
    pub fn create_rng(config: &GenerationConfig) -> SeededRandom {
        SeededRandom::new(config.seed)
    }

    /// Validates that a map meets the layout invariants.
    ///
    /// The map must have at least one room, no two rooms may intersect, and a
    /// placed player must stand inside the first room.
    pub fn validate_map(map: &DungeonMap) -> DelverResult<()> {
        let rooms = map.rooms();
        let first = rooms.first().ok_or(DelverError::GenerationDegenerate { attempts: 0 })?;

        for (i, room) in rooms.iter().enumerate() {
            if let Some(other) = rooms[i + 1..].iter().find(|other| room.intersects(other)) {
                return Err(DelverError::InvalidState(format!(
                    "rooms {:?} and {:?} intersect",
                    room, other
                )));
            }
        }

        if let Some(player) = map.player() {
            if !first.contains_interior(player.position()) {
                return Err(DelverError::InvalidState(format!(
                    "player at {} is outside the first room",
                    player.position()
                )));
            }
        }

        map.validate_occupancy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert!(config.room_min_size >= 2);
        assert!(config.room_max_size >= config.room_min_size);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing(1).validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_oversized_rooms() {
        let mut config = GenerationConfig::for_testing(1);
        config.room_max_size = config.width;
        assert!(matches!(
            config.validate(),
            Err(DelverError::InvalidConfig(_))
        ));

        let mut config = GenerationConfig::for_testing(1);
        config.room_min_size = 9;
        config.room_max_size = 5;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::for_testing(1);
        config.dungeon_level = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_huge_maps() {
        let config = GenerationConfig {
            width: 70_000,
            height: 70_000,
            ..GenerationConfig::new(1)
        };
        assert!(matches!(
            config.validate(),
            Err(DelverError::InvalidConfig(_))
        ));

        let config = GenerationConfig {
            width: 1000,
            height: 1000,
            ..GenerationConfig::new(1)
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: GenerationConfig = serde_json::from_str(r#"{"seed": 7, "max_rooms": 3}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_rooms, 3);
        assert_eq!(config.width, GenerationConfig::default().width);
    }

    #[test]
    fn test_room_edges_and_center() {
        let room = Room::new(5, 5, 10, 8);
        assert_eq!(room.left(), 5);
        assert_eq!(room.right(), 15);
        assert_eq!(room.top(), 5);
        assert_eq!(room.bottom(), 13);
        assert_eq!(room.center(), Position::new(10, 9));
    }

    #[test]
    fn test_room_intersection() {
        let room1 = Room::new(5, 5, 10, 8);
        let room2 = Room::new(10, 8, 6, 6); // Overlaps
        let room3 = Room::new(20, 20, 5, 5); // No overlap
        let touching = Room::new(15, 5, 4, 4); // Shares the x = 15 edge

        assert!(room1.intersects(&room2));
        assert!(room2.intersects(&room1));
        assert!(!room1.intersects(&room3));
        assert!(!room3.intersects(&room1));
        assert!(!room1.intersects(&touching));
        assert!(room1.intersects(&room1));
    }

    #[test]
    fn test_room_interior() {
        let room = Room::new(5, 5, 4, 4);
        let interior = room.interior_positions();

        // edges at 5 and 9 leave 6..=8 on each axis
        assert_eq!(interior.len(), 9);
        assert!(interior.iter().all(|&pos| room.contains_interior(pos)));
        assert!(!room.contains_interior(Position::new(5, 6)));
        assert!(!room.contains_interior(Position::new(9, 6)));

        let unique: HashSet<_> = interior.into_iter().collect();
        assert_eq!(unique.len(), 9);
    }

    #[test]
    fn test_utils_rng_creation() {
        let config = GenerationConfig::new(12345);
        let mut a = utils::create_rng(&config);
        let mut b = utils::create_rng(&config);
        assert_eq!(a.next_range(0, 1000), b.next_range(0, 1000));
    }

    #[test]
    fn test_validate_map_rejects_empty_room_list() {
        let map = DungeonMap::new(10, 10);
        assert!(matches!(
            utils::validate_map(&map),
            Err(DelverError::GenerationDegenerate { .. })
        ));
    }

    #[test]
    fn test_validate_map_rejects_intersecting_rooms() {
        let mut map = DungeonMap::new(30, 30);
        map.add_room(Room::new(1, 1, 8, 8));
        map.add_room(Room::new(5, 5, 8, 8));
        assert!(utils::validate_map(&map).is_err());
    }
}
