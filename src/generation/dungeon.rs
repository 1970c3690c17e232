//! # Dungeon Generation
//!
//! Room-and-corridor layout generation.
//!
//! Rooms are dropped at random and kept only when they overlap nothing placed
//! before them. Each accepted room is then joined to the previous one by an
//! L-shaped corridor, which makes every room reachable from the first.

use crate::game::{Actor, DungeonMap, Position};
use crate::generation::{utils, EncounterGenerator, GenerationConfig, Generator, Room};
use crate::utils::RandomSource;
use crate::{DelverError, DelverResult};

/// Primary dungeon generator using the room-and-corridor algorithm.
///
/// This generator creates dungeons by:
/// 1. Placing rooms randomly, dropping any that intersect an earlier room
/// 2. Carving room interiors
/// 3. Connecting consecutive rooms with L-shaped corridors
/// 4. Placing the player in the center of the first room
/// 5. Spawning monsters in the rooms
#[derive(Debug, Clone)]
pub struct MapGenerator {
    /// Actor placed at the center of the first room
    pub player: Actor,
    /// Monster spawner run after the player is placed
    pub encounters: EncounterGenerator,
}

impl MapGenerator {
    /// Creates a generator that places a default player.
    ///
    /// # Examples
    ///
    /// ```
    /// use delver::{GenerationConfig, Generator, MapGenerator, SeededRandom};
    ///
    /// let config = GenerationConfig::for_testing(7);
    /// let mut rng = SeededRandom::new(config.seed);
    /// let map = MapGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert!(!map.rooms().is_empty());
    /// assert!(map.player().is_some());
    /// ```
    pub fn new() -> Self {
        Self::with_player(Actor::new_player("Rogue"))
    }

    /// Creates a generator that places the given player.
    pub fn with_player(player: Actor) -> Self {
        Self {
            player,
            encounters: EncounterGenerator::new(),
        }
    }

    /// Attempts `max_rooms` placements and records the accepted rooms on the map.
    fn place_rooms(
        &self,
        map: &mut DungeonMap,
        config: &GenerationConfig,
        rng: &mut dyn RandomSource,
    ) -> DelverResult<()> {
        for _ in 0..config.max_rooms {
            let room = self.generate_room_candidate(config, rng);

            if map.rooms().iter().any(|existing| room.intersects(existing)) {
                continue;
            }
            map.add_room(room);
        }

        if map.rooms().is_empty() {
            return Err(DelverError::GenerationDegenerate {
                attempts: config.max_rooms,
            });
        }

        log::debug!(
            "accepted {} of {} room candidates",
            map.rooms().len(),
            config.max_rooms
        );
        Ok(())
    }

    /// Draws a random rectangle that lies fully inside the map.
    fn generate_room_candidate(
        &self,
        config: &GenerationConfig,
        rng: &mut dyn RandomSource,
    ) -> Room {
        let width = rng.next_range(config.room_min_size, config.room_max_size);
        let height = rng.next_range(config.room_min_size, config.room_max_size);
        let x = rng.next_range(0, config.width - width - 1);
        let y = rng.next_range(0, config.height - height - 1);

        Room::new(x, y, width, height)
    }

    /// Carves a room interior, marking it explored.
    fn carve_room(&self, map: &mut DungeonMap, room: &Room) {
        for pos in room.interior_positions() {
            map.set_cell_properties(pos, true, true, true);
        }
    }

    /// Joins each room to the one created before it.
    fn connect_rooms(&self, map: &mut DungeonMap, rng: &mut dyn RandomSource) {
        let rooms = map.rooms().to_vec();

        for pair in rooms.windows(2) {
            let previous = pair[0].center();
            let current = pair[1].center();

            if rng.coin_flip() {
                self.carve_horizontal_tunnel(map, previous.x, current.x, previous.y);
                self.carve_vertical_tunnel(map, previous.y, current.y, current.x);
            } else {
                self.carve_vertical_tunnel(map, previous.y, current.y, previous.x);
                self.carve_horizontal_tunnel(map, previous.x, current.x, current.y);
            }
        }
    }

    fn carve_horizontal_tunnel(&self, map: &mut DungeonMap, x_start: i32, x_end: i32, y: i32) {
        for x in x_start.min(x_end)..=x_start.max(x_end) {
            self.carve_corridor_cell(map, Position::new(x, y));
        }
    }

    fn carve_vertical_tunnel(&self, map: &mut DungeonMap, y_start: i32, y_end: i32, x: i32) {
        for y in y_start.min(y_end)..=y_start.max(y_end) {
            self.carve_corridor_cell(map, Position::new(x, y));
        }
    }

    /// Opens a corridor cell. Corridors are discovered by sight, so the
    /// explored flag is left as it was.
    fn carve_corridor_cell(&self, map: &mut DungeonMap, pos: Position) {
        if let Some(cell) = map.cell(pos) {
            map.set_cell_properties(pos, true, true, cell.explored);
        }
    }

    /// Puts the player at the center of the first room.
    fn place_player(&self, map: &mut DungeonMap) -> DelverResult<()> {
        let center = map
            .rooms()
            .first()
            .map(Room::center)
            .ok_or(DelverError::GenerationDegenerate { attempts: 0 })?;

        let player = self.player.clone().with_position(center);
        map.place_player(player)?;
        Ok(())
    }
}

impl Generator<DungeonMap> for MapGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut dyn RandomSource) -> DelverResult<DungeonMap> {
        config.validate()?;

        // Create empty map (all walls)
        let mut map = DungeonMap::new(config.width, config.height);

        self.place_rooms(&mut map, config, rng)?;

        for room in map.rooms().to_vec() {
            self.carve_room(&mut map, &room);
        }

        self.connect_rooms(&mut map, rng);

        self.place_player(&mut map)?;

        self.encounters.populate(&mut map, config, rng)?;

        log::info!(
            "{} generated {}x{} map with {} rooms and {} monsters",
            self.generator_type(),
            config.width,
            config.height,
            map.rooms().len(),
            map.monsters().count()
        );

        self.validate(&map, config)?;
        Ok(map)
    }

    fn validate(&self, map: &DungeonMap, _config: &GenerationConfig) -> DelverResult<()> {
        utils::validate_map(map)
    }

    fn generator_type(&self) -> &'static str {
        "MapGenerator"
    }
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new()
    }
}
