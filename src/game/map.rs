//! # Dungeon Map
//!
//! The cell grid, the rooms carved into it and the actors standing on it.
//!
//! The map is the only place cell walkability changes once generation is
//! done. Every actor makes its cell non-walkable while it stands there, so a
//! single walkability check rejects both walls and occupied cells. The player's
//! field of view is recomputed whenever the player moves, and everything seen
//! is remembered as explored.

use crate::config;
use crate::game::{Actor, ActorId, Position};
use crate::generation::Room;
use crate::utils::{FieldOfView, RandomSource, TransparencyMap};
use crate::{DelverError, DelverResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Light passes through
    pub transparent: bool,
    /// An actor may step here
    pub walkable: bool,
    /// The player has seen this cell at least once
    pub explored: bool,
}

/// Fixed-size row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGrid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Creates a grid of solid, unexplored cells.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Whether `pos` lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// The cell at `pos`, if in bounds.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }
}

impl TransparencyMap for CellGrid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_transparent(&self, pos: Position) -> bool {
        self.get(pos).map(|cell| cell.transparent).unwrap_or(false)
    }
}

/// A dungeon level: cells, rooms and the actors living on it.
///
/// # Examples
///
/// ```
/// use delver::{Actor, DungeonMap, Position, Room};
///
/// let mut map = DungeonMap::new(10, 10);
/// let room = Room::new(1, 1, 8, 8);
/// for pos in room.interior_positions() {
///     map.set_cell_properties(pos, true, true, true);
/// }
///
/// let player_id = map
///     .place_player(Actor::new_player("Rogue").with_position(Position::new(5, 5)))
///     .unwrap();
/// assert!(!map.is_walkable(Position::new(5, 5)));
///
/// // Walls reject the move without side effects.
/// assert!(!map.set_actor_position(player_id, Position::new(0, 5)));
/// assert!(map.set_actor_position(player_id, Position::new(5, 4)));
/// assert!(map.is_walkable(Position::new(5, 5)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DungeonMap {
    grid: CellGrid,
    fov: FieldOfView,
    rooms: Vec<Room>,
    actors: Vec<Actor>,
    player_id: Option<ActorId>,
    next_actor_id: ActorId,
}

impl DungeonMap {
    /// Creates a map where every cell is solid, opaque and unexplored.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            grid: CellGrid::new(width, height),
            fov: FieldOfView::new(width, height),
            rooms: Vec::new(),
            actors: Vec::new(),
            player_id: None,
            next_actor_id: 1,
        }
    }

    /// Map width in cells.
    pub fn width(&self) -> i32 {
        self.grid.width
    }

    /// Map height in cells.
    pub fn height(&self) -> i32 {
        self.grid.height
    }

    /// The underlying cell grid.
    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Whether `pos` lies inside the map.
    pub fn in_bounds(&self, pos: Position) -> bool {
        self.grid.in_bounds(pos)
    }

    /// The cell at `pos`, if in bounds.
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.grid.get(pos)
    }

    /// Every cell with its position, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        let width = self.grid.width.max(1);
        self.grid
            .cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Position::new(i as i32 % width, i as i32 / width), *cell))
    }

    /// Walkable and unoccupied. Out-of-bounds cells are never walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.cell(pos).map(|cell| cell.walkable).unwrap_or(false)
    }

    /// Whether light passes through the cell.
    pub fn is_transparent(&self, pos: Position) -> bool {
        self.grid.is_transparent(pos)
    }

    /// Whether the player has ever seen the cell.
    pub fn is_explored(&self, pos: Position) -> bool {
        self.cell(pos).map(|cell| cell.explored).unwrap_or(false)
    }

    /// Whether the cell is in the player's current field of view.
    pub fn is_in_fov(&self, pos: Position) -> bool {
        self.fov.is_in_fov(pos)
    }

    /// Overwrites the three flags of a cell. Returns false out of bounds.
    pub fn set_cell_properties(
        &mut self,
        pos: Position,
        transparent: bool,
        walkable: bool,
        explored: bool,
    ) -> bool {
        self.grid.set(
            pos,
            Cell {
                transparent,
                walkable,
                explored,
            },
        )
    }

    fn set_walkable(&mut self, pos: Position, walkable: bool) {
        if let Some(cell) = self.cell(pos) {
            self.set_cell_properties(pos, cell.transparent, walkable, cell.explored);
        }
    }

    /// Rooms in creation order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Appends a room to the room sequence. Carving is up to the caller.
    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    /// Every live actor in insertion order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    /// Every live monster in insertion order.
    pub fn monsters(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|actor| actor.is_monster())
    }

    /// The player's id, once placed.
    pub fn player_id(&self) -> Option<ActorId> {
        self.player_id
    }

    /// The player, once placed.
    pub fn player(&self) -> Option<&Actor> {
        self.player_id.and_then(|id| self.actor(id))
    }

    /// The actor with the given id.
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    /// Mutable access to an actor's stats and name. Positions stay map-owned.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|actor| actor.id == id)
    }

    /// The actor standing on `pos`, player included.
    pub fn actor_at(&self, pos: Position) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.position == pos)
    }

    /// The first live monster standing on `pos`.
    pub fn monster_at(&self, pos: Position) -> Option<&Actor> {
        self.monsters().find(|actor| actor.position == pos)
    }

    /// Places the player on its current position and computes its view.
    ///
    /// The target cell must be walkable, and a map holds one player at most.
    pub fn place_player(&mut self, player: Actor) -> DelverResult<ActorId> {
        if !player.is_player() {
            return Err(DelverError::InvalidAction(format!(
                "{} is not a player",
                player.name
            )));
        }
        if self.player_id.is_some() {
            return Err(DelverError::InvalidState(
                "map already has a player".to_string(),
            ));
        }

        let id = self.insert_actor(player)?;
        self.player_id = Some(id);
        self.update_player_field_of_view();
        Ok(id)
    }

    /// Adds a monster on its current position, making that cell non-walkable.
    pub fn add_monster(&mut self, monster: Actor) -> DelverResult<ActorId> {
        if !monster.is_monster() {
            return Err(DelverError::InvalidAction(format!(
                "{} is not a monster",
                monster.name
            )));
        }
        self.insert_actor(monster)
    }

    fn insert_actor(&mut self, mut actor: Actor) -> DelverResult<ActorId> {
        let pos = actor.position;
        if !self.is_walkable(pos) {
            return Err(DelverError::InvalidAction(format!(
                "cannot place {} on {}: cell is not walkable",
                actor.name, pos
            )));
        }

        actor.id = self.next_actor_id;
        self.next_actor_id += 1;
        self.set_walkable(pos, false);

        let id = actor.id;
        log::debug!("placed {} #{} at {}", actor.name, id, pos);
        self.actors.push(actor);
        Ok(id)
    }

    /// Removes a monster and frees its cell. Returns `None` for the player or
    /// an unknown id.
    pub fn remove_monster(&mut self, id: ActorId) -> Option<Actor> {
        let index = self
            .actors
            .iter()
            .position(|actor| actor.id == id && actor.is_monster())?;
        let monster = self.actors.remove(index);
        self.set_walkable(monster.position, true);
        Some(monster)
    }

    /// Moves an actor if the destination is walkable.
    ///
    /// On success the old cell becomes walkable, the new one non-walkable, and
    /// the player's field of view is refreshed when the player moved. On
    /// failure nothing changes.
    pub fn set_actor_position(&mut self, id: ActorId, pos: Position) -> bool {
        if !self.is_walkable(pos) {
            return false;
        }
        let Some(index) = self.actors.iter().position(|actor| actor.id == id) else {
            return false;
        };

        let from = self.actors[index].position;
        self.set_walkable(from, true);
        self.actors[index].position = pos;
        self.set_walkable(pos, false);

        if self.actors[index].is_player() {
            self.update_player_field_of_view();
        }
        true
    }

    /// Recomputes the player's field of view and marks everything in it explored.
    ///
    /// Exploration only ever grows. Does nothing before a player is placed.
    pub fn update_player_field_of_view(&mut self) {
        let Some((origin, radius)) = self
            .player()
            .map(|player| (player.position, player.stats.awareness))
        else {
            return;
        };

        self.fov.compute(&self.grid, origin, radius, true);
        for pos in self.fov.visible_positions() {
            if let Some(cell) = self.cell(pos) {
                self.set_cell_properties(pos, cell.transparent, cell.walkable, true);
            }
        }
    }

    /// Computes a view from an arbitrary origin without touching the player's.
    pub fn field_of_view_from(&self, origin: Position, radius: i32) -> FieldOfView {
        let mut fov = FieldOfView::new(self.width(), self.height());
        fov.compute(&self.grid, origin, radius, true);
        fov
    }

    /// Whether any interior cell of `room` is currently walkable.
    pub fn room_has_walkable_space(&self, room: &Room) -> bool {
        room.interior_positions()
            .into_iter()
            .any(|pos| self.is_walkable(pos))
    }

    /// Picks a random walkable interior cell of `room` for spawning.
    ///
    /// Returns `None` right away when the room has no walkable interior at
    /// all, and also when the bounded random search misses every free cell.
    pub fn random_walkable_location_in_room(
        &self,
        room: &Room,
        rng: &mut dyn RandomSource,
    ) -> Option<Position> {
        if !self.room_has_walkable_space(room) {
            return None;
        }

        for _ in 0..config::SPAWN_SAMPLE_ATTEMPTS {
            let x = rng.next_range(room.left() + 1, room.right() - 1);
            let y = rng.next_range(room.top() + 1, room.bottom() - 1);
            let pos = Position::new(x, y);
            if self.is_walkable(pos) {
                return Some(pos);
            }
        }

        None
    }

    /// Checks the occupancy invariants: every actor stands in bounds on a
    /// non-walkable cell, and no two actors share a cell.
    pub fn validate_occupancy(&self) -> DelverResult<()> {
        let mut seen = HashSet::new();
        for actor in &self.actors {
            let pos = actor.position;
            if !self.in_bounds(pos) {
                return Err(DelverError::InvalidState(format!(
                    "{} #{} is out of bounds at {}",
                    actor.name, actor.id, pos
                )));
            }
            if self.is_walkable(pos) {
                return Err(DelverError::InvalidState(format!(
                    "cell {} under {} #{} is walkable",
                    pos, actor.name, actor.id
                )));
            }
            if !seen.insert(pos) {
                return Err(DelverError::InvalidState(format!(
                    "more than one actor on {}",
                    pos
                )));
            }
        }
        Ok(())
    }
}
