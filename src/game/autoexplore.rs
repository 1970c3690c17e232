//! # Autoexplore Module
//!
//! A simple autopilot that picks the player's next action: fight what is
//! adjacent, chase what is visible, otherwise walk to the nearest unexplored
//! floor.

use crate::game::{Direction, DungeonMap, GameState, PlayerAction, Position};
use crate::utils::{find_nearest, find_path};

/// Stateless autoexplore policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Autoexplore;

impl Autoexplore {
    /// Creates a new autoexplore policy.
    pub fn new() -> Self {
        Self
    }

    /// Chooses the next action for the player of `game`.
    ///
    /// Falls back to [`PlayerAction::Wait`] when there is nothing left to do.
    pub fn next_action(&self, game: &GameState) -> PlayerAction {
        let map = game.map();
        let Some(player) = map.player() else {
            return PlayerAction::Wait;
        };
        let origin = player.position();

        if let Some(target) = self.adjacent_monster(map, origin) {
            return self.step_action(origin, target);
        }

        if let Some(step) = self.step_toward_visible_monster(map, origin) {
            return self.step_action(origin, step);
        }

        if let Some(step) = self.step_toward_unexplored(map, origin) {
            return self.step_action(origin, step);
        }

        PlayerAction::Wait
    }

    fn adjacent_monster(&self, map: &DungeonMap, origin: Position) -> Option<Position> {
        origin
            .cardinal_adjacent_positions()
            .into_iter()
            .find(|&pos| map.monster_at(pos).is_some())
    }

    /// First step on a shortest path to the nearest reachable monster in view.
    fn step_toward_visible_monster(&self, map: &DungeonMap, origin: Position) -> Option<Position> {
        map.monsters()
            .filter(|monster| map.is_in_fov(monster.position()))
            .filter_map(|monster| find_path(origin, monster.position(), |pos| map.is_walkable(pos)))
            .min_by_key(Vec::len)
            .and_then(|path| path.first().copied())
    }

    fn step_toward_unexplored(&self, map: &DungeonMap, origin: Position) -> Option<Position> {
        let path = find_nearest(
            origin,
            |pos| map.is_walkable(pos),
            |pos| !map.is_explored(pos),
        )?;
        path.first().copied()
    }

    fn step_action(&self, from: Position, to: Position) -> PlayerAction {
        match Direction::from_delta(to - from) {
            Some(direction) => PlayerAction::Move(direction),
            None => PlayerAction::Wait,
        }
    }
}
