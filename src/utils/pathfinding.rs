//! # Pathfinding Algorithms
//!
//! Grid path search for monster chasing and autoexplore.
//!
//! Both searches move in the four cardinal directions only and take the
//! passability test as a closure, so they work on any grid.

use crate::game::Position;
use ::pathfinding::prelude::{astar, bfs};

fn cardinal_successors<F>(pos: Position, goal: Option<Position>, passable: &F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter(|&next| Some(next) == goal || passable(next))
        .collect()
}

/// Finds a shortest 4-connected path from `start` to `goal`.
///
/// Intermediate cells must satisfy `passable`; the goal itself is always
/// accepted, so a path can end on an occupied cell. The returned steps
/// exclude `start` and end with `goal`. Returns `None` when the goal cannot be
/// reached, and an empty path when `start == goal`.
///
/// # Examples
///
/// ```
/// use delver::{find_path, Position};
///
/// let open = |pos: Position| pos.x >= 0 && pos.y >= 0 && pos.x < 5 && pos.y < 5;
/// let path = find_path(Position::new(0, 0), Position::new(2, 1), open).unwrap();
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.last(), Some(&Position::new(2, 1)));
/// ```
pub fn find_path<F>(start: Position, goal: Position, passable: F) -> Option<Vec<Position>>
where
    F: Fn(Position) -> bool,
{
    let (mut path, _cost) = astar(
        &start,
        |&pos| {
            cardinal_successors(pos, Some(goal), &passable)
                .into_iter()
                .map(|next| (next, 1u32))
        },
        |&pos| pos.manhattan_distance(goal),
        |&pos| pos == goal,
    )?;

    path.remove(0);
    Some(path)
}

/// Breadth-first search for the closest cell matching `is_target`.
///
/// Expands through cells satisfying `passable` and returns the steps to the
/// first target found, excluding `start`. `start` itself never counts as a
/// target.
pub fn find_nearest<F, G>(start: Position, passable: F, is_target: G) -> Option<Vec<Position>>
where
    F: Fn(Position) -> bool,
    G: Fn(Position) -> bool,
{
    let mut path = bfs(
        &start,
        |&pos| cardinal_successors(pos, None, &passable),
        |&pos| pos != start && is_target(pos),
    )?;

    path.remove(0);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(width: i32, height: i32) -> impl Fn(Position) -> bool {
        move |pos: Position| pos.x >= 0 && pos.y >= 0 && pos.x < width && pos.y < height
    }

    #[test]
    fn test_straight_corridor() {
        let path = find_path(Position::new(1, 1), Position::new(8, 1), room(10, 3)).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(path[0], Position::new(2, 1));
        assert_eq!(path[path.len() - 1], Position::new(8, 1));
    }

    #[test]
    fn test_path_around_wall() {
        // a wall on column 2 with a gap at y = 4
        let passable = |pos: Position| room(5, 5)(pos) && (pos.x != 2 || pos.y == 4);
        let path = find_path(Position::new(0, 0), Position::new(4, 0), passable).unwrap();

        assert!(path.contains(&Position::new(2, 4)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn test_goal_may_be_blocked() {
        let goal = Position::new(3, 0);
        let passable = move |pos: Position| room(5, 1)(pos) && pos != goal;
        let path = find_path(Position::new(0, 0), goal, passable).unwrap();
        assert_eq!(path, vec![Position::new(1, 0), Position::new(2, 0), goal]);
    }

    #[test]
    fn test_unreachable_goal() {
        let passable = |pos: Position| room(5, 5)(pos) && pos.x != 2;
        assert!(find_path(Position::new(0, 0), Position::new(4, 4), passable).is_none());
    }

    #[test]
    fn test_same_start_and_goal() {
        let here = Position::new(2, 2);
        assert_eq!(find_path(here, here, room(5, 5)), Some(Vec::new()));
    }

    #[test]
    fn test_find_nearest_target() {
        let target = Position::new(4, 2);
        let path = find_nearest(Position::new(0, 2), room(6, 6), |pos| pos == target).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&target));

        assert!(find_nearest(Position::new(0, 2), room(6, 6), |_| false).is_none());
    }
}
