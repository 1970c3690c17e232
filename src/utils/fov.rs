//! # Field of View
//!
//! Ray-cast visibility over any grid that can answer transparency queries.
//!
//! The simulation never decides visibility itself: it asks this primitive to
//! compute a view from an origin and a radius, then reads back which cells are
//! in view.

use crate::game::Position;

/// A grid that can report which cells let light through.
pub trait TransparencyMap {
    /// Grid width in cells.
    fn width(&self) -> i32;

    /// Grid height in cells.
    fn height(&self) -> i32;

    /// Whether light passes through the cell. Out-of-bounds cells are opaque.
    fn is_transparent(&self, pos: Position) -> bool;
}

/// The set of cells visible from the last computed origin.
///
/// # Examples
///
/// ```
/// use delver::{DungeonMap, FieldOfView, Position, Room};
///
/// let mut map = DungeonMap::new(10, 10);
/// let room = Room::new(1, 1, 8, 8);
/// for pos in room.interior_positions() {
///     map.set_cell_properties(pos, true, true, false);
/// }
///
/// let mut fov = FieldOfView::new(10, 10);
/// fov.compute(map.grid(), Position::new(5, 5), 3, true);
/// assert!(fov.is_in_fov(Position::new(5, 3)));
/// assert!(!fov.is_in_fov(Position::new(5, 9)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOfView {
    width: i32,
    height: i32,
    visible: Vec<bool>,
}

impl FieldOfView {
    /// Creates an empty view for a grid of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            visible: vec![false; width as usize * height as usize],
        }
    }

    /// Recomputes visibility from `origin` out to `radius` cells.
    ///
    /// With `light_walls` the first opaque cell hit by each ray is visible too,
    /// which is what makes room walls show up.
    pub fn compute(
        &mut self,
        map: &impl TransparencyMap,
        origin: Position,
        radius: i32,
        light_walls: bool,
    ) {
        if map.width() != self.width || map.height() != self.height {
            *self = Self::new(map.width(), map.height());
        } else {
            self.clear();
        }

        if !self.in_bounds(origin) {
            return;
        }
        self.mark(origin);

        let radius = radius.max(0);
        if radius == 0 {
            return;
        }

        let radius_squared = radius * radius;
        for target in perimeter(origin, radius) {
            for pos in line(origin, target).into_iter().skip(1) {
                if !self.in_bounds(pos) {
                    break;
                }
                let dx = pos.x - origin.x;
                let dy = pos.y - origin.y;
                if dx * dx + dy * dy > radius_squared {
                    break;
                }
                if map.is_transparent(pos) {
                    self.mark(pos);
                } else {
                    if light_walls {
                        self.mark(pos);
                    }
                    break;
                }
            }
        }
    }

    /// Whether the cell was visible in the last computation.
    pub fn is_in_fov(&self, pos: Position) -> bool {
        self.index(pos).map(|i| self.visible[i]).unwrap_or(false)
    }

    /// All visible positions in row-major order.
    pub fn visible_positions(&self) -> Vec<Position> {
        self.visible
            .iter()
            .enumerate()
            .filter(|(_, &visible)| visible)
            .map(|(i, _)| Position::new(i as i32 % self.width, i as i32 / self.width))
            .collect()
    }

    /// Forgets every visible cell.
    pub fn clear(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = false);
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    fn mark(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.visible[i] = true;
        }
    }
}

/// Cells on the border of the square of half-side `radius` around `center`.
fn perimeter(center: Position, radius: i32) -> Vec<Position> {
    let mut cells = Vec::with_capacity((radius * 8) as usize);
    let (min_x, max_x) = (center.x - radius, center.x + radius);
    let (min_y, max_y) = (center.y - radius, center.y + radius);

    for x in min_x..=max_x {
        cells.push(Position::new(x, min_y));
        cells.push(Position::new(x, max_y));
    }
    for y in (min_y + 1)..max_y {
        cells.push(Position::new(min_x, y));
        cells.push(Position::new(max_x, y));
    }

    cells
}

/// Bresenham line from `from` to `to`, both ends included.
fn line(from: Position, to: Position) -> Vec<Position> {
    let mut points = Vec::new();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let step_x = if from.x < to.x { 1 } else { -1 };
    let step_y = if from.y < to.y { 1 } else { -1 };
    let mut error = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        points.push(Position::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
    }

    points
}
