//! # Grid Geometry
//!
//! Discrete line tracing and visibility tests on the tile grid.

use crate::world::{Grid, Position};

/// Traces a 4-connected line from `from` to `to`, both endpoints included.
///
/// Every consecutive pair of cells differs by one cardinal step, so the result
/// always has exactly `manhattan_distance + 1` cells. At each step the axis
/// whose next cell boundary lies closer along the ideal segment advances
/// first; exact ties advance `y`.
///
/// # Examples
///
/// ```
/// use floorplan::{Position, trace_line};
///
/// let line = trace_line(Position::new(0, 0), Position::new(3, 1));
/// assert_eq!(line.len(), 5);
/// assert_eq!(line[0], Position::new(0, 0));
/// assert_eq!(line[4], Position::new(3, 1));
/// ```
pub fn trace_line(from: Position, to: Position) -> Vec<Position> {
    let dx = i64::from(from.x.abs_diff(to.x));
    let dy = i64::from(from.y.abs_diff(to.y));
    let sx = if to.x >= from.x { 1 } else { -1 };
    let sy = if to.y >= from.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity((dx + dy + 1) as usize);
    let mut current = from;
    cells.push(current);

    let (mut ix, mut iy) = (0_i64, 0_i64);
    while ix < dx || iy < dy {
        if (1 + 2 * ix) * dy < (1 + 2 * iy) * dx {
            current.x += sx;
            ix += 1;
        } else {
            current.y += sy;
            iy += 1;
        }
        cells.push(current);
    }

    cells
}

/// Checks that every cell on the traced line between two points is walkable.
pub fn has_line_of_sight(grid: &Grid, from: Position, to: Position) -> bool {
    trace_line(from, to)
        .into_iter()
        .all(|pos| grid.get(pos).is_walkable())
}
