//! # World Module
//!
//! Coordinates, rectangles and the tile grid shared by every generation phase.
//!
//! Positions use screen orientation: `x` grows to the east, `y` grows to the
//! south. All geometry is integer and axis aligned.

pub mod grid;

pub use grid::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D cell coordinate on the grid.
///
/// # Examples
///
/// ```
/// use floorplan::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use floorplan::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the 4 cardinal adjacent positions in N, W, E, S order.
    ///
    /// The order is fixed; path search relies on it for reproducible
    /// expansion.
    pub fn cardinal_adjacent_positions(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }

    /// Returns all 8 surrounding positions.
    pub fn adjacent_positions(self) -> [Position; 8] {
        [
            Position::new(self.x - 1, self.y - 1),
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y + 1),
            Position::new(self.x, self.y + 1),
            Position::new(self.x + 1, self.y + 1),
        ]
    }

    /// True when `other` is exactly one cardinal step away.
    pub fn is_cardinal_neighbor(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned rectangle of cells.
///
/// `x`/`y` is the top-left cell; the rectangle covers `width * height` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use floorplan::{Position, Rect};
    ///
    /// let rect = Rect::new(5, 5, 10, 8);
    /// assert_eq!(rect.area(), 80);
    /// assert_eq!(rect.center(), Position::new(10, 9));
    /// ```
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Inclusive right column.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32 - 1
    }

    /// Inclusive bottom row.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32 - 1
    }

    pub fn top_left(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> Position {
        Position::new(self.right(), self.bottom())
    }

    /// Gets the center cell of the rectangle.
    pub fn center(&self) -> Position {
        Position::new(
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    /// Gets the area of the rectangle in cells.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Checks if a position is inside this rectangle.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width as i32
            && pos.y < self.y + self.height as i32
    }

    /// Checks whether `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.width > 0
            && other.height > 0
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Checks if this rectangle overlaps with another rectangle.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x >= other.x + other.width as i32
            || other.x >= self.x + self.width as i32
            || self.y >= other.y + other.height as i32
            || other.y >= self.y + self.height as i32)
    }

    /// Grows the rectangle by `margin` cells on every side.
    pub fn expanded(&self, margin: u32) -> Rect {
        Rect::new(
            self.x - margin as i32,
            self.y - margin as i32,
            self.width + margin * 2,
            self.height + margin * 2,
        )
    }

    /// Iterates every cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let rect = *self;
        (rect.y..rect.y + rect.height as i32)
            .flat_map(move |y| (rect.x..rect.x + rect.width as i32).map(move |x| Position::new(x, y)))
    }

    /// Length of the longer side divided by the shorter side.
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width.max(self.height) as f64;
        let short = self.width.min(self.height).max(1) as f64;
        long / short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, -4);
        assert_eq!(pos1.manhattan_distance(pos2), 7);
        assert_eq!(pos2.manhattan_distance(pos1), 7);
    }

    #[test]
    fn test_position_cardinal_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.cardinal_adjacent_positions();
        assert_eq!(adjacent[0], Position::new(5, 4)); // North
        assert_eq!(adjacent[1], Position::new(4, 5)); // West
        assert!(!adjacent.contains(&Position::new(4, 4))); // No diagonal
        assert!(adjacent.iter().all(|&next| pos.is_cardinal_neighbor(next)));
    }

    #[test]
    fn test_position_arithmetic() {
        let pos1 = Position::new(5, 10);
        let pos2 = Position::new(3, 2);
        assert_eq!(pos1 + pos2, Position::new(8, 12));
        assert_eq!(pos1 - pos2, Position::new(2, 8));
    }

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::new(5, 5, 10, 8);

        assert_eq!(rect.bottom_right(), Position::new(14, 12));
        assert_eq!(rect.center(), Position::new(10, 9));
        assert!(rect.contains(Position::new(5, 5)));
        assert!(rect.contains(Position::new(14, 12)));
        assert!(!rect.contains(Position::new(4, 5)));
        assert!(!rect.contains(Position::new(15, 12)));
        assert_eq!(rect.positions().count(), 80);
    }

    #[test]
    fn test_rect_overlap_and_containment() {
        let outer = Rect::new(0, 0, 20, 20);
        let inner = Rect::new(2, 2, 5, 5);
        let touching = Rect::new(7, 2, 5, 5);
        let far = Rect::new(30, 30, 2, 2);

        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
        assert!(!inner.overlaps(&touching));
        assert!(inner.expanded(1).overlaps(&touching));
        assert!(!outer.overlaps(&far));
    }

    #[test]
    fn test_rect_aspect_ratio() {
        assert_eq!(Rect::new(0, 0, 20, 5).aspect_ratio(), 4.0);
        assert_eq!(Rect::new(0, 0, 5, 20).aspect_ratio(), 4.0);
        assert_eq!(Rect::new(0, 0, 7, 7).aspect_ratio(), 1.0);
    }
}
