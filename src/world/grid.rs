//! # Tile Grid
//!
//! Dense, bounds-checked 2D array of tile states. Rooms are rasterized into it
//! and every path search walks it.

use super::{Position, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileState {
    /// Unclaimed space
    Empty,
    /// Inside a room rectangle
    RoomFloor,
    /// Impassable boundary
    Wall,
    /// Part of the main circulation spine
    PrimaryCorridor,
    /// Part of a branch joining a room to the spine
    SecondaryCorridor,
    /// Corridor cell touching a room floor
    Doorway,
    /// Returned for queries outside the grid, never stored
    OutOfBounds,
}

impl TileState {
    /// Whether a corridor may be routed through this tile.
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileState::Wall | TileState::OutOfBounds)
    }

    /// Whether this tile belongs to a carved corridor.
    pub fn is_corridor(self) -> bool {
        matches!(
            self,
            TileState::PrimaryCorridor | TileState::SecondaryCorridor | TileState::Doorway
        )
    }

    /// One character per tile for debug dumps.
    pub fn glyph(self) -> char {
        match self {
            TileState::Empty => ' ',
            TileState::RoomFloor => '.',
            TileState::Wall => '#',
            TileState::PrimaryCorridor => '=',
            TileState::SecondaryCorridor => '-',
            TileState::Doorway => '+',
            TileState::OutOfBounds => '?',
        }
    }
}

/// Row-major grid of [`TileState`].
///
/// # Examples
///
/// ```
/// use floorplan::{Grid, Position, TileState};
///
/// let mut grid = Grid::new(4, 3);
/// grid.set(Position::new(1, 1), TileState::Wall);
/// assert_eq!(grid.get(Position::new(1, 1)), TileState::Wall);
/// assert_eq!(grid.get(Position::new(9, 9)), TileState::OutOfBounds);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<TileState>,
}

impl Grid {
    /// Creates a grid filled with [`TileState::Empty`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileState::Empty; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rectangle covering the whole grid.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Checks if a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Row-major index of an in-bounds position.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Position for a row-major index.
    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Gets the tile at `pos`, or [`TileState::OutOfBounds`].
    pub fn get(&self, pos: Position) -> TileState {
        self.index_of(pos)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(TileState::OutOfBounds)
    }

    /// Sets the tile at `pos`. Positions outside the grid are ignored, as is
    /// the out-of-bounds sentinel itself.
    pub fn set(&mut self, pos: Position, state: TileState) {
        if state == TileState::OutOfBounds {
            return;
        }
        if let Some(tile) = self.index_of(pos).and_then(|index| self.tiles.get_mut(index)) {
            *tile = state;
        }
    }

    /// Fills every in-bounds cell of `rect`.
    pub fn fill_rect(&mut self, rect: &Rect, state: TileState) {
        for pos in rect.positions() {
            self.set(pos, state);
        }
    }

    /// Counts cells holding `state`.
    pub fn count(&self, state: TileState) -> usize {
        self.tiles.iter().filter(|&&tile| tile == state).count()
    }

    /// Iterates `(position, state)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, TileState)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, &state)| (self.position_of(index), state))
    }

    /// Renders the grid one glyph per tile, one line per row.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for row in self.tiles.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|tile| tile.glyph()));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_returns_sentinel() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.get(Position::new(-1, 0)), TileState::OutOfBounds);
        assert_eq!(grid.get(Position::new(0, -1)), TileState::OutOfBounds);
        assert_eq!(grid.get(Position::new(5, 0)), TileState::OutOfBounds);
        assert_eq!(grid.get(Position::new(0, 4)), TileState::OutOfBounds);
        assert_eq!(grid.get(Position::new(4, 3)), TileState::Empty);
    }

    #[test]
    fn test_set_outside_bounds_is_noop() {
        let mut grid = Grid::new(3, 3);
        let before = grid.clone();
        grid.set(Position::new(3, 1), TileState::Wall);
        grid.set(Position::new(-1, -1), TileState::Wall);
        assert_eq!(grid, before);

        grid.set(Position::new(1, 1), TileState::OutOfBounds);
        assert_eq!(grid.get(Position::new(1, 1)), TileState::Empty);
    }

    #[test]
    fn test_index_round_trip() {
        let grid = Grid::new(7, 5);
        let pos = Position::new(3, 4);
        let index = grid.index_of(pos).unwrap();
        assert_eq!(index, 4 * 7 + 3);
        assert_eq!(grid.position_of(index), pos);
        assert_eq!(grid.index_of(Position::new(7, 0)), None);
    }

    #[test]
    fn test_fill_rect_clips_to_bounds() {
        let mut grid = Grid::new(4, 4);
        grid.fill_rect(&Rect::new(2, 2, 5, 5), TileState::RoomFloor);
        assert_eq!(grid.count(TileState::RoomFloor), 4);
    }

    #[test]
    fn test_walkability() {
        assert!(TileState::Empty.is_walkable());
        assert!(TileState::RoomFloor.is_walkable());
        assert!(TileState::Doorway.is_walkable());
        assert!(!TileState::Wall.is_walkable());
        assert!(!TileState::OutOfBounds.is_walkable());
        assert!(TileState::SecondaryCorridor.is_corridor());
        assert!(!TileState::RoomFloor.is_corridor());
    }

    #[test]
    fn test_ascii_rendering() {
        let mut grid = Grid::new(3, 2);
        grid.set(Position::new(0, 0), TileState::Wall);
        grid.set(Position::new(1, 0), TileState::RoomFloor);
        grid.set(Position::new(2, 1), TileState::PrimaryCorridor);
        assert_eq!(grid.to_ascii(), "#. \n  =\n");
    }
}
