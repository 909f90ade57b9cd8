//! # Path Smoothing
//!
//! Greedy line-of-sight reduction of raw A* paths.

use super::math::{has_line_of_sight, trace_line};
use crate::world::{Grid, Position};

/// Reduces `raw_path` to a subsequence of waypoints joined by unobstructed
/// straight segments.
///
/// From the current anchor the scan looks for the farthest later waypoint with
/// an unobstructed line, even past waypoints that are hidden, and jumps the
/// anchor there. The first and last points are always preserved and the
/// result is never longer than the input.
///
/// # Examples
///
/// ```
/// use floorplan::{Grid, Position, smooth};
///
/// let grid = Grid::new(10, 10);
/// let raw: Vec<Position> = (0..6).map(|x| Position::new(x, 2)).collect();
/// assert_eq!(smooth(&raw, &grid), vec![Position::new(0, 2), Position::new(5, 2)]);
/// ```
pub fn smooth(raw_path: &[Position], grid: &Grid) -> Vec<Position> {
    if raw_path.len() <= 2 {
        return raw_path.to_vec();
    }

    let last = raw_path.len() - 1;
    let mut waypoints = vec![raw_path[0]];
    let mut anchor = 0;

    while anchor < last {
        // The next raw point is always reachable from the anchor
        let reach = (anchor + 2..=last)
            .rev()
            .find(|&j| has_line_of_sight(grid, raw_path[anchor], raw_path[j]))
            .unwrap_or(anchor + 1);
        waypoints.push(raw_path[reach]);
        anchor = reach;
    }

    waypoints
}

/// Expands waypoints back into a 4-connected cell sequence.
///
/// Consecutive waypoints are joined with [`trace_line`]; shared endpoints are
/// emitted once.
pub fn densify(waypoints: &[Position]) -> Vec<Position> {
    let mut cells: Vec<Position> = Vec::new();
    for pair in waypoints.windows(2) {
        let segment = trace_line(pair[0], pair[1]);
        let skip = usize::from(!cells.is_empty());
        cells.extend(segment.into_iter().skip(skip));
    }
    if cells.is_empty() {
        cells.extend(waypoints.first().copied());
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pathfinding::{find_path, UniformCost};
    use crate::world::TileState;
    use proptest::prelude::*;

    #[test]
    fn test_short_paths_unchanged() {
        let grid = Grid::new(5, 5);
        assert!(smooth(&[], &grid).is_empty());
        let pair = [Position::new(0, 0), Position::new(1, 0)];
        assert_eq!(smooth(&pair, &grid), pair.to_vec());
    }

    #[test]
    fn test_staircase_collapses_on_open_grid() {
        let grid = Grid::new(10, 10);
        let raw = find_path(&grid, Position::new(0, 0), Position::new(6, 6), &UniformCost).unwrap();

        let smoothed = smooth(&raw, &grid);
        assert_eq!(smoothed, vec![Position::new(0, 0), Position::new(6, 6)]);
    }

    #[test]
    fn test_keeps_corner_around_wall() {
        let mut grid = Grid::new(8, 8);
        for y in 0..6 {
            grid.set(Position::new(3, y), TileState::Wall);
        }
        let raw = find_path(&grid, Position::new(0, 0), Position::new(7, 0), &UniformCost).unwrap();

        let smoothed = smooth(&raw, &grid);
        assert!(smoothed.len() > 2);
        for pair in smoothed.windows(2) {
            assert!(has_line_of_sight(&grid, pair[0], pair[1]));
        }
    }

    #[test]
    fn test_skips_to_farthest_visible_waypoint() {
        let mut grid = Grid::new(8, 4);
        grid.set(Position::new(1, 1), TileState::Wall);
        let raw: Vec<Position> = [(0, 0), (1, 0), (2, 0), (2, 1), (3, 1), (3, 0), (4, 0), (5, 0)]
            .into_iter()
            .map(|(x, y)| Position::new(x, y))
            .collect();

        // (2, 1) is hidden behind the wall but (5, 0) is in plain view
        assert!(!has_line_of_sight(&grid, raw[0], raw[3]));
        assert_eq!(smooth(&raw, &grid), vec![Position::new(0, 0), Position::new(5, 0)]);
    }

    #[test]
    fn test_densify_joins_segments_without_duplicates() {
        let waypoints = [Position::new(0, 0), Position::new(3, 0), Position::new(3, 2)];
        let cells = densify(&waypoints);
        assert_eq!(cells.len(), 6);
        for pair in cells.windows(2) {
            assert!(pair[0].is_cardinal_neighbor(pair[1]));
        }
        assert_eq!(densify(&[Position::new(4, 4)]), vec![Position::new(4, 4)]);
    }

    proptest! {
        #[test]
        fn smoothing_never_lengthens_and_keeps_endpoints(
            sx in 0_i32..16, sy in 0_i32..16,
            gx in 0_i32..16, gy in 0_i32..16,
            wall_column in 2_i32..14, gap_row in 0_i32..16,
        ) {
            let mut grid = Grid::new(16, 16);
            for y in 0..16 {
                if y != gap_row {
                    grid.set(Position::new(wall_column, y), TileState::Wall);
                }
            }
            let start = Position::new(sx, sy);
            let goal = Position::new(gx, gy);
            prop_assume!(grid.get(start).is_walkable() && grid.get(goal).is_walkable());

            let raw = find_path(&grid, start, goal, &UniformCost).unwrap();
            let smoothed = smooth(&raw, &grid);
            prop_assert!(smoothed.len() <= raw.len());
            prop_assert_eq!(smoothed.first(), raw.first());
            prop_assert_eq!(smoothed.last(), raw.last());

            let dense = densify(&smoothed);
            prop_assert!(dense.len() <= raw.len());
            prop_assert!(dense.iter().all(|&pos| grid.get(pos).is_walkable()));
        }
    }
}
