//! Property tests for routing and smoothing on arbitrary grids

use floorplan::{
    densify, find_path, smooth, CorridorBiasedCost, CostWeights, Grid, Pathfinder, Position,
    TileState, UniformCost,
};
use proptest::prelude::*;

fn grid_with_walls(width: u32, height: u32, walls: &[(i32, i32)]) -> Grid {
    let mut grid = Grid::new(width, height);
    for &(x, y) in walls {
        grid.set(Position::new(x, y), TileState::Wall);
    }
    grid
}

#[test]
fn test_open_grid_path_is_manhattan() {
    let mut grid = Grid::new(40, 30);
    grid.fill_rect(&floorplan::Rect::new(2, 2, 5, 5), TileState::RoomFloor);
    grid.fill_rect(&floorplan::Rect::new(30, 20, 6, 6), TileState::RoomFloor);
    let a = Position::new(6, 4);
    let b = Position::new(30, 22);

    let path = find_path(&grid, a, b, &UniformCost).expect("open grid is connected");
    assert_eq!(path.len() as u32 - 1, a.manhattan_distance(b));
}

#[test]
fn test_weighted_route_reuses_corridor() {
    let mut grid = Grid::new(30, 12);
    for x in 0..30 {
        grid.set(Position::new(x, 9), TileState::PrimaryCorridor);
    }
    let cost = CorridorBiasedCost::new(CostWeights::default());
    let path = Pathfinder::new(&grid, &cost)
        .find_path(Position::new(1, 8), Position::new(28, 8))
        .expect("route exists");

    let on_corridor = path
        .iter()
        .filter(|&&pos| grid.get(pos) == TileState::PrimaryCorridor)
        .count();
    assert!(on_corridor >= 20, "only {on_corridor} corridor cells used");
}

proptest! {
    #[test]
    fn uniform_paths_are_symmetric(
        walls in prop::collection::vec((0_i32..20, 0_i32..20), 0..80),
        ax in 0_i32..20, ay in 0_i32..20,
        bx in 0_i32..20, by in 0_i32..20,
    ) {
        let grid = grid_with_walls(20, 20, &walls);
        let a = Position::new(ax, ay);
        let b = Position::new(bx, by);
        prop_assume!(grid.get(a).is_walkable() && grid.get(b).is_walkable());

        let forward = find_path(&grid, a, b, &UniformCost);
        let backward = find_path(&grid, b, a, &UniformCost);
        prop_assert_eq!(forward.as_ref().map(Vec::len), backward.as_ref().map(Vec::len));

        if let Some(path) = forward {
            prop_assert_eq!(path.first(), Some(&a));
            prop_assert_eq!(path.last(), Some(&b));
            prop_assert!(path.len() as u32 > a.manhattan_distance(b));
            for pair in path.windows(2) {
                prop_assert!(pair[0].is_cardinal_neighbor(pair[1]));
            }
        }
    }

    #[test]
    fn smoothed_paths_stay_walkable(
        walls in prop::collection::vec((0_i32..24, 0_i32..24), 0..120),
        ax in 0_i32..24, ay in 0_i32..24,
        bx in 0_i32..24, by in 0_i32..24,
    ) {
        let grid = grid_with_walls(24, 24, &walls);
        let a = Position::new(ax, ay);
        let b = Position::new(bx, by);
        prop_assume!(grid.get(a).is_walkable() && grid.get(b).is_walkable());

        if let Some(raw) = find_path(&grid, a, b, &UniformCost) {
            let smoothed = smooth(&raw, &grid);
            prop_assert!(smoothed.len() <= raw.len());
            prop_assert_eq!(smoothed.first(), raw.first());
            prop_assert_eq!(smoothed.last(), raw.last());
            for &pos in &densify(&smoothed) {
                prop_assert!(grid.get(pos).is_walkable());
            }
        }
    }
}
