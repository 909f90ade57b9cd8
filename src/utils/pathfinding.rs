//! # Pathfinding Algorithms
//!
//! Weighted A* search over the tile grid with 4-directional movement.
//!
//! Movement cost is supplied by a [`TraversalCost`] implementation, which is
//! the main lever for shaping corridor topology: the default
//! [`CorridorBiasedCost`] makes existing corridors cheap and room floors
//! expensive, so later searches reuse what earlier searches carved.

use crate::world::{Grid, Position, TileState};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Cost of stepping onto a tile.
///
/// `None` marks the tile impassable. `min_step_cost` must never exceed the
/// cost of any passable tile; A* scales its Manhattan heuristic by it, which
/// keeps the heuristic admissible.
pub trait TraversalCost {
    /// Cost of entering a tile, or `None` if it cannot be entered.
    fn step_cost(&self, tile: TileState) -> Option<u32>;

    /// Lower bound of [`TraversalCost::step_cost`] over passable tiles.
    fn min_step_cost(&self) -> u32;
}

/// Every walkable tile costs 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformCost;

impl TraversalCost for UniformCost {
    fn step_cost(&self, tile: TileState) -> Option<u32> {
        tile.is_walkable().then_some(1)
    }

    fn min_step_cost(&self) -> u32 {
        1
    }
}

/// Per-terrain step costs used by corridor routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Existing corridor and doorway tiles
    pub corridor: u32,
    /// Unclaimed space
    pub empty: u32,
    /// Room interiors: discouraged, not forbidden
    pub room_floor: u32,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            corridor: 1,
            empty: 4,
            room_floor: 16,
        }
    }
}

/// Terrain-weighted cost biased toward reusing corridors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorridorBiasedCost {
    pub weights: CostWeights,
}

impl CorridorBiasedCost {
    pub fn new(weights: CostWeights) -> Self {
        Self { weights }
    }
}

impl From<CostWeights> for CorridorBiasedCost {
    fn from(weights: CostWeights) -> Self {
        Self::new(weights)
    }
}

impl TraversalCost for CorridorBiasedCost {
    fn step_cost(&self, tile: TileState) -> Option<u32> {
        match tile {
            TileState::PrimaryCorridor | TileState::SecondaryCorridor | TileState::Doorway => {
                Some(self.weights.corridor)
            }
            TileState::Empty => Some(self.weights.empty),
            TileState::RoomFloor => Some(self.weights.room_floor),
            TileState::Wall | TileState::OutOfBounds => None,
        }
    }

    fn min_step_cost(&self) -> u32 {
        self.weights
            .corridor
            .min(self.weights.empty)
            .min(self.weights.room_floor)
            .max(1)
    }
}

/// Search state for one expanded cell. Lives only for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNode {
    pub position: Position,
    pub g_cost: u32,
    pub h_cost: u32,
    /// Index of the parent node in the search arena
    pub parent: Option<usize>,
}

impl PathNode {
    pub fn f_cost(&self) -> u32 {
        self.g_cost.saturating_add(self.h_cost)
    }
}

/// Open-set entry ordered for min-heap behavior in [`BinaryHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f_cost: u32,
    h_cost: u32,
    node: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lowest f first, then lowest h, then earliest pushed
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search bound to one grid and one cost function.
pub struct Pathfinder<'a> {
    grid: &'a Grid,
    cost: &'a dyn TraversalCost,
}

impl<'a> Pathfinder<'a> {
    pub fn new(grid: &'a Grid, cost: &'a dyn TraversalCost) -> Self {
        Self { grid, cost }
    }

    fn heuristic(&self, from: Position, goal: Position) -> u32 {
        from.manhattan_distance(goal)
            .saturating_mul(self.cost.min_step_cost())
    }

    /// Finds a cheapest 4-directional path from `start` to `goal`.
    ///
    /// The returned path includes both endpoints. `None` means the goal is
    /// unreachable, which is an ordinary outcome rather than an error. The
    /// start tile is never costed, so a search may begin inside a wall; the
    /// goal must be passable.
    pub fn find_path(&self, start: Position, goal: Position) -> Option<Vec<Position>> {
        if !self.grid.in_bounds(start) || !self.grid.in_bounds(goal) {
            return None;
        }
        self.cost.step_cost(self.grid.get(goal))?;
        if start == goal {
            return Some(vec![start]);
        }

        let mut best_g = vec![u32::MAX; self.grid.len()];
        let mut closed = vec![false; self.grid.len()];
        let mut nodes: Vec<PathNode> = Vec::new();
        let mut open_set = BinaryHeap::new();

        let start_node = PathNode {
            position: start,
            g_cost: 0,
            h_cost: self.heuristic(start, goal),
            parent: None,
        };
        best_g[self.grid.index_of(start)?] = 0;
        nodes.push(start_node);
        open_set.push(OpenEntry {
            f_cost: start_node.f_cost(),
            h_cost: start_node.h_cost,
            node: 0,
        });

        while let Some(entry) = open_set.pop() {
            let current = nodes[entry.node];
            let Some(current_index) = self.grid.index_of(current.position) else {
                continue;
            };
            if closed[current_index] {
                continue;
            }
            closed[current_index] = true;

            if current.position == goal {
                return Some(reconstruct_path(&nodes, entry.node));
            }

            for neighbor in current.position.cardinal_adjacent_positions() {
                let Some(neighbor_index) = self.grid.index_of(neighbor) else {
                    continue;
                };
                if closed[neighbor_index] {
                    continue;
                }
                let Some(step) = self.cost.step_cost(self.grid.get(neighbor)) else {
                    continue;
                };

                let tentative_g = current.g_cost.saturating_add(step);
                if tentative_g >= best_g[neighbor_index] {
                    continue;
                }
                best_g[neighbor_index] = tentative_g;

                let node = PathNode {
                    position: neighbor,
                    g_cost: tentative_g,
                    h_cost: self.heuristic(neighbor, goal),
                    parent: Some(entry.node),
                };
                nodes.push(node);
                open_set.push(OpenEntry {
                    f_cost: node.f_cost(),
                    h_cost: node.h_cost,
                    node: nodes.len() - 1,
                });
            }
        }

        None // Open set exhausted
    }

    /// Sum of step costs along `path`, excluding the start tile.
    ///
    /// Returns `None` if any later tile is impassable.
    pub fn path_cost(&self, path: &[Position]) -> Option<u64> {
        path.iter().skip(1).try_fold(0_u64, |total, &pos| {
            self.cost
                .step_cost(self.grid.get(pos))
                .map(|step| total + u64::from(step))
        })
    }
}

/// Walks parent links from `goal_node` back to the start and reverses them.
fn reconstruct_path(nodes: &[PathNode], goal_node: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_node);
    while let Some(index) = cursor {
        path.push(nodes[index].position);
        cursor = nodes[index].parent;
    }
    path.reverse();
    path
}

/// Convenience wrapper around [`Pathfinder::find_path`].
///
/// # Examples
///
/// ```
/// use floorplan::{Grid, Position, UniformCost, find_path};
///
/// let grid = Grid::new(10, 10);
/// let path = find_path(&grid, Position::new(1, 1), Position::new(4, 3), &UniformCost).unwrap();
/// assert_eq!(path.len(), 6);
/// ```
pub fn find_path(
    grid: &Grid,
    start: Position,
    goal: Position,
    cost: &dyn TraversalCost,
) -> Option<Vec<Position>> {
    Pathfinder::new(grid, cost).find_path(start, goal)
}
