//! # Corridor Planning
//!
//! Two-pass corridor topology over a rasterized grid.
//!
//! Pass one links the core rooms of the partition tree into a primary spine.
//! Pass two gives every room that the spine does not already reach a
//! secondary corridor to the nearest spine tile. Both passes route with
//! weighted A*, so corridors carved earlier are cheap for later searches and
//! branches tend to merge into the existing network instead of running
//! parallel to it.

use super::{Corridor, CorridorConfig, CorridorKind, Room};
use crate::utils::{densify, smooth, Pathfinder, SpatialHash, TraversalCost};
use crate::world::{Grid, Position, TileState};
use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Bucket size of the spine tile index.
const SPINE_INDEX_CELL: u32 = 8;

/// Room id per cell, for rooms that never overlap.
#[derive(Debug, Clone)]
struct RoomIndex {
    width: u32,
    cells: Vec<Option<u32>>,
}

impl RoomIndex {
    fn new(grid: &Grid, rooms: &[Room]) -> Self {
        let mut cells = vec![None; grid.len()];
        for room in rooms {
            for pos in room.rect().positions() {
                if let Some(index) = grid.index_of(pos) {
                    cells[index] = Some(room.id());
                }
            }
        }
        Self {
            width: grid.width(),
            cells,
        }
    }

    fn room_at(&self, pos: Position) -> Option<u32> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 {
            return None;
        }
        let index = pos.y as usize * self.width as usize + pos.x as usize;
        self.cells.get(index).copied().flatten()
    }

    /// Rooms whose floor contains `pos` or shares an edge with it.
    fn rooms_touching(&self, pos: Position) -> impl Iterator<Item = u32> + '_ {
        std::iter::once(pos)
            .chain(pos.cardinal_adjacent_positions())
            .filter_map(|cell| self.room_at(cell))
    }
}

/// Routes and carves corridors for one layout.
///
/// The planner owns the corridor list and a spatial index of spine tiles
/// while it runs; the grid and rooms are borrowed from the caller.
pub struct CorridorPlanner<'a> {
    grid: &'a mut Grid,
    rooms: &'a [Room],
    cost: &'a dyn TraversalCost,
    config: &'a CorridorConfig,
    room_index: RoomIndex,
    corridors: Vec<Corridor>,
    spine: Vec<u32>,
    spine_tiles: SpatialHash<u32>,
}

impl<'a> CorridorPlanner<'a> {
    /// Creates a planner. Rooms must already be rasterized into `grid`.
    pub fn new(
        grid: &'a mut Grid,
        rooms: &'a [Room],
        cost: &'a dyn TraversalCost,
        config: &'a CorridorConfig,
    ) -> Self {
        let room_index = RoomIndex::new(grid, rooms);
        Self {
            grid,
            rooms,
            cost,
            config,
            room_index,
            corridors: Vec::new(),
            spine: Vec::new(),
            spine_tiles: SpatialHash::new(SPINE_INDEX_CELL),
        }
    }

    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    pub fn into_corridors(self) -> Vec<Corridor> {
        self.corridors
    }

    fn room(&self, id: u32) -> Option<&'a Room> {
        let rooms: &'a [Room] = self.rooms;
        rooms.get(id as usize).filter(|room| room.id() == id)
    }

    /// Pass one: links consecutive core rooms with primary corridors.
    ///
    /// A link whose search fails is logged and skipped; the remaining links
    /// are still attempted. Returns the number of corridors carved.
    pub fn carve_spine(&mut self, core_rooms: &[u32]) -> usize {
        self.spine = core_rooms.to_vec();
        let mut carved = 0;

        for pair in core_rooms.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            match self.connect_rooms(from, to, CorridorKind::Primary) {
                Some(_) => carved += 1,
                None => warn!("No primary route between rooms {from} and {to}"),
            }
        }

        debug!(
            "Spine links {} core rooms with {carved} corridors",
            core_rooms.len()
        );
        carved
    }

    /// Routes a corridor between the centers of two rooms and carves it.
    ///
    /// Returns the new corridor id, or `None` if either room is unknown or
    /// no path exists.
    pub fn connect_rooms(&mut self, from: u32, to: u32, kind: CorridorKind) -> Option<u32> {
        let start = self.room(from)?.center();
        let goal = self.room(to)?.center();
        let path = self.route(start, goal)?;
        Some(self.commit(from, to, path, kind))
    }

    /// Rooms linked to the spine by the corridors carved so far.
    ///
    /// Before any primary corridor exists, the first core room alone counts
    /// as the spine.
    pub fn connected_rooms(&self) -> BTreeSet<u32> {
        let mut connected: BTreeSet<u32> = self
            .corridors
            .iter()
            .flat_map(Corridor::linked_rooms)
            .collect();
        if connected.is_empty() {
            connected.extend(self.spine.first().copied());
        }
        connected
    }

    /// Pass two: branches every room the network does not reach yet onto
    /// the nearest spine tile.
    ///
    /// Rooms are visited in id order. A branch starts at the room's preferred
    /// doorway when one is given and usable, otherwise at the room center. Up to `branch_candidates` nearest spine tiles
    /// are tried before the room is given up on. Returns the number of
    /// corridors carved.
    pub fn carve_branches(&mut self, doorways: &BTreeMap<u32, Position>) -> usize {
        let mut connected = self.connected_rooms();
        let mut carved = 0;

        for room in self.rooms {
            if connected.contains(&room.id()) {
                continue;
            }

            let origin = self.branch_origin(room, doorways.get(&room.id()).copied());
            let Some((path, target_room)) = self.route_to_spine(origin) else {
                warn!("Room {} could not be joined to the spine", room.id());
                continue;
            };

            let id = self.commit(room.id(), target_room, path, CorridorKind::Secondary);
            connected.extend(self.corridors[id as usize].linked_rooms());
            carved += 1;
        }

        debug!("Branched {carved} rooms onto the spine");
        carved
    }

    fn branch_origin(&self, room: &Room, doorway: Option<Position>) -> Position {
        let Some(doorway) = doorway else {
            return room.center();
        };
        let on_edge = room.contains(doorway)
            || doorway
                .cardinal_adjacent_positions()
                .into_iter()
                .any(|pos| room.contains(pos));
        if on_edge && self.grid.get(doorway).is_walkable() {
            return doorway;
        }
        warn!("Ignoring doorway {doorway:?} for room {}: not on the room edge", room.id());
        room.center()
    }

    /// Finds a path from `origin` to the spine and the room the branch
    /// should be attributed to.
    fn route_to_spine(&self, origin: Position) -> Option<(Vec<Position>, u32)> {
        if self.spine_tiles.is_empty() {
            // Spine is a single room: aim for its center
            let core = self.room(*self.spine.first()?)?;
            return self.route(origin, core.center()).map(|path| (path, core.id()));
        }

        let candidates = self
            .spine_tiles
            .nearest(origin, self.config.branch_candidates as usize);
        for (target, corridor_id) in candidates {
            if let Some(path) = self.route(origin, target) {
                // Credit the room the target lies in, else the corridor's origin
                let owner = self
                    .room_index
                    .room_at(target)
                    .unwrap_or(self.corridors[corridor_id as usize].from);
                trace!("Branch from {origin:?} meets corridor {corridor_id} at {target:?}");
                return Some((path, owner));
            }
        }
        None
    }

    /// Runs A* and, when enabled, straightens the result.
    fn route(&self, start: Position, goal: Position) -> Option<Vec<Position>> {
        let raw = Pathfinder::new(self.grid, self.cost).find_path(start, goal)?;
        if !self.config.smooth_paths {
            return Some(raw);
        }
        let waypoints = smooth(&raw, self.grid);
        trace!(
            "Smoothed {} raw cells to {} waypoints",
            raw.len(),
            waypoints.len()
        );
        Some(densify(&waypoints))
    }

    fn commit(&mut self, from: u32, to: u32, path: Vec<Position>, kind: CorridorKind) -> u32 {
        let id = self.corridors.len() as u32;
        let (width, tile) = match kind {
            CorridorKind::Primary => (self.config.primary_width, TileState::PrimaryCorridor),
            CorridorKind::Secondary => (self.config.secondary_width, TileState::SecondaryCorridor),
        };

        self.stamp(&path, width, tile);
        if kind == CorridorKind::Primary {
            for &cell in &path {
                self.spine_tiles.insert(cell, id);
            }
        }

        let served_rooms: BTreeSet<u32> = path
            .iter()
            .flat_map(|&cell| self.room_index.rooms_touching(cell))
            .filter(|&room| room != from && room != to)
            .collect();

        trace!(
            "Corridor {id} ({kind:?}) {from} -> {to}: {} cells, serves {served_rooms:?}",
            path.len()
        );
        self.corridors.push(Corridor {
            id,
            from,
            to,
            path,
            width,
            kind,
            served_rooms: served_rooms.into_iter().collect(),
        });
        id
    }

    /// Paints a `width`-square brush along `path`.
    ///
    /// Only empty tiles are claimed: room floors stay floors and branch
    /// corridors never overwrite the spine.
    fn stamp(&mut self, path: &[Position], width: u32, tile: TileState) {
        let low = -((width as i32 - 1) / 2);
        let high = low + width as i32 - 1;
        for &cell in path {
            for dy in low..=high {
                for dx in low..=high {
                    let pos = Position::new(cell.x + dx, cell.y + dy);
                    if self.grid.get(pos) == TileState::Empty {
                        self.grid.set(pos, tile);
                    }
                }
            }
        }
    }
}
