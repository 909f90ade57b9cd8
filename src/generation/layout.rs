//! # Layout Model
//!
//! Output types of a generation call: corridors and the finished map layout.

use super::{Room, ValidationReport};
use crate::world::{Grid, Position};
use serde::{Deserialize, Serialize};

/// Which corridor pass produced a corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorridorKind {
    /// Spine corridor between two core rooms
    Primary,
    /// Branch joining a room to the spine
    Secondary,
}

/// A routed connection between two rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    pub id: u32,
    /// Room the corridor starts from
    pub from: u32,
    /// Room the corridor ends at
    pub to: u32,
    /// 4-connected centerline, both endpoints included
    pub path: Vec<Position>,
    /// Carved width in tiles
    pub width: u32,
    pub kind: CorridorKind,
    /// Other rooms the corridor passes through or along
    pub served_rooms: Vec<u32>,
}

impl Corridor {
    /// Centerline length in tiles.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_primary(&self) -> bool {
        self.kind == CorridorKind::Primary
    }

    /// Whether the corridor touches `room_id` as an endpoint or served room.
    pub fn connects(&self, room_id: u32) -> bool {
        self.from == room_id || self.to == room_id || self.served_rooms.contains(&room_id)
    }

    /// Every room this corridor links, endpoints first.
    pub fn linked_rooms(&self) -> impl Iterator<Item = u32> + '_ {
        [self.from, self.to]
            .into_iter()
            .chain(self.served_rooms.iter().copied())
    }
}

/// A generated floorplan.
///
/// The grid is the rasterized result; rooms and corridors are the structured
/// view of the same map. Rooms are listed in partition tree order and a room's
/// id is its index in [`MapLayout::rooms`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLayout {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub rooms: Vec<Room>,
    pub corridors: Vec<Corridor>,
    pub grid: Grid,
    /// Room the connectivity walk starts from
    pub entry_room: Option<u32>,
    pub report: ValidationReport,
}

impl MapLayout {
    /// Looks up a room by id.
    pub fn room(&self, id: u32) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id() == id)
    }

    /// Corridors linked to `room_id`, in corridor order.
    pub fn corridors_for(&self, room_id: u32) -> impl Iterator<Item = &Corridor> + '_ {
        self.corridors.iter().filter(move |corridor| corridor.connects(room_id))
    }

    pub fn primary_corridors(&self) -> impl Iterator<Item = &Corridor> + '_ {
        self.corridors.iter().filter(|corridor| corridor.is_primary())
    }

    /// Room containing `pos`, if any.
    pub fn room_at(&self, pos: Position) -> Option<&Room> {
        self.rooms.iter().find(|room| room.contains(pos))
    }

    /// Serializes the whole layout as pretty-printed JSON.
    pub fn to_json(&self) -> crate::FloorplanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
