//! # Layout Validation
//!
//! Connectivity and structural checks over a finished [`MapLayout`].
//!
//! Validation never fails for data-quality problems: unreachable rooms,
//! narrow corridors and rooms outside the bounds all end up in the
//! [`ValidationReport`]. Only input that breaks the layout contract itself
//! (zero dimensions, a grid of the wrong size, duplicate room ids) is
//! rejected with [`FloorplanError::InvalidLayout`].

use super::{GenerationConfig, MapLayout};
use crate::{FloorplanError, FloorplanResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// One finding of the validator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssue {
    #[error("room {room} is not reachable from the entry room")]
    UnreachableRoom { room: u32 },

    #[error("room {room} has zero area")]
    EmptyRoom { room: u32 },

    #[error("room {room} extends outside the map bounds")]
    RoomOutOfBounds { room: u32 },

    #[error("room {room} is {width}x{height}, below the {minimum} tile minimum")]
    UndersizedRoom {
        room: u32,
        width: u32,
        height: u32,
        minimum: u32,
    },

    #[error("corridor {corridor} is {width} wide, below the minimum of {minimum}")]
    CorridorTooNarrow {
        corridor: u32,
        width: u32,
        minimum: u32,
    },

    #[error("corridor {corridor} leaves the map bounds")]
    CorridorOutOfBounds { corridor: u32 },

    #[error("corridor {corridor} has an empty or discontinuous path")]
    BrokenCorridor { corridor: u32 },

    #[error("corridor {corridor} references unknown room {room}")]
    UnknownCorridorEndpoint { corridor: u32, room: u32 },

    #[error("corridor {corridor} cuts through room {room}")]
    CorridorCrossesRoom { corridor: u32, room: u32 },
}

impl ValidationIssue {
    /// Whether the issue must be fixed rather than reviewed.
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            ValidationIssue::UndersizedRoom { .. } | ValidationIssue::CorridorCrossesRoom { .. }
        )
    }
}

/// Outcome of validating one layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Must-fix problems
    pub errors: Vec<ValidationIssue>,
    /// Should-review problems
    pub warnings: Vec<ValidationIssue>,
    /// Room the connectivity walk started from
    pub entry_room: Option<u32>,
    /// Rooms reached from the entry room, ascending
    pub reachable_rooms: Vec<u32>,
    /// Rooms not reached from the entry room, ascending
    pub unconnected_rooms: Vec<u32>,
}

impl ValidationReport {
    /// No errors were found. Warnings are allowed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every room was reached from the entry room.
    pub fn is_fully_connected(&self) -> bool {
        self.unconnected_rooms.is_empty()
    }

    fn push(&mut self, issue: ValidationIssue) {
        if issue.is_error() {
            self.errors.push(issue);
        } else {
            self.warnings.push(issue);
        }
    }
}

/// Configurable layout checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutValidator {
    /// Rooms with a shorter side than this get a warning
    pub min_room_side: Option<u32>,
    /// Corridors narrower than this are errors
    pub min_corridor_width: u32,
}

impl Default for LayoutValidator {
    fn default() -> Self {
        Self {
            min_room_side: None,
            min_corridor_width: 1,
        }
    }
}

impl LayoutValidator {
    /// Thresholds implied by a generation config.
    ///
    /// A room may legitimately lose up to `max_margin` tiles on each side of
    /// its partition, so the warning threshold is the minimum partition side
    /// less both margins.
    pub fn from_config(config: &GenerationConfig) -> Self {
        let partition = &config.partition;
        Self {
            min_room_side: Some(
                partition
                    .min_room_size
                    .saturating_sub(partition.max_margin * 2)
                    .max(1),
            ),
            min_corridor_width: config
                .corridors
                .primary_width
                .min(config.corridors.secondary_width)
                .max(1),
        }
    }

    /// Validates `layout` and returns the report.
    pub fn validate(&self, layout: &MapLayout) -> FloorplanResult<ValidationReport> {
        check_contract(layout)?;

        let mut report = ValidationReport::default();
        self.check_rooms(layout, &mut report);
        self.check_corridors(layout, &mut report);
        check_connectivity(layout, &mut report);

        debug!(
            "Validated {} rooms and {} corridors: {} errors, {} warnings",
            layout.rooms.len(),
            layout.corridors.len(),
            report.errors.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    fn check_rooms(&self, layout: &MapLayout, report: &mut ValidationReport) {
        let bounds = layout.grid.bounds();
        for room in &layout.rooms {
            let rect = room.rect();
            if rect.area() == 0 {
                report.push(ValidationIssue::EmptyRoom { room: room.id() });
                continue;
            }
            if !bounds.contains_rect(&rect) {
                report.push(ValidationIssue::RoomOutOfBounds { room: room.id() });
            }
            if let Some(minimum) = self.min_room_side {
                if rect.width.min(rect.height) < minimum {
                    report.push(ValidationIssue::UndersizedRoom {
                        room: room.id(),
                        width: rect.width,
                        height: rect.height,
                        minimum,
                    });
                }
            }
        }
    }

    fn check_corridors(&self, layout: &MapLayout, report: &mut ValidationReport) {
        let known: BTreeSet<u32> = layout.rooms.iter().map(|room| room.id()).collect();

        for corridor in &layout.corridors {
            if corridor.width < self.min_corridor_width {
                report.push(ValidationIssue::CorridorTooNarrow {
                    corridor: corridor.id,
                    width: corridor.width,
                    minimum: self.min_corridor_width,
                });
            }

            let contiguous = corridor
                .path
                .windows(2)
                .all(|pair| pair[0].is_cardinal_neighbor(pair[1]));
            if corridor.path.is_empty() || !contiguous {
                report.push(ValidationIssue::BrokenCorridor {
                    corridor: corridor.id,
                });
            }
            if corridor.path.iter().any(|&pos| !layout.grid.in_bounds(pos)) {
                report.push(ValidationIssue::CorridorOutOfBounds {
                    corridor: corridor.id,
                });
            }

            let mut reported = BTreeSet::new();
            for room in corridor.linked_rooms() {
                if !known.contains(&room) && reported.insert(room) {
                    report.push(ValidationIssue::UnknownCorridorEndpoint {
                        corridor: corridor.id,
                        room,
                    });
                }
            }

            for room in &layout.rooms {
                if room.id() == corridor.from || room.id() == corridor.to {
                    continue;
                }
                if corridor.path.iter().any(|&pos| room.contains(pos)) {
                    report.push(ValidationIssue::CorridorCrossesRoom {
                        corridor: corridor.id,
                        room: room.id(),
                    });
                }
            }
        }
    }
}

/// Validates `layout` with default thresholds.
///
/// # Examples
///
/// ```
/// use floorplan::{validate, GenerationConfig, generate_layout};
///
/// let layout = generate_layout(&GenerationConfig::for_testing(3)).unwrap();
/// let report = validate(&layout).unwrap();
/// assert!(report.unconnected_rooms.is_empty());
/// ```
pub fn validate(layout: &MapLayout) -> FloorplanResult<ValidationReport> {
    LayoutValidator::default().validate(layout)
}

fn check_contract(layout: &MapLayout) -> FloorplanResult<()> {
    let invalid = |message: String| Err(FloorplanError::InvalidLayout(message));

    if layout.width == 0 || layout.height == 0 {
        return invalid(format!(
            "layout dimensions must be non-zero, got {}x{}",
            layout.width, layout.height
        ));
    }
    if layout.grid.width() != layout.width || layout.grid.height() != layout.height {
        return invalid(format!(
            "grid is {}x{} but the layout is {}x{}",
            layout.grid.width(),
            layout.grid.height(),
            layout.width,
            layout.height
        ));
    }

    let mut seen = BTreeSet::new();
    for room in &layout.rooms {
        if !seen.insert(room.id()) {
            return invalid(format!("duplicate room id {}", room.id()));
        }
    }
    if let Some(entry) = layout.entry_room {
        if !seen.contains(&entry) {
            return invalid(format!("entry room {entry} does not exist"));
        }
    }
    Ok(())
}

/// Breadth-first walk over the room graph from the entry room.
///
/// Each corridor links its `from` room to its `to` room and to every room it
/// serves. Edges to unknown rooms are ignored; they are reported separately.
fn check_connectivity(layout: &MapLayout, report: &mut ValidationReport) {
    let Some(entry) = layout
        .entry_room
        .or_else(|| layout.rooms.first().map(|room| room.id()))
    else {
        return;
    };
    report.entry_room = Some(entry);

    let known: BTreeSet<u32> = layout.rooms.iter().map(|room| room.id()).collect();
    let mut adjacency: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for corridor in &layout.corridors {
        for other in corridor.linked_rooms().skip(1) {
            if known.contains(&corridor.from) && known.contains(&other) {
                adjacency.entry(corridor.from).or_default().insert(other);
                adjacency.entry(other).or_default().insert(corridor.from);
            }
        }
    }

    let mut visited = BTreeSet::from([entry]);
    let mut queue = VecDeque::from([entry]);
    while let Some(current) = queue.pop_front() {
        for &next in adjacency.get(&current).into_iter().flatten() {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    for &room in &known {
        if !visited.contains(&room) {
            warn!("Room {room} is not reachable from entry room {entry}");
            report.unconnected_rooms.push(room);
            report.push(ValidationIssue::UnreachableRoom { room });
        }
    }
    report.reachable_rooms = visited.into_iter().collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Corridor, CorridorKind, Room, RoomType};
    use crate::utils::{find_path, UniformCost};
    use crate::world::{Grid, Position, Rect, TileState};

    fn straight_corridor(id: u32, from: u32, to: u32, row: i32, x0: i32, x1: i32) -> Corridor {
        Corridor {
            id,
            from,
            to,
            path: (x0..=x1).map(|x| Position::new(x, row)).collect(),
            width: 1,
            kind: CorridorKind::Primary,
            served_rooms: Vec::new(),
        }
    }

    fn layout(rooms: Vec<Room>, corridors: Vec<Corridor>, grid: Grid) -> MapLayout {
        MapLayout {
            width: grid.width(),
            height: grid.height(),
            seed: 0,
            rooms,
            corridors,
            grid,
            entry_room: None,
            report: ValidationReport::default(),
        }
    }

    fn room(id: u32, x: i32, y: i32, side: u32) -> Room {
        Room::new(id, Rect::new(x, y, side, side), 1, RoomType::Standard)
    }

    #[test]
    fn test_connected_pair_is_clean() {
        let rooms = vec![room(0, 1, 1, 5), room(1, 10, 1, 5)];
        let corridors = vec![straight_corridor(0, 0, 1, 3, 3, 12)];
        let report = validate(&layout(rooms, corridors, Grid::new(20, 10))).unwrap();

        assert!(report.is_clean());
        assert!(report.is_fully_connected());
        assert_eq!(report.reachable_rooms, vec![0, 1]);
        assert_eq!(report.entry_room, Some(0));
    }

    #[test]
    fn test_enclosed_rooms_reported_unconnected() {
        let rooms = vec![
            room(0, 1, 1, 5),
            room(1, 10, 1, 5),
            room(2, 2, 12, 5),
            room(3, 12, 12, 5),
        ];
        let mut grid = Grid::new(24, 20);
        for room in &rooms {
            grid.fill_rect(&room.rect(), TileState::RoomFloor);
        }
        for enclosed in &rooms[2..] {
            for pos in enclosed.rect().expanded(1).positions() {
                if !enclosed.contains(pos) {
                    grid.set(pos, TileState::Wall);
                }
            }
        }

        assert!(find_path(&grid, rooms[2].center(), rooms[3].center(), &UniformCost).is_none());

        let corridors = vec![straight_corridor(0, 0, 1, 3, 3, 12)];
        let report = validate(&layout(rooms, corridors, grid)).unwrap();
        assert_eq!(report.unconnected_rooms, vec![2, 3]);
        assert_eq!(report.reachable_rooms, vec![0, 1]);
        assert_eq!(
            report.errors,
            vec![
                ValidationIssue::UnreachableRoom { room: 2 },
                ValidationIssue::UnreachableRoom { room: 3 },
            ]
        );
    }

    #[test]
    fn test_served_rooms_count_as_edges() {
        let rooms = vec![room(0, 1, 1, 3), room(1, 7, 1, 3), room(2, 13, 1, 3)];
        let mut corridor = straight_corridor(0, 0, 2, 2, 2, 14);
        corridor.served_rooms = vec![1];
        let report = validate(&layout(rooms, vec![corridor], Grid::new(20, 6))).unwrap();

        assert!(report.is_fully_connected());
        assert_eq!(
            report.warnings,
            vec![ValidationIssue::CorridorCrossesRoom { corridor: 0, room: 1 }]
        );
    }

    #[test]
    fn test_structural_errors() {
        let rooms = vec![
            room(0, 1, 1, 4),
            Room::new(1, Rect::new(6, 1, 0, 4), 1, RoomType::Alcove),
            room(2, 17, 1, 6),
        ];
        let mut narrow = straight_corridor(0, 0, 2, 2, 2, 18);
        narrow.width = 0;
        let mut broken = straight_corridor(1, 0, 9, 3, 2, 5);
        broken.path.push(Position::new(8, 8));

        let report = validate(&layout(rooms, vec![narrow, broken], Grid::new(20, 8))).unwrap();
        let errors = &report.errors;
        assert!(errors.contains(&ValidationIssue::EmptyRoom { room: 1 }));
        assert!(errors.contains(&ValidationIssue::RoomOutOfBounds { room: 2 }));
        assert!(errors.contains(&ValidationIssue::CorridorTooNarrow {
            corridor: 0,
            width: 0,
            minimum: 1
        }));
        assert!(errors.contains(&ValidationIssue::BrokenCorridor { corridor: 1 }));
        assert!(errors.contains(&ValidationIssue::UnknownCorridorEndpoint { corridor: 1, room: 9 }));
        assert!(errors.contains(&ValidationIssue::UnreachableRoom { room: 1 }));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_corridor_out_of_bounds() {
        let rooms = vec![room(0, 1, 1, 3), room(1, 5, 1, 3)];
        let corridor = straight_corridor(0, 0, 1, 2, -2, 6);
        let report = validate(&layout(rooms, vec![corridor], Grid::new(10, 6))).unwrap();
        assert_eq!(
            report.errors,
            vec![ValidationIssue::CorridorOutOfBounds { corridor: 0 }]
        );
    }

    #[test]
    fn test_undersized_room_is_a_warning() {
        let validator = LayoutValidator {
            min_room_side: Some(4),
            min_corridor_width: 1,
        };
        let rooms = vec![room(0, 1, 1, 3)];
        let report = validator
            .validate(&layout(rooms, Vec::new(), Grid::new(8, 8)))
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_contract_violations_are_errors() {
        let grid_mismatch = MapLayout {
            width: 30,
            ..layout(Vec::new(), Vec::new(), Grid::new(10, 10))
        };
        assert!(matches!(
            validate(&grid_mismatch),
            Err(FloorplanError::InvalidLayout(_))
        ));

        let duplicate = layout(vec![room(0, 0, 0, 2), room(0, 4, 4, 2)], Vec::new(), Grid::new(10, 10));
        assert!(validate(&duplicate).is_err());

        let missing_entry = MapLayout {
            entry_room: Some(5),
            ..layout(vec![room(0, 0, 0, 2)], Vec::new(), Grid::new(10, 10))
        };
        assert!(validate(&missing_entry).is_err());
    }

    #[test]
    fn test_empty_layout_has_no_entry() {
        let report = validate(&layout(Vec::new(), Vec::new(), Grid::new(4, 4))).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.entry_room, None);
    }

    #[test]
    fn test_issue_messages() {
        let issue = ValidationIssue::UnreachableRoom { room: 4 };
        assert_eq!(issue.to_string(), "room 4 is not reachable from the entry room");
        assert!(issue.is_error());
    }
}
