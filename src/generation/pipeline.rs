//! # Floorplan Generator
//!
//! Runs the full pipeline for one layout: partition, primary spine,
//! secondary branches, finishing and validation.
//!
//! A call owns its grid, partition tree and corridor list exclusively and
//! hands back a complete [`MapLayout`] or an error, never anything in
//! between. Callers that want to yield or cancel between phases use
//! [`FloorplanGenerator::generate_with_checkpoints`].

use super::utils::create_rng;
use super::{
    generate_partition, CorridorPlanner, GenerationConfig, GenerationPhase, Generator,
    LayoutValidator, MapLayout, Room, ValidationReport,
};
use crate::utils::{CorridorBiasedCost, GenRng, TraversalCost};
use crate::world::{Grid, Position, TileState};
use crate::{FloorplanError, FloorplanResult};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;

/// Floorplan generator.
///
/// Holds caller-supplied hints that are not part of the serializable config:
/// preferred doorways and an optional custom traversal cost. Without a custom
/// cost, corridors are routed with a [`CorridorBiasedCost`] built from
/// [`super::CorridorConfig::costs`].
#[derive(Default)]
pub struct FloorplanGenerator {
    doorways: BTreeMap<u32, Position>,
    cost: Option<Box<dyn TraversalCost>>,
}

impl fmt::Debug for FloorplanGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloorplanGenerator")
            .field("doorways", &self.doorways)
            .field("custom_cost", &self.cost.is_some())
            .finish()
    }
}

impl FloorplanGenerator {
    /// Creates a new floorplan generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets where the branch corridor of `room_id` should start.
    ///
    /// The position must be walkable and lie inside the room or share an
    /// edge with it; otherwise it is ignored and the room center is used.
    /// Rooms already on the spine get no branch, so their doorway is never
    /// consulted.
    pub fn with_doorway(mut self, room_id: u32, position: Position) -> Self {
        self.doorways.insert(room_id, position);
        self
    }

    /// Replaces the traversal cost used for corridor routing.
    pub fn with_cost(mut self, cost: Box<dyn TraversalCost>) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Generates a layout, consulting `observer` before every phase.
    ///
    /// Returning [`ControlFlow::Break`] aborts the call with
    /// [`FloorplanError::Cancelled`]; everything built so far is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use floorplan::{FloorplanError, FloorplanGenerator, GenerationConfig, GenerationPhase, GenRng};
    /// use std::ops::ControlFlow;
    ///
    /// let config = GenerationConfig::for_testing(5);
    /// let mut rng = GenRng::from_seed(config.seed);
    /// let result = FloorplanGenerator::new().generate_with_checkpoints(&config, &mut rng, |phase| {
    ///     if phase == GenerationPhase::SecondaryBranches {
    ///         ControlFlow::Break(())
    ///     } else {
    ///         ControlFlow::Continue(())
    ///     }
    /// });
    /// assert!(matches!(
    ///     result,
    ///     Err(FloorplanError::Cancelled { phase: GenerationPhase::SecondaryBranches })
    /// ));
    /// ```
    pub fn generate_with_checkpoints<F>(
        &self,
        config: &GenerationConfig,
        rng: &mut GenRng,
        mut observer: F,
    ) -> FloorplanResult<MapLayout>
    where
        F: FnMut(GenerationPhase) -> ControlFlow<()>,
    {
        config.validate()?;
        info!(
            "Generating {}x{} floorplan (seed {})",
            config.width, config.height, config.seed
        );

        let mut checkpoint = |phase: GenerationPhase| match observer(phase) {
            ControlFlow::Continue(()) => {
                debug!("Entering phase {phase:?}");
                Ok(())
            }
            ControlFlow::Break(()) => {
                info!("Generation cancelled before phase {phase:?}");
                Err(FloorplanError::Cancelled { phase })
            }
        };

        checkpoint(GenerationPhase::Partition)?;
        let tree = generate_partition(config.bounds(), &config.partition, rng);
        let spine = tree.spine_rooms(config.corridors.spine_depth);
        let rooms = tree.into_rooms();

        let mut grid = Grid::new(config.width, config.height);
        for room in &rooms {
            grid.fill_rect(&room.rect(), TileState::RoomFloor);
        }

        checkpoint(GenerationPhase::PrimarySpine)?;
        let default_cost = CorridorBiasedCost::new(config.corridors.costs);
        let cost: &dyn TraversalCost = match &self.cost {
            Some(custom) => custom.as_ref(),
            None => &default_cost,
        };
        let mut planner = CorridorPlanner::new(&mut grid, &rooms, cost, &config.corridors);
        planner.carve_spine(&spine);

        checkpoint(GenerationPhase::SecondaryBranches)?;
        planner.carve_branches(&self.doorways);
        let corridors = planner.into_corridors();

        checkpoint(GenerationPhase::Finishing)?;
        let (walls, doorways) = paint_walls_and_doorways(&mut grid);
        debug!("Painted {walls} wall tiles and {doorways} doorways");

        checkpoint(GenerationPhase::Validation)?;
        let entry_room = spine
            .first()
            .copied()
            .or_else(|| rooms.first().map(Room::id));
        let mut layout = MapLayout {
            width: config.width,
            height: config.height,
            seed: config.seed,
            rooms,
            corridors,
            grid,
            entry_room,
            report: ValidationReport::default(),
        };
        layout.report = self.validate(&layout, config)?;

        info!(
            "Generated {} rooms and {} corridors ({} errors, {} warnings)",
            layout.rooms.len(),
            layout.corridors.len(),
            layout.report.errors.len(),
            layout.report.warnings.len()
        );
        Ok(layout)
    }
}

impl Generator<MapLayout> for FloorplanGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut GenRng) -> FloorplanResult<MapLayout> {
        self.generate_with_checkpoints(config, rng, |_| ControlFlow::Continue(()))
    }

    fn validate(&self, layout: &MapLayout, config: &GenerationConfig) -> FloorplanResult<ValidationReport> {
        LayoutValidator::from_config(config).validate(layout)
    }

    fn generator_type(&self) -> &'static str {
        "FloorplanGenerator"
    }
}

/// Generates a layout with the default generator and an RNG seeded from
/// `config.seed`.
pub fn generate_layout(config: &GenerationConfig) -> FloorplanResult<MapLayout> {
    let mut rng = create_rng(config);
    FloorplanGenerator::new().generate(config, &mut rng)
}

/// Encloses room floors and marks corridor entrances.
///
/// Empty tiles touching a room floor, diagonals included, become walls.
/// Corridor tiles sharing an edge with a room floor become doorways. Returns
/// the number of walls and doorways painted.
fn paint_walls_and_doorways(grid: &mut Grid) -> (usize, usize) {
    fn touches_floor(grid: &Grid, neighbors: &[Position]) -> bool {
        neighbors
            .iter()
            .any(|&pos| grid.get(pos) == TileState::RoomFloor)
    }

    let view: &Grid = grid;
    let mut walls = Vec::new();
    let mut doorways = Vec::new();
    for (pos, tile) in view.iter() {
        match tile {
            TileState::Empty if touches_floor(view, &pos.adjacent_positions()) => walls.push(pos),
            TileState::PrimaryCorridor | TileState::SecondaryCorridor
                if touches_floor(view, &pos.cardinal_adjacent_positions()) =>
            {
                doorways.push(pos)
            }
            _ => {}
        }
    }

    for &pos in &walls {
        grid.set(pos, TileState::Wall);
    }
    for &pos in &doorways {
        grid.set(pos, TileState::Doorway);
    }
    (walls.len(), doorways.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::CorridorKind;
    use crate::utils::UniformCost;
    use crate::world::Rect;

    #[test]
    fn test_generator_creation() {
        let generator = FloorplanGenerator::new();
        assert_eq!(generator.generator_type(), "FloorplanGenerator");
        assert!(format!("{generator:?}").contains("custom_cost: false"));
    }

    #[test]
    fn test_basic_generation() {
        let config = GenerationConfig::for_testing(12345);
        let layout = generate_layout(&config).unwrap();

        assert_eq!((layout.width, layout.height), (40, 30));
        assert_eq!(layout.seed, 12345);
        assert!(!layout.rooms.is_empty());
        assert!(layout.report.is_clean(), "{:?}", layout.report);
        assert!(layout.grid.count(TileState::RoomFloor) > 0);
    }

    #[test]
    fn test_room_ids_are_indices() {
        let layout = generate_layout(&GenerationConfig::new(8)).unwrap();
        for (index, room) in layout.rooms.iter().enumerate() {
            assert_eq!(room.id() as usize, index);
        }
    }

    #[test]
    fn test_primary_corridors_come_first() {
        let layout = generate_layout(&GenerationConfig::new(31)).unwrap();
        let first_secondary = layout
            .corridors
            .iter()
            .position(|c| c.kind == CorridorKind::Secondary)
            .unwrap_or(layout.corridors.len());
        assert!(layout.corridors[first_secondary..]
            .iter()
            .all(|c| c.kind == CorridorKind::Secondary));
        assert_eq!(layout.entry_room, layout.corridors.first().map(|c| c.from));
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let config = GenerationConfig::new(1).with_bounds(0, 0);
        let mut phases = Vec::new();
        let result = FloorplanGenerator::new().generate_with_checkpoints(
            &config,
            &mut GenRng::from_seed(1),
            |phase| {
                phases.push(phase);
                ControlFlow::Continue(())
            },
        );
        assert!(matches!(result, Err(FloorplanError::InvalidConfig(_))));
        assert!(phases.is_empty());
    }

    #[test]
    fn test_checkpoints_visit_every_phase_in_order() {
        let config = GenerationConfig::for_testing(2);
        let mut phases = Vec::new();
        FloorplanGenerator::new()
            .generate_with_checkpoints(&config, &mut GenRng::from_seed(2), |phase| {
                phases.push(phase);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(phases, GenerationPhase::ALL.to_vec());
    }

    #[test]
    fn test_custom_cost_is_used() {
        let config = GenerationConfig::for_testing(6);
        let mut rng = GenRng::from_seed(config.seed);
        let layout = FloorplanGenerator::new()
            .with_cost(Box::new(UniformCost))
            .generate(&config, &mut rng)
            .unwrap();
        assert!(layout.report.is_fully_connected());
    }

    #[test]
    fn test_walls_and_doorways_painted() {
        let mut grid = Grid::new(10, 7);
        grid.fill_rect(&Rect::new(2, 2, 3, 3), TileState::RoomFloor);
        for x in 5..9 {
            grid.set(Position::new(x, 3), TileState::PrimaryCorridor);
        }

        let (walls, doorways) = paint_walls_and_doorways(&mut grid);
        assert_eq!(doorways, 1);
        assert_eq!(grid.get(Position::new(5, 3)), TileState::Doorway);
        assert_eq!(grid.get(Position::new(6, 3)), TileState::PrimaryCorridor);
        // 5x5 ring around the room minus the doorway cell
        assert_eq!(walls, 15);
        assert_eq!(grid.get(Position::new(1, 1)), TileState::Wall);
        assert_eq!(grid.get(Position::new(6, 2)), TileState::Empty);
    }
}
