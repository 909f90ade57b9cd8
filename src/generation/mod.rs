//! # Generation Module
//!
//! Procedural floorplan synthesis: partitioning, corridor routing and layout
//! validation.
//!
//! This module provides the configuration, the room model and the
//! [`Generator`] trait. The algorithms live in submodules:
//! [`partition`] for the binary space partition tree, [`corridors`] for the
//! two-pass corridor topology, [`validation`] for the connectivity report and
//! [`pipeline`] for the generator that ties them together.

pub mod corridors;
pub mod layout;
pub mod partition;
pub mod pipeline;
pub mod validation;

pub use corridors::*;
pub use layout::*;
pub use partition::*;
pub use pipeline::*;
pub use validation::*;

use crate::config::{MAX_CORRIDOR_WIDTH, MAX_MAP_DIMENSION, MAX_PARTITION_DEPTH};
use crate::utils::{CostWeights, GenRng};
use crate::world::{Position, Rect};
use crate::{FloorplanError, FloorplanResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for one generation call.
///
/// Identical configurations (seed included) always produce identical layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
    /// Partition tree settings
    pub partition: PartitionConfig,
    /// Corridor routing settings
    pub corridors: CorridorConfig,
}

/// Controls how bounds are recursively split into rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Smallest partition side produced by a split
    pub min_room_size: u32,
    /// Largest room side; bigger partitions get a capped room
    pub max_room_size: u32,
    /// Maximum tree depth (root is depth 0)
    pub max_depth: u32,
    /// Longest-to-shortest side ratio a split must not exceed when avoidable
    pub max_aspect_ratio: f64,
    /// Probability of cutting horizontally when neither orientation is forced
    pub split_bias: f64,
    /// Jitter around the center cut, as a fraction of the split side
    pub split_jitter: f64,
    /// Blend weight of the golden-ratio cut against the jittered center cut
    pub golden_ratio_weight: f64,
    /// Chance to stop splitting a partition that already fits a max-size room.
    ///
    /// Only partitions no larger than `max_room_size + 2 * max_margin` on
    /// both sides are candidates; larger ones keep splitting while they can,
    /// so an early stop never leaves a room short of its partition.
    pub early_stop_chance: f64,
    /// Smallest inset between a room and its partition edge
    pub min_margin: u32,
    /// Largest inset between a room and its partition edge
    pub max_margin: u32,
    /// Extra slack required before a side may be split
    pub corridor_clearance: u32,
}

/// Controls the two corridor passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorConfig {
    /// Carved width of spine corridors
    pub primary_width: u32,
    /// Carved width of branch corridors
    pub secondary_width: u32,
    /// Tree depth whose subtrees each contribute one core room to the spine
    pub spine_depth: u32,
    /// Nearest spine tiles tried per branch before giving up
    pub branch_candidates: u32,
    /// Reduce raw A* paths to straight line-of-sight segments
    pub smooth_paths: bool,
    /// Terrain costs for corridor routing
    pub costs: CostWeights,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            min_room_size: 6,
            max_room_size: 16,
            max_depth: 5,
            max_aspect_ratio: 2.0,
            split_bias: 0.5,
            split_jitter: 0.15,
            golden_ratio_weight: 0.35,
            early_stop_chance: 0.1,
            min_margin: 1,
            max_margin: 2,
            corridor_clearance: 2,
        }
    }
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            primary_width: 1,
            secondary_width: 1,
            spine_depth: 2,
            branch_candidates: 4,
            smooth_paths: true,
            costs: CostWeights::default(),
        }
    }
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use floorplan::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert!(config.partition.max_room_size >= config.partition.min_room_size);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: crate::config::DEFAULT_MAP_WIDTH,
            height: crate::config::DEFAULT_MAP_HEIGHT,
            partition: PartitionConfig::default(),
            corridors: CorridorConfig::default(),
        }
    }

    /// Creates a configuration for testing with smaller, simpler maps.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 40,
            height: 30,
            partition: PartitionConfig {
                min_room_size: 4,
                max_room_size: 10,
                max_depth: 4,
                ..PartitionConfig::default()
            },
            corridors: CorridorConfig::default(),
        }
    }

    /// Creates a configuration for maps several hundred tiles per side.
    pub fn for_large_maps(seed: u64) -> Self {
        Self {
            seed,
            width: 320,
            height: 320,
            partition: PartitionConfig {
                min_room_size: 8,
                max_room_size: 24,
                max_depth: 8,
                max_margin: 3,
                corridor_clearance: 3,
                ..PartitionConfig::default()
            },
            corridors: CorridorConfig {
                primary_width: 2,
                spine_depth: 3,
                ..CorridorConfig::default()
            },
        }
    }

    /// Replaces the map bounds.
    pub fn with_bounds(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// The rectangle being partitioned.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Rejects configurations that would make generation meaningless.
    ///
    /// Runs before any work starts; every other problem found during
    /// generation is reported, not raised.
    pub fn validate(&self) -> FloorplanResult<()> {
        let invalid = |message: String| Err(FloorplanError::InvalidConfig(message));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("bounds must be non-empty, got {}x{}", self.width, self.height));
        }
        if self.width > MAX_MAP_DIMENSION || self.height > MAX_MAP_DIMENSION {
            return invalid(format!(
                "bounds {}x{} exceed the {MAX_MAP_DIMENSION} tile limit",
                self.width, self.height
            ));
        }
        self.partition.validate()?;
        self.corridors.validate()
    }
}

impl PartitionConfig {
    /// Smallest side that can still be split into two partitions.
    pub fn min_split_size(&self) -> u32 {
        self.min_room_size * 2 + self.corridor_clearance
    }

    /// Area threshold used by the classification policy.
    pub fn min_room_area(&self) -> u64 {
        u64::from(self.min_room_size) * u64::from(self.min_room_size)
    }

    fn validate(&self) -> FloorplanResult<()> {
        let invalid = |message: String| Err(FloorplanError::InvalidConfig(message));

        if self.min_room_size == 0 {
            return invalid("min_room_size must be at least 1".to_string());
        }
        if self.min_room_size > self.max_room_size {
            return invalid(format!(
                "min_room_size {} exceeds max_room_size {}",
                self.min_room_size, self.max_room_size
            ));
        }
        if self.max_room_size > MAX_MAP_DIMENSION {
            return invalid(format!("max_room_size {} is larger than any map", self.max_room_size));
        }
        if self.min_margin > self.max_margin {
            return invalid(format!(
                "min_margin {} exceeds max_margin {}",
                self.min_margin, self.max_margin
            ));
        }
        if self.max_margin > MAX_MAP_DIMENSION || self.corridor_clearance > MAX_MAP_DIMENSION {
            return invalid("margins and clearance must fit inside a map".to_string());
        }
        if self.max_depth > MAX_PARTITION_DEPTH {
            return invalid(format!(
                "max_depth {} exceeds the limit of {MAX_PARTITION_DEPTH}",
                self.max_depth
            ));
        }
        if !self.max_aspect_ratio.is_finite() || self.max_aspect_ratio < 1.0 {
            return invalid(format!(
                "max_aspect_ratio must be a finite value >= 1, got {}",
                self.max_aspect_ratio
            ));
        }
        for (name, value) in [
            ("split_bias", self.split_bias),
            ("split_jitter", self.split_jitter),
            ("golden_ratio_weight", self.golden_ratio_weight),
            ("early_stop_chance", self.early_stop_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}

impl CorridorConfig {
    fn validate(&self) -> FloorplanResult<()> {
        let invalid = |message: String| Err(FloorplanError::InvalidConfig(message));

        for (name, width) in [
            ("primary_width", self.primary_width),
            ("secondary_width", self.secondary_width),
        ] {
            if width == 0 || width > MAX_CORRIDOR_WIDTH {
                return invalid(format!(
                    "{name} must be within 1..={MAX_CORRIDOR_WIDTH}, got {width}"
                ));
            }
        }
        if self.branch_candidates == 0 {
            return invalid("branch_candidates must be at least 1".to_string());
        }
        if self.spine_depth > MAX_PARTITION_DEPTH {
            return invalid(format!("spine_depth {} is deeper than any tree", self.spine_depth));
        }

        let costs = self.costs;
        if costs.corridor == 0 {
            return invalid("corridor cost must be at least 1".to_string());
        }
        if costs.corridor > costs.empty || costs.empty > costs.room_floor {
            return invalid(format!(
                "costs must satisfy corridor <= empty <= room_floor, got {}/{}/{}",
                costs.corridor, costs.empty, costs.room_floor
            ));
        }
        if costs.room_floor > 10_000 {
            return invalid(format!("room_floor cost {} is unreasonably large", costs.room_floor));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Represents a rectangular room inset from one leaf partition.
///
/// The rectangle is fixed at creation. Downstream systems may attach
/// metadata but cannot move or resize the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: u32,
    rect: Rect,
    depth: u32,
    room_type: RoomType,
    /// Free-form annotations owned by downstream systems
    pub metadata: BTreeMap<String, String>,
}

/// Room classification assigned by a deterministic size/depth policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Large room from a shallow partition
    Hall,
    /// Large room from a deep partition
    Chamber,
    /// Ordinary room
    Standard,
    /// Room below the nominal minimum area
    Alcove,
}

impl RoomType {
    /// Classifies a room from its area and partition depth.
    ///
    /// Area is compared against `min_room_size²`: below it is an alcove, at
    /// least twice it is a chamber, and at least three times it from the upper
    /// half of the tree is a hall.
    pub fn classify(rect: &Rect, depth: u32, config: &PartitionConfig) -> RoomType {
        let area = rect.area();
        let min_area = config.min_room_area();

        if area < min_area {
            RoomType::Alcove
        } else if area >= min_area * 3 && depth * 2 <= config.max_depth {
            RoomType::Hall
        } else if area >= min_area * 2 {
            RoomType::Chamber
        } else {
            RoomType::Standard
        }
    }
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use floorplan::{Position, Rect, Room, RoomType};
    ///
    /// let room = Room::new(1, Rect::new(5, 5, 10, 8), 2, RoomType::Standard);
    /// assert_eq!(room.id(), 1);
    /// assert_eq!(room.area(), 80);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// ```
    pub fn new(id: u32, rect: Rect, depth: u32, room_type: RoomType) -> Self {
        Self {
            id,
            rect,
            depth,
            room_type,
            metadata: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Depth of the partition this room was inset from.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        self.rect.center()
    }

    /// Gets the area of the room in tiles.
    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    /// Checks if a position is inside this room.
    pub fn contains(&self, pos: Position) -> bool {
        self.rect.contains(pos)
    }

    /// Checks if this room overlaps with another room.
    pub fn overlaps(&self, other: &Room) -> bool {
        self.rect.overlaps(&other.rect)
    }

    /// Sets metadata for this room.
    pub fn set_metadata(&mut self, key: String, value: String) {
        self.metadata.insert(key, value);
    }

    /// Gets metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&String> {
        self.metadata.get(key)
    }
}

/// Ordered phases of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationPhase {
    /// Partition tree construction and room insetting
    Partition,
    /// Pass 1: core rooms joined by primary corridors
    PrimarySpine,
    /// Pass 2: remaining rooms branched onto the spine
    SecondaryBranches,
    /// Wall and doorway painting
    Finishing,
    /// Connectivity and structural checks
    Validation,
}

impl GenerationPhase {
    /// All phases in execution order.
    pub const ALL: [GenerationPhase; 5] = [
        GenerationPhase::Partition,
        GenerationPhase::PrimarySpine,
        GenerationPhase::SecondaryBranches,
        GenerationPhase::Finishing,
        GenerationPhase::Validation,
    ];
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random source.
    fn generate(&self, config: &GenerationConfig, rng: &mut GenRng) -> FloorplanResult<T>;

    /// Checks generated content and reports what a caller should fix or review.
    fn validate(&self, content: &T, config: &GenerationConfig) -> FloorplanResult<ValidationReport>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random source from the config.
    pub fn create_rng(config: &GenerationConfig) -> GenRng {
        GenRng::from_seed(config.seed)
    }
}
