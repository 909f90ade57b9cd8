//! # Floorplan
//!
//! Deterministic synthesis of 2D rectangular floorplans.
//!
//! ## Architecture Overview
//!
//! A generation call runs a fixed sequence of phases over state it owns
//! exclusively:
//!
//! - **Partition**: a binary space partition tree splits the bounds and insets
//!   one room into every leaf
//! - **Primary spine**: one core room per shallow subtree is linked in tree
//!   order with weighted A* corridors
//! - **Secondary branches**: every room not already on the spine routes a
//!   corridor to the nearest primary corridor tile
//! - **Finishing**: walls and doorways are painted around room floors
//! - **Validation**: a breadth-first walk over the room adjacency graph plus
//!   structural checks produce a [`ValidationReport`]
//!
//! Identical `(bounds, config, seed)` inputs produce identical layouts.
//!
//! ```
//! use floorplan::{GenerationConfig, generate_layout};
//!
//! let layout = generate_layout(&GenerationConfig::new(42)).unwrap();
//! assert!(!layout.rooms.is_empty());
//! assert!(layout.report.is_clean());
//! ```

pub mod generation;
pub mod utils;
pub mod world;

pub use generation::*;
pub use utils::*;
pub use world::*;

/// Core error type for floorplan generation.
///
/// Only configuration problems, malformed validator input and explicit
/// cancellation abort a call. Unreachable rooms and failed path searches are
/// data-quality outcomes and end up in the [`ValidationReport`] instead.
#[derive(thiserror::Error, Debug)]
pub enum FloorplanError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration was rejected before any work started
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Validator input violates the layout contract
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Generation was aborted at a phase checkpoint
    #[error("Generation cancelled before phase {phase:?}")]
    Cancelled { phase: GenerationPhase },
}

/// Result type used throughout the floorplan codebase.
pub type FloorplanResult<T> = Result<T, FloorplanError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation limits and defaults.
pub mod config {
    /// Default map width in tiles
    pub const DEFAULT_MAP_WIDTH: u32 = 64;

    /// Default map height in tiles
    pub const DEFAULT_MAP_HEIGHT: u32 = 48;

    /// Largest accepted map side
    pub const MAX_MAP_DIMENSION: u32 = 4096;

    /// Deepest partition tree accepted by config validation
    pub const MAX_PARTITION_DEPTH: u32 = 24;

    /// Largest accepted corridor width
    pub const MAX_CORRIDOR_WIDTH: u32 = 8;
}
