//! # Utilities Module
//!
//! Reusable algorithms behind generation: seeded randomness, line tracing,
//! weighted pathfinding, path smoothing and spatial indexing.

pub mod math;
pub mod pathfinding;
pub mod rng;
pub mod smoothing;
pub mod spatial;

pub use math::*;
pub use pathfinding::*;
pub use rng::*;
pub use smoothing::*;
pub use spatial::*;
