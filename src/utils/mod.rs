//! Utility helpers: body arena, closest-point math, logging timers, cycle statistics.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{BodyArena, BodyId};
pub use profiling::CollisionStats;
