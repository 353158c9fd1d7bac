//! Configuration constants and the tunable [`CollisionConfig`].

use serde::{Deserialize, Serialize};

/// Default proximity margin used by both the BVH inflation and the narrow phase.
pub const DEFAULT_THICKNESS: f32 = 1e-3;

/// Width of the time interval at which the CCD root bisection stops.
pub const DEFAULT_ROOT_TOLERANCE: f64 = 1e-6;

/// Triangles whose doubled area falls below this are treated as degenerate.
pub const DEFAULT_DEGENERATE_EPSILON: f32 = 1e-12;

/// Largest accepted body id. Ids index a dense arena, so this bounds its size.
pub const MAX_BODY_ID: u32 = 1 << 20;

/// Whether detection cycles use the rayon pool when the `parallel` feature is on.
pub const DEFAULT_PARALLEL: bool = true;

/// Per-engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Used by `collide_default`. `collide(thickness)` takes its own value
    /// and leaves this untouched.
    pub thickness: f32,
    pub root_tolerance: f64,
    pub degenerate_epsilon: f32,
    pub parallel: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            thickness: DEFAULT_THICKNESS,
            root_tolerance: DEFAULT_ROOT_TOLERANCE,
            degenerate_epsilon: DEFAULT_DEGENERATE_EPSILON,
            parallel: DEFAULT_PARALLEL,
        }
    }
}
