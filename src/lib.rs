//! Mesh CCD – continuous collision detection for deformable triangle meshes.
//!
//! Bodies submit their triangle meshes at the previous and current time
//! step. Each [`CollisionWorld::collide`] call builds a BVH per body, finds
//! overlapping triangle pairs between bodies (and within self-colliding
//! bodies), and runs swept vertex-face and edge-edge tests on them. The
//! resulting [`ImpactInfo`] records are meant to feed a downstream response
//! solver.

pub mod collision;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec3;

pub use collision::{
    broadphase::BroadPhase,
    bvh::Bvh,
    ccd::{CcdHit, CcdParams},
    contact::{ContactManifold, ContactPairs, ImpactInfo, MeshPair, TrianglePair},
    narrowphase::NarrowPhase,
    registry::BodyRegistry,
};
pub use config::CollisionConfig;
pub use crate::core::{Aabb, CollisionMesh, ContactKind, MeshSubmission, Triangle, TriangleId};
pub use error::{CollisionError, Result};
pub use utils::{allocator::BodyId, profiling::CollisionStats};
pub use world::CollisionWorld;
