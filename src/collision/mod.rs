//! Collision pipeline: body registry, per-body BVHs, broad phase, swept narrow phase.

pub mod registry;
pub mod bvh;
pub mod broadphase;
pub mod ccd;
pub mod contact;
pub mod narrowphase;

pub use broadphase::BroadPhase;
pub use bvh::{Bvh, BvhOverlap};
pub use ccd::{CcdHit, CcdParams};
pub use contact::{ContactManifold, ContactPairs, ImpactInfo, MeshPair, TrianglePair};
pub use narrowphase::{NarrowPhase, NarrowPhaseReport};
pub use registry::{BodyRecord, BodyRegistry};
