//! Data model: identities, the triangle primitive, and the collision mesh.

pub mod types;
pub mod triangle;
pub mod mesh;

pub use types::{ContactKind, TriangleId};
pub use triangle::Triangle;
pub use mesh::{Aabb, CollisionMesh, MeshSubmission};
