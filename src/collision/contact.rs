use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    collision::{
        ccd::{CcdHit, CcdParams},
        narrowphase::NarrowPhase,
    },
    core::{ContactKind, Triangle, TriangleId},
    utils::allocator::BodyId,
};

/// Unordered pair of bodies scheduled for testing; `a == b` is a self pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshPair {
    pub a: BodyId,
    pub b: BodyId,
}

impl MeshPair {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn self_pair(body: BodyId) -> Self {
        Self { a: body, b: body }
    }

    pub fn is_self(&self) -> bool {
        self.a == self.b
    }
}

/// Unordered pair of candidate triangles, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrianglePair {
    pub a: TriangleId,
    pub b: TriangleId,
}

impl TrianglePair {
    pub fn new(a: TriangleId, b: TriangleId) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

/// One verified contact configuration between two triangles.
///
/// For vertex-face impacts `triangles[0]` owns `vertices[0]` and
/// `triangles[1]` owns the face `vertices[1..4]`. For edge-edge impacts
/// `triangles[0]` owns the edge `vertices[0..2]` and `triangles[1]` the edge
/// `vertices[2..4]`. Vertex ids are indices into the owning body's mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactInfo {
    pub triangles: [TriangleId; 2],
    pub kind: ContactKind,
    pub vertices: [u32; 4],
    /// Barycentric weights of the closest points, see [`CcdHit`].
    pub weights: [f32; 4],
    pub distance: f32,
    /// Normalised time of impact in `[0, 1]`.
    pub time: f32,
    /// `true` when a swept root was found, `false` for a proximity-only hit.
    pub ccd_resolved: bool,
}

impl ImpactInfo {
    pub fn vertex_face(
        vertex_owner: &Triangle,
        corner: usize,
        face: &Triangle,
        hit: &CcdHit,
    ) -> Self {
        Self {
            triangles: [vertex_owner.id, face.id],
            kind: ContactKind::VertexFace,
            vertices: [
                vertex_owner.indices[corner],
                face.indices[0],
                face.indices[1],
                face.indices[2],
            ],
            weights: hit.weights.map(|w| w as f32),
            distance: hit.distance as f32,
            time: hit.time as f32,
            ccd_resolved: hit.resolved,
        }
    }

    pub fn edge_edge(
        a: &Triangle,
        edge_a: usize,
        b: &Triangle,
        edge_b: usize,
        hit: &CcdHit,
    ) -> Self {
        Self {
            triangles: [a.id, b.id],
            kind: ContactKind::EdgeEdge,
            vertices: [
                a.indices[edge_a],
                a.indices[(edge_a + 1) % 3],
                b.indices[edge_b],
                b.indices[(edge_b + 1) % 3],
            ],
            weights: hit.weights.map(|w| w as f32),
            distance: hit.distance as f32,
            time: hit.time as f32,
            ccd_resolved: hit.resolved,
        }
    }
}

/// All impacts produced by one triangle pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    pub pair: TrianglePair,
    pub impacts: SmallVec<[ImpactInfo; 4]>,
}

impl ContactManifold {
    /// Runs the narrow phase on two triangles; `None` when nothing touches.
    pub fn generate(a: &Triangle, b: &Triangle, params: &CcdParams) -> Option<Self> {
        let impacts = NarrowPhase::test_pair(a, b, params);
        if impacts.is_empty() {
            return None;
        }
        Some(ContactManifold {
            pair: TrianglePair::new(a.id, b.id),
            impacts,
        })
    }
}

/// Triangle pairs in contact for one mesh pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPairs {
    pub mesh_pair: MeshPair,
    pub triangle_pairs: Vec<TrianglePair>,
}
